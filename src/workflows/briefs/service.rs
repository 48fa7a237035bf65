use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::audit::{AuditEvent, AuditRecord, AuditType};
use super::dates::BriefDates;
use super::domain::{
    Brief, BriefDetails, BriefId, Framework, ResponseId, SupplierCode, UserRef, UserRole,
};
use super::eligibility::{Candidate, EligibilityPolicy, IneligibleReason};
use super::lifecycle::{self, TransitionError};
use super::repository::{MarketplaceStore, StoreError};
use super::responses::{self, BriefResponse, ResponseDetails, ValidationErrors};

/// Object type names recorded on audit rows.
pub const BRIEF_OBJECT: &str = "brief";
pub const RESPONSE_OBJECT: &str = "brief_response";

/// Request payload for opening a new draft brief.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBrief {
    pub framework_slug: String,
    pub details: BriefDetails,
    pub owners: Vec<UserRef>,
}

/// Request payload for a seller responding to a brief.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseSubmission {
    pub supplier_code: SupplierCode,
    pub user_email: String,
    pub details: ResponseDetails,
}

/// Serialized brief with its derived status and date window.
#[derive(Debug, Clone, Serialize)]
pub struct BriefView {
    pub id: BriefId,
    pub framework_slug: String,
    pub lot: &'static str,
    pub status: &'static str,
    pub details: BriefDetails,
    pub owners: Vec<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawn_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dates: Option<BriefDates>,
}

impl BriefView {
    pub fn from_brief(brief: &Brief, now: DateTime<Utc>) -> Self {
        Self {
            id: brief.id,
            framework_slug: brief.framework_slug.clone(),
            lot: brief.lot().label(),
            status: brief.status(now).label(),
            details: brief.details.clone(),
            owners: brief.owners.clone(),
            created_at: brief.created_at,
            updated_at: brief.updated_at,
            published_at: brief.published_at,
            withdrawn_at: brief.withdrawn_at,
            dates: brief.dates(),
        }
    }
}

/// Serialized response with its derived status.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseView {
    pub id: ResponseId,
    pub brief_id: BriefId,
    pub supplier_code: SupplierCode,
    pub status: &'static str,
    pub details: ResponseDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ResponseView {
    pub fn from_response(response: &BriefResponse) -> Self {
        Self {
            id: response.id,
            brief_id: response.brief_id,
            supplier_code: response.supplier_code,
            status: response.status().label(),
            details: response.details.clone(),
            created_at: response.created_at,
            updated_at: response.updated_at,
            submitted_at: response.submitted_at,
        }
    }
}

/// Error raised by the brief service.
#[derive(Debug, thiserror::Error)]
pub enum BriefServiceError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("seller may not respond: {0}")]
    Ineligible(IneligibleReason),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("framework '{0}' not found")]
    UnknownFramework(String),
    #[error("supplier '{0}' is not registered")]
    UnknownSupplier(u64),
    #[error("lot '{0}' is not offered for opportunities on this framework")]
    LotNotBriefable(&'static str),
    #[error("opportunity owners must hold the buyer role")]
    OwnerNotBuyer,
    #[error("response lot does not match the opportunity lot")]
    LotMismatch,
    #[error("response must be a draft before it can be submitted")]
    NotDraft,
}

/// Service composing the stores, the eligibility policy, and response
/// validation. One instance serves the whole router.
pub struct BriefService<S> {
    store: Arc<S>,
    policy: EligibilityPolicy,
}

impl<S> BriefService<S>
where
    S: MarketplaceStore,
{
    pub fn new(store: Arc<S>, policy: EligibilityPolicy) -> Self {
        Self { store, policy }
    }

    /// Open a new draft brief after checking the framework offers the lot
    /// and every owner holds the buyer role.
    pub fn create_brief(
        &self,
        request: CreateBrief,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Brief, BriefServiceError> {
        let framework = self.framework(&request.framework_slug)?;

        let brief = Brief {
            id: BriefId(0),
            framework_slug: framework.slug.clone(),
            details: request.details,
            owners: request.owners,
            created_at: now,
            updated_at: now,
            published_at: None,
            withdrawn_at: None,
        };

        let lot = brief.lot();
        let briefable = framework
            .lot(lot)
            .map(|entry| entry.allows_brief)
            .unwrap_or(false);
        if !briefable {
            return Err(BriefServiceError::LotNotBriefable(lot.label()));
        }

        if brief.owners.is_empty()
            || brief.owners.iter().any(|owner| owner.role != UserRole::Buyer)
        {
            return Err(BriefServiceError::OwnerNotBuyer);
        }

        let audit = AuditRecord::new(
            AuditType::CreateBrief,
            updated_by,
            json!({ "title": brief.title(), "lot": lot.label() }),
            BRIEF_OBJECT,
            0,
        );
        let brief = self.store.create_brief(brief, audit)?;
        info!(brief_id = brief.id.0, lot = lot.label(), "opportunity created");
        Ok(brief)
    }

    pub fn get_brief(&self, id: BriefId) -> Result<Brief, BriefServiceError> {
        self.store
            .fetch_brief(id)?
            .ok_or(BriefServiceError::Store(StoreError::NotFound))
    }

    /// Publish a draft brief: draft to live, date window derived.
    pub fn publish_brief(
        &self,
        id: BriefId,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Brief, BriefServiceError> {
        let mut brief = self.get_brief(id)?;
        let framework = self.framework(&brief.framework_slug)?;

        let dates = lifecycle::publish(&mut brief, &framework, now)?;

        let audit = AuditRecord::new(
            AuditType::PublishBrief,
            updated_by,
            json!({ "published_at": dates.published_at, "closing_at": dates.closing_at }),
            BRIEF_OBJECT,
            brief.id.0,
        );
        self.store.update_brief(brief.clone(), audit)?;
        info!(brief_id = brief.id.0, "opportunity published");
        Ok(brief)
    }

    /// Withdraw a live brief. Terminal.
    pub fn withdraw_brief(
        &self,
        id: BriefId,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Brief, BriefServiceError> {
        let mut brief = self.get_brief(id)?;

        lifecycle::withdraw(&mut brief, now)?;

        let audit = AuditRecord::new(
            AuditType::WithdrawBrief,
            updated_by,
            json!({ "withdrawn_at": brief.withdrawn_at }),
            BRIEF_OBJECT,
            brief.id.0,
        );
        self.store.update_brief(brief.clone(), audit)?;
        info!(brief_id = brief.id.0, "opportunity withdrawn");
        Ok(brief)
    }

    /// Record a draft response once the eligibility and validation gates
    /// pass. The store enforces the per-seller bound atomically with the
    /// audit write.
    pub fn create_response(
        &self,
        brief_id: BriefId,
        submission: ResponseSubmission,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<BriefResponse, BriefServiceError> {
        let brief = self.get_brief(brief_id)?;
        let framework = self.framework(&brief.framework_slug)?;
        let supplier = self
            .store
            .supplier(submission.supplier_code)?
            .ok_or(BriefServiceError::UnknownSupplier(submission.supplier_code.0))?;

        if submission.details.lot() != brief.lot() {
            return Err(BriefServiceError::LotMismatch);
        }

        let existing = self.store.response_count(brief.id, supplier.code)?;
        let candidate = Candidate {
            supplier: &supplier,
            user_email: &submission.user_email,
            existing_responses: existing,
        };
        self.policy
            .evaluate(&brief, &framework, candidate, now)
            .map_err(BriefServiceError::Ineligible)?;

        responses::validate_details(&brief, &submission.details)?;

        let response = BriefResponse {
            id: ResponseId(0),
            brief_id: brief.id,
            supplier_code: supplier.code,
            details: submission.details,
            created_at: now,
            updated_at: now,
            submitted_at: None,
        };

        let audit = AuditRecord::new(
            AuditType::CreateBriefResponse,
            updated_by,
            json!({ "brief_id": brief.id.0, "supplier_code": supplier.code.0 }),
            RESPONSE_OBJECT,
            0,
        );
        let response = self.store.create_response(
            response,
            brief.max_responses_per_supplier(),
            audit,
        )?;
        info!(
            brief_id = brief.id.0,
            response_id = response.id.0,
            supplier_code = supplier.code.0,
            "draft response recorded"
        );
        Ok(response)
    }

    /// Submit a draft response: validates the lot's required fields, stamps
    /// `submitted_at`, and writes the audit row in the same transaction.
    pub fn submit_response(
        &self,
        id: ResponseId,
        updated_by: &str,
        now: DateTime<Utc>,
    ) -> Result<BriefResponse, BriefServiceError> {
        let mut response = self
            .store
            .fetch_response(id)?
            .ok_or(BriefServiceError::Store(StoreError::NotFound))?;

        if response.submitted_at.is_some() {
            return Err(BriefServiceError::NotDraft);
        }

        let brief = self.get_brief(response.brief_id)?;
        let framework = self.framework(&brief.framework_slug)?;
        if !framework.is_live() {
            return Err(BriefServiceError::Ineligible(
                IneligibleReason::FrameworkNotLive,
            ));
        }

        responses::validate_details(&brief, &response.details)?;

        response.submitted_at = Some(now);
        response.updated_at = now;

        let audit = AuditRecord::new(
            AuditType::SubmitBriefResponse,
            updated_by,
            json!({ "brief_response_id": response.id.0 }),
            RESPONSE_OBJECT,
            response.id.0,
        );
        self.store.update_response(response.clone(), audit)?;
        info!(response_id = response.id.0, "response submitted");
        Ok(response)
    }

    pub fn get_response(&self, id: ResponseId) -> Result<BriefResponse, BriefServiceError> {
        self.store
            .fetch_response(id)?
            .ok_or(BriefServiceError::Store(StoreError::NotFound))
    }

    pub fn responses_for_brief(
        &self,
        brief_id: BriefId,
    ) -> Result<Vec<BriefResponse>, BriefServiceError> {
        Ok(self.store.responses_for_brief(brief_id)?)
    }

    pub fn supplier_name(&self, code: SupplierCode) -> Result<Option<String>, BriefServiceError> {
        Ok(self.store.supplier(code)?.map(|supplier| supplier.name))
    }

    pub fn audit_trail(
        &self,
        object_type: &str,
        object_id: u64,
    ) -> Result<Vec<AuditEvent>, BriefServiceError> {
        Ok(self.store.events_for(object_type, object_id)?)
    }

    fn framework(&self, slug: &str) -> Result<Framework, BriefServiceError> {
        self.store
            .framework(slug)?
            .ok_or_else(|| BriefServiceError::UnknownFramework(slug.to_string()))
    }
}
