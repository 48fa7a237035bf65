use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::workflows::briefs::domain::{
    AssessmentStatus, AtmDetails, Brief, BriefDetails, BriefId, EvaluationCriterion, Framework,
    FrameworkStatus, Lot, LotSlug, RequirementsLength, RfxDetails, SellerSelection,
    SpecialistDetails, Supplier, SupplierCode, SupplierDomain, UserRef, UserRole,
};
use crate::workflows::briefs::eligibility::EligibilityPolicy;
use crate::workflows::briefs::repository::MemoryStore;
use crate::workflows::briefs::service::{BriefService, CreateBrief};

pub(crate) const CATEGORY: &str = "Software engineering and development";

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 12, 10, 0, 0).unwrap()
}

pub(crate) fn framework_with_status(status: FrameworkStatus) -> Framework {
    let lot = |slug: LotSlug, name: &str| Lot {
        slug,
        name: name.to_string(),
        allows_brief: true,
    };
    Framework {
        slug: "digital-marketplace".to_string(),
        name: "Digital Marketplace".to_string(),
        status,
        lots: vec![
            lot(LotSlug::Specialist, "Specialist"),
            lot(LotSlug::Rfx, "Request for anything"),
            lot(LotSlug::Atm, "Ask the market"),
            lot(LotSlug::Training, "Training"),
        ],
    }
}

pub(crate) fn live_framework() -> Framework {
    framework_with_status(FrameworkStatus::Live)
}

pub(crate) fn buyer() -> UserRef {
    UserRef {
        email_address: "buyer@agency.gov.au".to_string(),
        name: "Opportunity Owner".to_string(),
        role: UserRole::Buyer,
    }
}

pub(crate) fn assessed_supplier(code: u64) -> Supplier {
    Supplier {
        code: SupplierCode(code),
        name: format!("Seller {code}"),
        contact_email: format!("bids@seller{code}.example"),
        on_current_framework: true,
        domains: vec![SupplierDomain {
            category: CATEGORY.to_string(),
            status: AssessmentStatus::Assessed,
        }],
    }
}

pub(crate) fn unassessed_supplier(code: u64) -> Supplier {
    Supplier {
        code: SupplierCode(code),
        name: format!("Seller {code}"),
        contact_email: format!("bids@seller{code}.example"),
        on_current_framework: true,
        domains: vec![SupplierDomain {
            category: CATEGORY.to_string(),
            status: AssessmentStatus::Unassessed,
        }],
    }
}

pub(crate) fn atm_details(selection: SellerSelection) -> BriefDetails {
    BriefDetails::Atm(AtmDetails {
        title: "Discovery research".to_string(),
        selection,
        requirements_length: RequirementsLength::TwoWeeks,
        evaluation_criteria: vec![
            EvaluationCriterion {
                criteria: "Demonstrated delivery experience".to_string(),
                weighting: Some(60),
            },
            EvaluationCriterion {
                criteria: "Team capability".to_string(),
                weighting: Some(40),
            },
        ],
    })
}

pub(crate) fn rfx_details(selection: SellerSelection) -> BriefDetails {
    BriefDetails::Rfx(RfxDetails {
        title: "Platform build".to_string(),
        selection,
        requirements_length: RequirementsLength::TwoWeeks,
        essential_requirements: vec![
            "Relevant delivery experience".to_string(),
            "Security clearance process".to_string(),
        ],
        nice_to_have_requirements: Vec::new(),
    })
}

pub(crate) fn specialist_details(
    selection: SellerSelection,
    number_of_candidates: u8,
) -> BriefDetails {
    BriefDetails::Specialist(SpecialistDetails {
        title: "Senior developer".to_string(),
        selection,
        requirements_length: RequirementsLength::OneWeek,
        essential_requirements: vec!["Ships production Rust".to_string()],
        nice_to_have_requirements: Vec::new(),
        number_of_candidates,
        max_day_rate: Some(1200.0),
        security_clearance_required: false,
    })
}

/// Build a brief directly, bypassing the service, for evaluator-level tests.
/// `published_days_ago = None` leaves the brief a draft.
pub(crate) fn brief(details: BriefDetails, published_days_ago: Option<i64>) -> Brief {
    let created = now() - Duration::days(published_days_ago.unwrap_or(0) + 1);
    Brief {
        id: BriefId(1),
        framework_slug: "digital-marketplace".to_string(),
        details,
        owners: vec![buyer()],
        created_at: created,
        updated_at: created,
        published_at: published_days_ago.map(|days| now() - Duration::days(days)),
        withdrawn_at: None,
    }
}

pub(crate) fn policy() -> EligibilityPolicy {
    EligibilityPolicy::new(["gmail.com".to_string(), "hotmail.com".to_string()])
}

/// Store seeded with the live framework, plus a service over it.
pub(crate) fn seeded_service() -> (Arc<MemoryStore>, BriefService<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.register_framework(live_framework());
    let service = BriefService::new(store.clone(), policy());
    (store, service)
}

pub(crate) fn create_brief_request(details: BriefDetails) -> CreateBrief {
    CreateBrief {
        framework_slug: "digital-marketplace".to_string(),
        details,
        owners: vec![buyer()],
    }
}
