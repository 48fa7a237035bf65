use std::collections::BTreeMap;

use chrono::Duration;

use super::common::*;
use crate::workflows::briefs::audit::AuditType;
use crate::workflows::briefs::domain::{SellerSelection, SupplierCode, UserRef, UserRole};
use crate::workflows::briefs::eligibility::IneligibleReason;
use crate::workflows::briefs::lifecycle::BriefStatus;
use crate::workflows::briefs::repository::StoreError;
use crate::workflows::briefs::responses::{AtmResponse, ResponseDetails, ResponseStatus};
use crate::workflows::briefs::service::{
    BriefServiceError, CreateBrief, ResponseSubmission, BRIEF_OBJECT, RESPONSE_OBJECT,
};

fn atm_submission(supplier_code: u64) -> ResponseSubmission {
    let mut criteria = BTreeMap::new();
    criteria.insert(
        "Demonstrated delivery experience".to_string(),
        "Five prior engagements".to_string(),
    );
    criteria.insert(
        "Team capability".to_string(),
        "Four senior practitioners".to_string(),
    );
    ResponseSubmission {
        supplier_code: SupplierCode(supplier_code),
        user_email: format!("bids@seller{supplier_code}.example"),
        details: ResponseDetails::Atm(AtmResponse {
            criteria,
            written_proposal: Vec::new(),
        }),
    }
}

#[test]
fn create_brief_assigns_id_and_audits() {
    let (_store, service) = seeded_service();
    let brief = service
        .create_brief(
            create_brief_request(atm_details(SellerSelection::OpenToAll)),
            "buyer@agency.gov.au",
            now(),
        )
        .expect("brief created");

    assert_eq!(brief.id.0, 1);
    assert_eq!(brief.status(now()), BriefStatus::Draft);

    let trail = service
        .audit_trail(BRIEF_OBJECT, brief.id.0)
        .expect("audit trail readable");
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].kind, AuditType::CreateBrief);
}

#[test]
fn create_brief_rejects_non_buyer_owner() {
    let (_store, service) = seeded_service();
    let request = CreateBrief {
        owners: vec![UserRef {
            email_address: "seller@vendor.example".to_string(),
            name: "Vendor".to_string(),
            role: UserRole::Supplier,
        }],
        ..create_brief_request(atm_details(SellerSelection::OpenToAll))
    };

    match service.create_brief(request, "seller@vendor.example", now()) {
        Err(BriefServiceError::OwnerNotBuyer) => {}
        other => panic!("expected owner role rejection, got {other:?}"),
    }
}

#[test]
fn create_brief_rejects_unknown_framework() {
    let (_store, service) = seeded_service();
    let request = CreateBrief {
        framework_slug: "dos".to_string(),
        ..create_brief_request(atm_details(SellerSelection::OpenToAll))
    };

    match service.create_brief(request, "buyer@agency.gov.au", now()) {
        Err(BriefServiceError::UnknownFramework(slug)) => assert_eq!(slug, "dos"),
        other => panic!("expected unknown framework, got {other:?}"),
    }
}

#[test]
fn responses_are_refused_while_the_brief_is_a_draft() {
    let (store, service) = seeded_service();
    store.register_supplier(assessed_supplier(1));

    let brief = service
        .create_brief(
            create_brief_request(atm_details(SellerSelection::OpenToAll)),
            "buyer@agency.gov.au",
            now(),
        )
        .expect("brief created");

    match service.create_response(brief.id, atm_submission(1), "bids@seller1.example", now()) {
        Err(BriefServiceError::Ineligible(IneligibleReason::BriefNotLive)) => {}
        other => panic!("expected brief_not_live, got {other:?}"),
    }
}

#[test]
fn draft_then_submit_records_both_audit_events() {
    let (store, service) = seeded_service();
    store.register_supplier(assessed_supplier(1));

    let created_at = now() - Duration::days(10);
    let brief = service
        .create_brief(
            create_brief_request(atm_details(SellerSelection::OpenToAll)),
            "buyer@agency.gov.au",
            created_at,
        )
        .expect("brief created");
    service
        .publish_brief(brief.id, "buyer@agency.gov.au", created_at)
        .expect("brief published");

    let response = service
        .create_response(brief.id, atm_submission(1), "bids@seller1.example", now())
        .expect("draft response recorded");
    assert_eq!(response.status(), ResponseStatus::Draft);

    let submitted = service
        .submit_response(response.id, "bids@seller1.example", now())
        .expect("response submitted");
    assert_eq!(submitted.status(), ResponseStatus::Submitted);
    assert_eq!(submitted.submitted_at, Some(now()));

    let trail = service
        .audit_trail(RESPONSE_OBJECT, response.id.0)
        .expect("audit trail readable");
    let kinds: Vec<AuditType> = trail.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![AuditType::CreateBriefResponse, AuditType::SubmitBriefResponse]
    );
}

#[test]
fn second_response_from_the_same_seller_conflicts() {
    let (store, service) = seeded_service();
    store.register_supplier(assessed_supplier(1));

    let published_at = now() - Duration::days(2);
    let brief = service
        .create_brief(
            create_brief_request(atm_details(SellerSelection::OpenToAll)),
            "buyer@agency.gov.au",
            published_at,
        )
        .expect("brief created");
    service
        .publish_brief(brief.id, "buyer@agency.gov.au", published_at)
        .expect("brief published");

    let first = service
        .create_response(brief.id, atm_submission(1), "bids@seller1.example", now())
        .expect("first response recorded");

    match service.create_response(brief.id, atm_submission(1), "bids@seller1.example", now()) {
        Err(BriefServiceError::Ineligible(IneligibleReason::AlreadyResponded)) => {}
        other => panic!("expected already_responded, got {other:?}"),
    }

    // Exactly one row and one creation audit event survive the second attempt.
    let rows = service
        .responses_for_brief(brief.id)
        .expect("responses readable");
    assert_eq!(rows.len(), 1);
    let trail = service
        .audit_trail(RESPONSE_OBJECT, first.id.0)
        .expect("audit trail readable");
    assert_eq!(trail.len(), 1);
}

#[test]
fn store_bound_holds_even_when_the_eligibility_precheck_is_bypassed() {
    use crate::workflows::briefs::audit::AuditRecord;
    use crate::workflows::briefs::repository::{MemoryStore, ResponseRepository};
    use crate::workflows::briefs::responses::BriefResponse;
    use crate::workflows::briefs::domain::{BriefId, ResponseId};

    let store = MemoryStore::new();
    let template = || BriefResponse {
        id: ResponseId(0),
        brief_id: BriefId(7),
        supplier_code: SupplierCode(1),
        details: ResponseDetails::Atm(AtmResponse {
            criteria: BTreeMap::new(),
            written_proposal: Vec::new(),
        }),
        created_at: now(),
        updated_at: now(),
        submitted_at: None,
    };
    let audit = || {
        AuditRecord::new(
            AuditType::CreateBriefResponse,
            "bids@seller1.example",
            serde_json::json!({}),
            RESPONSE_OBJECT,
            0,
        )
    };

    store
        .create_response(template(), 1, audit())
        .expect("first insert within bound");
    match store.create_response(template(), 1, audit()) {
        Err(StoreError::Conflict) => {}
        other => panic!("expected conflict at the store bound, got {other:?}"),
    }
}

#[test]
fn submitting_twice_is_rejected_as_a_state_error() {
    let (store, service) = seeded_service();
    store.register_supplier(assessed_supplier(1));

    let published_at = now() - Duration::days(2);
    let brief = service
        .create_brief(
            create_brief_request(atm_details(SellerSelection::OpenToAll)),
            "buyer@agency.gov.au",
            published_at,
        )
        .expect("brief created");
    service
        .publish_brief(brief.id, "buyer@agency.gov.au", published_at)
        .expect("brief published");
    let response = service
        .create_response(brief.id, atm_submission(1), "bids@seller1.example", now())
        .expect("draft recorded");
    service
        .submit_response(response.id, "bids@seller1.example", now())
        .expect("first submit");

    match service.submit_response(response.id, "bids@seller1.example", now()) {
        Err(BriefServiceError::NotDraft) => {}
        other => panic!("expected draft-only rejection, got {other:?}"),
    }

    let trail = service
        .audit_trail(RESPONSE_OBJECT, response.id.0)
        .expect("audit trail readable");
    assert_eq!(trail.len(), 2, "no third audit event is written");
}

#[test]
fn withdrawing_a_live_brief_blocks_new_responses() {
    let (store, service) = seeded_service();
    store.register_supplier(assessed_supplier(1));

    let published_at = now() - Duration::days(2);
    let brief = service
        .create_brief(
            create_brief_request(atm_details(SellerSelection::OpenToAll)),
            "buyer@agency.gov.au",
            published_at,
        )
        .expect("brief created");
    service
        .publish_brief(brief.id, "buyer@agency.gov.au", published_at)
        .expect("brief published");
    service
        .withdraw_brief(brief.id, "buyer@agency.gov.au", now() - Duration::days(1))
        .expect("brief withdrawn");

    match service.create_response(brief.id, atm_submission(1), "bids@seller1.example", now()) {
        Err(BriefServiceError::Ineligible(IneligibleReason::BriefNotLive)) => {}
        other => panic!("expected brief_not_live after withdrawal, got {other:?}"),
    }

    let trail = service
        .audit_trail(BRIEF_OBJECT, brief.id.0)
        .expect("audit trail readable");
    let kinds: Vec<AuditType> = trail.iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AuditType::CreateBrief,
            AuditType::PublishBrief,
            AuditType::WithdrawBrief
        ]
    );
}
