//! Opportunity briefs: lifecycle, seller eligibility, and response intake.
//!
//! Buyers draft a brief against a live framework lot, publish it to open a
//! derived application window, and withdraw it if plans change. Approved
//! sellers respond while the brief is live; every state change writes an
//! audit row in the same transaction.

pub mod audit;
pub mod dates;
pub mod domain;
pub mod eligibility;
pub mod export;
pub mod lifecycle;
pub mod repository;
pub mod responses;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use audit::{AuditEvent, AuditType};
pub use dates::BriefDates;
pub use domain::{
    AssessmentStatus, AtmDetails, Brief, BriefDetails, BriefId, EvaluationCriterion, Framework,
    FrameworkStatus, Lot, LotSlug, RequirementsLength, ResponseId, RfxDetails, SellerSelection,
    SpecialistDetails, Supplier, SupplierCode, SupplierDomain, TrainingDetails, UserRef, UserRole,
};
pub use eligibility::{Candidate, EligibilityPolicy, IneligibleReason};
pub use lifecycle::{BriefStatus, TransitionError};
pub use repository::{
    AuditLog, BriefRepository, FrameworkDirectory, MarketplaceStore, MemoryStore,
    ResponseRepository, StoreError, SupplierDirectory,
};
pub use responses::{
    AtmResponse, BriefResponse, ResponseDetails, ResponseStatus, RfxResponse, SpecialistResponse,
    TrainingResponse, ValidationErrors,
};
pub use router::brief_router;
pub use service::{
    BriefService, BriefServiceError, BriefView, CreateBrief, ResponseSubmission, ResponseView,
};
