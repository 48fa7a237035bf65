use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for opportunity briefs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BriefId(pub u64);

/// Identifier wrapper for seller responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResponseId(pub u64);

/// Registered seller account number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SupplierCode(pub u64);

/// Lifecycle of a procurement program. Only `live` frameworks accept
/// published briefs or seller responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkStatus {
    Coming,
    Open,
    Pending,
    Standstill,
    Live,
    Expired,
}

impl FrameworkStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FrameworkStatus::Coming => "coming",
            FrameworkStatus::Open => "open",
            FrameworkStatus::Pending => "pending",
            FrameworkStatus::Standstill => "standstill",
            FrameworkStatus::Live => "live",
            FrameworkStatus::Expired => "expired",
        }
    }
}

/// A procurement program and the lots it offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Framework {
    pub slug: String,
    pub name: String,
    pub status: FrameworkStatus,
    pub lots: Vec<Lot>,
}

impl Framework {
    pub fn is_live(&self) -> bool {
        self.status == FrameworkStatus::Live
    }

    pub fn lot(&self, slug: LotSlug) -> Option<&Lot> {
        self.lots.iter().find(|lot| lot.slug == slug)
    }
}

/// Category of procurement work. Each lot carries its own eligibility policy
/// and response schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotSlug {
    Specialist,
    Rfx,
    Atm,
    Training,
}

impl LotSlug {
    pub const fn label(self) -> &'static str {
        match self {
            LotSlug::Specialist => "specialist",
            LotSlug::Rfx => "rfx",
            LotSlug::Atm => "atm",
            LotSlug::Training => "training",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    pub slug: LotSlug,
    pub name: String,
    pub allows_brief: bool,
}

/// Assessment state of a seller within one skill category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Unassessed,
    Assessed,
    Rejected,
}

/// A seller's standing in one skill category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierDomain {
    pub category: String,
    pub status: AssessmentStatus,
}

/// Registered seller record used by eligibility lookups. Read-only from the
/// perspective of the brief workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub code: SupplierCode,
    pub name: String,
    pub contact_email: String,
    pub on_current_framework: bool,
    pub domains: Vec<SupplierDomain>,
}

impl Supplier {
    pub fn is_assessed_in_any_category(&self) -> bool {
        self.domains
            .iter()
            .any(|domain| domain.status == AssessmentStatus::Assessed)
    }

    pub fn is_assessed_for(&self, category: &str) -> bool {
        self.domains.iter().any(|domain| {
            domain.status == AssessmentStatus::Assessed
                && domain.category.eq_ignore_ascii_case(category)
        })
    }

    pub fn assessed_categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .domains
            .iter()
            .filter(|domain| domain.status == AssessmentStatus::Assessed)
            .map(|domain| domain.category.as_str())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Buyer,
    Supplier,
    Admin,
}

/// Minimal account snapshot attached to briefs as owners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    pub email_address: String,
    pub name: String,
    pub role: UserRole,
}

/// Application window length. Anything other than the exact string `1 week`
/// falls back to the two-week default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequirementsLength {
    #[serde(rename = "1 week")]
    OneWeek,
    #[default]
    #[serde(rename = "2 weeks")]
    TwoWeeks,
}

impl RequirementsLength {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("1 week") => RequirementsLength::OneWeek,
            _ => RequirementsLength::TwoWeeks,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RequirementsLength::OneWeek => "1 week",
            RequirementsLength::TwoWeeks => "2 weeks",
        }
    }

    /// Calendar days the application window stays open.
    pub const fn open_days(self) -> i64 {
        match self {
            RequirementsLength::OneWeek => 7,
            RequirementsLength::TwoWeeks => 14,
        }
    }

    /// Workdays sellers may lodge clarification questions.
    pub const fn questions_open_workdays(self) -> i64 {
        match self {
            RequirementsLength::OneWeek => 2,
            RequirementsLength::TwoWeeks => 5,
        }
    }
}

/// Who may respond to a brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SellerSelection {
    /// Any approved seller with an assessed category.
    OpenToAll,
    /// Sellers assessed in the named category.
    OpenToCategory { category: String },
    /// Only sellers invited by account number or email address.
    Selected {
        #[serde(default)]
        invited_sellers: Vec<SupplierCode>,
        #[serde(default)]
        seller_email_list: Vec<String>,
    },
}

/// One scored question on an ATM brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    pub criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighting: Option<u8>,
}

/// Lot-specific brief content. A tagged schema rather than a free-form map so
/// each lot's required fields are checked at the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lot", rename_all = "snake_case")]
pub enum BriefDetails {
    Specialist(SpecialistDetails),
    Rfx(RfxDetails),
    Atm(AtmDetails),
    Training(TrainingDetails),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistDetails {
    pub title: String,
    pub selection: SellerSelection,
    #[serde(default)]
    pub requirements_length: RequirementsLength,
    pub essential_requirements: Vec<String>,
    #[serde(default)]
    pub nice_to_have_requirements: Vec<String>,
    /// Candidate submissions allowed per seller.
    pub number_of_candidates: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_day_rate: Option<f64>,
    #[serde(default)]
    pub security_clearance_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfxDetails {
    pub title: String,
    pub selection: SellerSelection,
    #[serde(default)]
    pub requirements_length: RequirementsLength,
    pub essential_requirements: Vec<String>,
    #[serde(default)]
    pub nice_to_have_requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmDetails {
    pub title: String,
    pub selection: SellerSelection,
    #[serde(default)]
    pub requirements_length: RequirementsLength,
    pub evaluation_criteria: Vec<EvaluationCriterion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDetails {
    pub title: String,
    pub selection: SellerSelection,
    #[serde(default)]
    pub requirements_length: RequirementsLength,
    pub essential_requirements: Vec<String>,
}

/// A single opportunity. Status is never stored; it is derived from the
/// publication and withdrawal timestamps (see the lifecycle module).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    pub id: BriefId,
    pub framework_slug: String,
    pub details: BriefDetails,
    pub owners: Vec<UserRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub withdrawn_at: Option<DateTime<Utc>>,
}

impl Brief {
    pub fn lot(&self) -> LotSlug {
        match self.details {
            BriefDetails::Specialist(_) => LotSlug::Specialist,
            BriefDetails::Rfx(_) => LotSlug::Rfx,
            BriefDetails::Atm(_) => LotSlug::Atm,
            BriefDetails::Training(_) => LotSlug::Training,
        }
    }

    pub fn title(&self) -> &str {
        match &self.details {
            BriefDetails::Specialist(details) => &details.title,
            BriefDetails::Rfx(details) => &details.title,
            BriefDetails::Atm(details) => &details.title,
            BriefDetails::Training(details) => &details.title,
        }
    }

    pub fn selection(&self) -> &SellerSelection {
        match &self.details {
            BriefDetails::Specialist(details) => &details.selection,
            BriefDetails::Rfx(details) => &details.selection,
            BriefDetails::Atm(details) => &details.selection,
            BriefDetails::Training(details) => &details.selection,
        }
    }

    pub fn requirements_length(&self) -> RequirementsLength {
        match &self.details {
            BriefDetails::Specialist(details) => details.requirements_length,
            BriefDetails::Rfx(details) => details.requirements_length,
            BriefDetails::Atm(details) => details.requirements_length,
            BriefDetails::Training(details) => details.requirements_length,
        }
    }

    pub fn essential_requirements(&self) -> &[String] {
        match &self.details {
            BriefDetails::Specialist(details) => &details.essential_requirements,
            BriefDetails::Rfx(details) => &details.essential_requirements,
            BriefDetails::Training(details) => &details.essential_requirements,
            BriefDetails::Atm(_) => &[],
        }
    }

    pub fn evaluation_criteria(&self) -> &[EvaluationCriterion] {
        match &self.details {
            BriefDetails::Atm(details) => &details.evaluation_criteria,
            _ => &[],
        }
    }

    /// Submitted responses accepted per seller. Specialist briefs take one
    /// slot per requested candidate, capped at three; every other lot takes
    /// exactly one.
    pub fn max_responses_per_supplier(&self) -> u8 {
        match &self.details {
            BriefDetails::Specialist(details) => details.number_of_candidates.clamp(1, 3),
            _ => 1,
        }
    }
}
