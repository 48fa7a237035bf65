use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Brief, BriefDetails, BriefId, LotSlug, ResponseId, SupplierCode};

/// Attachment types sellers may upload with a response.
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "odt", "doc", "docx", "rtf"];

pub const ANSWER_REQUIRED: &str = "answer_required";
pub const NOT_REQUIRED_VALUE: &str = "not_required_value";
pub const MAX_LESS_THAN_MIN: &str = "max_less_than_min";
pub const FILE_INCORRECT_FORMAT: &str = "file_incorrect_format";

/// Field-keyed validation map: field name to reason token. Tokens are part of
/// the client contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<&'static str, &'static str>);

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, token: &'static str) {
        self.0.entry(field).or_insert(token);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, token) in &self.0 {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{field}: {token}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Lot-specific answer content, tagged to match the brief's lot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "lot", rename_all = "snake_case")]
pub enum ResponseDetails {
    Specialist(SpecialistResponse),
    Rfx(RfxResponse),
    Atm(AtmResponse),
    Training(TrainingResponse),
}

impl ResponseDetails {
    pub fn lot(&self) -> LotSlug {
        match self {
            ResponseDetails::Specialist(_) => LotSlug::Specialist,
            ResponseDetails::Rfx(_) => LotSlug::Rfx,
            ResponseDetails::Atm(_) => LotSlug::Atm,
            ResponseDetails::Training(_) => LotSlug::Training,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialistResponse {
    pub given_names: String,
    pub surname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_rate: Option<f64>,
    /// Attachment storage keys for the candidate's resume.
    #[serde(default)]
    pub resume: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_clearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previously_worked: Option<String>,
    #[serde(default)]
    pub essential_requirement_responses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfxResponse {
    #[serde(default)]
    pub response_template: Vec<String>,
    #[serde(default)]
    pub written_proposal: Vec<String>,
    #[serde(default)]
    pub essential_requirement_responses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respond_to_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmResponse {
    /// Answers keyed by the brief's evaluation criterion text.
    #[serde(default)]
    pub criteria: BTreeMap<String, String>,
    #[serde(default)]
    pub written_proposal: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResponse {
    #[serde(default)]
    pub written_proposal: Vec<String>,
    #[serde(default)]
    pub essential_requirement_responses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Draft,
    Submitted,
}

impl ResponseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ResponseStatus::Draft => "draft",
            ResponseStatus::Submitted => "submitted",
        }
    }
}

/// A seller's submission against a brief. `submitted_at = None` means the
/// response is still a draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefResponse {
    pub id: ResponseId,
    pub brief_id: BriefId,
    pub supplier_code: SupplierCode,
    pub details: ResponseDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl BriefResponse {
    pub fn status(&self) -> ResponseStatus {
        if self.submitted_at.is_some() {
            ResponseStatus::Submitted
        } else {
            ResponseStatus::Draft
        }
    }
}

/// Validate a response against its brief's required fields. Returns the
/// field-keyed error map on failure; the caller decides whether to persist.
pub fn validate_details(brief: &Brief, details: &ResponseDetails) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    match (&brief.details, details) {
        (BriefDetails::Specialist(brief_details), ResponseDetails::Specialist(response)) => {
            if response.given_names.trim().is_empty() {
                errors.add("given_names", ANSWER_REQUIRED);
            }
            if response.surname.trim().is_empty() {
                errors.add("surname", ANSWER_REQUIRED);
            }

            check_attachments(&mut errors, "resume", &response.resume, true);

            if brief_details.security_clearance_required {
                if blank(&response.security_clearance) {
                    errors.add("security_clearance", ANSWER_REQUIRED);
                }
            } else if !blank(&response.security_clearance) {
                errors.add("security_clearance", NOT_REQUIRED_VALUE);
            }

            if blank(&response.previously_worked) {
                errors.add("previously_worked", ANSWER_REQUIRED);
            }

            match (response.day_rate, brief_details.max_day_rate) {
                (None, _) => errors.add("day_rate", ANSWER_REQUIRED),
                (Some(rate), Some(max)) if rate > max => {
                    errors.add("day_rate", MAX_LESS_THAN_MIN);
                }
                _ => {}
            }

            check_essential_requirements(
                &mut errors,
                brief.essential_requirements(),
                &response.essential_requirement_responses,
            );
        }
        (BriefDetails::Rfx(_), ResponseDetails::Rfx(response)) => {
            check_attachments(&mut errors, "response_template", &response.response_template, false);
            check_attachments(&mut errors, "written_proposal", &response.written_proposal, false);
            if response.response_template.is_empty() && response.written_proposal.is_empty() {
                errors.add("response_template", ANSWER_REQUIRED);
                errors.add("written_proposal", ANSWER_REQUIRED);
            }
            check_essential_requirements(
                &mut errors,
                brief.essential_requirements(),
                &response.essential_requirement_responses,
            );
        }
        (BriefDetails::Atm(brief_details), ResponseDetails::Atm(response)) => {
            let unanswered = brief_details.evaluation_criteria.iter().any(|criterion| {
                response
                    .criteria
                    .get(&criterion.criteria)
                    .map(|answer| answer.trim().is_empty())
                    .unwrap_or(true)
            });
            if unanswered {
                errors.add("criteria", ANSWER_REQUIRED);
            }
            check_attachments(&mut errors, "written_proposal", &response.written_proposal, false);
        }
        (BriefDetails::Training(_), ResponseDetails::Training(response)) => {
            check_attachments(&mut errors, "written_proposal", &response.written_proposal, true);
            check_essential_requirements(
                &mut errors,
                brief.essential_requirements(),
                &response.essential_requirement_responses,
            );
        }
        _ => {
            errors.add("lot", NOT_REQUIRED_VALUE);
        }
    }

    errors.into_result()
}

/// Every essential requirement must be answered, in order, with no extras.
fn check_essential_requirements(
    errors: &mut ValidationErrors,
    required: &[String],
    answers: &[String],
) {
    let complete = answers.len() == required.len()
        && answers.iter().all(|answer| !answer.trim().is_empty());
    if !complete {
        errors.add("essential_requirement_responses", ANSWER_REQUIRED);
    }
}

fn check_attachments(
    errors: &mut ValidationErrors,
    field: &'static str,
    attachments: &[String],
    required: bool,
) {
    if attachments.is_empty() {
        if required {
            errors.add(field, ANSWER_REQUIRED);
        }
        return;
    }

    let bad_format = attachments.iter().any(|name| {
        name.rsplit_once('.')
            .map(|(_, ext)| !ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(true)
    });
    if bad_format {
        errors.add(field, FILE_INCORRECT_FORMAT);
    }
}

fn blank(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|inner| inner.trim().is_empty())
        .unwrap_or(true)
}
