use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Brief, Framework, SellerSelection, Supplier, SupplierCode};
use super::lifecycle::BriefStatus;

/// Stable reason vocabulary consumed by front-end clients. The wire strings
/// must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    NotSelected,
    NotAssessed,
    FrameworkNotLive,
    AlreadyResponded,
    BriefNotLive,
}

impl IneligibleReason {
    pub const fn code(self) -> &'static str {
        match self {
            IneligibleReason::NotSelected => "not_selected",
            IneligibleReason::NotAssessed => "not_assessed",
            IneligibleReason::FrameworkNotLive => "framework_not_live",
            IneligibleReason::AlreadyResponded => "already_responded",
            IneligibleReason::BriefNotLive => "brief_not_live",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            IneligibleReason::NotSelected => "seller was not invited to this opportunity",
            IneligibleReason::NotAssessed => {
                "seller does not hold an approved assessment for this opportunity"
            }
            IneligibleReason::FrameworkNotLive => "the framework is not accepting responses",
            IneligibleReason::AlreadyResponded => "seller has already responded",
            IneligibleReason::BriefNotLive => "the opportunity is not open for responses",
        }
    }
}

impl std::fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Candidate-side inputs to an eligibility decision. Purely read-only.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub supplier: &'a Supplier,
    pub user_email: &'a str,
    /// Responses this seller already holds against the brief, submitted and
    /// draft alike.
    pub existing_responses: u8,
}

/// Decides whether a seller may respond to a brief. Holds the configured
/// generic webmail domains that never count as an implicit domain invite.
#[derive(Debug, Clone, Default)]
pub struct EligibilityPolicy {
    generic_email_domains: Vec<String>,
}

impl EligibilityPolicy {
    pub fn new(generic_email_domains: impl IntoIterator<Item = String>) -> Self {
        Self {
            generic_email_domains: generic_email_domains
                .into_iter()
                .map(|domain| domain.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Evaluate a `(brief, candidate)` pair. Gate order: framework status,
    /// brief status, response bound, invitation, assessment.
    pub fn evaluate(
        &self,
        brief: &Brief,
        framework: &Framework,
        candidate: Candidate<'_>,
        now: DateTime<Utc>,
    ) -> Result<(), IneligibleReason> {
        if !framework.is_live() {
            return Err(IneligibleReason::FrameworkNotLive);
        }

        if brief.status(now) != BriefStatus::Live {
            return Err(IneligibleReason::BriefNotLive);
        }

        if candidate.existing_responses >= brief.max_responses_per_supplier() {
            return Err(IneligibleReason::AlreadyResponded);
        }

        match brief.selection() {
            SellerSelection::OpenToAll => {
                if !candidate.supplier.is_assessed_in_any_category() {
                    return Err(IneligibleReason::NotAssessed);
                }
            }
            SellerSelection::OpenToCategory { category } => {
                if !candidate.supplier.is_assessed_for(category) {
                    return Err(IneligibleReason::NotAssessed);
                }
            }
            SellerSelection::Selected {
                invited_sellers,
                seller_email_list,
            } => {
                if !self.is_invited(candidate, invited_sellers, seller_email_list) {
                    return Err(IneligibleReason::NotSelected);
                }
                if !candidate.supplier.on_current_framework
                    || !candidate.supplier.is_assessed_in_any_category()
                {
                    return Err(IneligibleReason::NotAssessed);
                }
            }
        }

        Ok(())
    }

    fn is_invited(
        &self,
        candidate: Candidate<'_>,
        invited_sellers: &[SupplierCode],
        seller_email_list: &[String],
    ) -> bool {
        if invited_sellers.contains(&candidate.supplier.code) {
            return true;
        }

        if seller_email_list
            .iter()
            .any(|invited| invited.eq_ignore_ascii_case(candidate.user_email))
        {
            return true;
        }

        // An address shares an invitation with its whole email domain, unless
        // the domain is a generic webmail provider.
        let Some(candidate_domain) = email_domain(candidate.user_email) else {
            return false;
        };
        if self.is_generic_domain(candidate_domain) {
            return false;
        }

        seller_email_list.iter().any(|invited| {
            email_domain(invited)
                .map(|domain| domain.eq_ignore_ascii_case(candidate_domain))
                .unwrap_or(false)
        })
    }

    fn is_generic_domain(&self, domain: &str) -> bool {
        self.generic_email_domains
            .iter()
            .any(|generic| generic.eq_ignore_ascii_case(domain))
    }
}

fn email_domain(email: &str) -> Option<&str> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}
