use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dates::{self, BriefDates};
use super::domain::{Brief, Framework};

/// Derived lifecycle state of a brief. `closed` is never assigned, only
/// observed once the closing date passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefStatus {
    Draft,
    Live,
    Closed,
    Withdrawn,
}

impl BriefStatus {
    pub const fn label(self) -> &'static str {
        match self {
            BriefStatus::Draft => "draft",
            BriefStatus::Live => "live",
            BriefStatus::Closed => "closed",
            BriefStatus::Withdrawn => "withdrawn",
        }
    }
}

impl Brief {
    /// Current status, computed from the stored timestamps. Withdrawal wins
    /// over everything else; publication and the derived closing date decide
    /// the rest.
    pub fn status(&self, now: DateTime<Utc>) -> BriefStatus {
        if self.withdrawn_at.is_some() {
            return BriefStatus::Withdrawn;
        }

        let Some(dates) = self.dates() else {
            return BriefStatus::Draft;
        };

        if now < dates.closing_at {
            BriefStatus::Live
        } else {
            BriefStatus::Closed
        }
    }

    pub fn dates(&self) -> Option<BriefDates> {
        dates::window(self.published_at, self.requirements_length())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("cannot change opportunity status from '{}' to '{}'", from.label(), to.label())]
    Illegal { from: BriefStatus, to: BriefStatus },
    #[error("framework '{slug}' must be live before an opportunity can be published (currently '{status}')")]
    FrameworkNotLive { slug: String, status: &'static str },
}

/// Publish a draft brief, stamping `published_at` and thereby deriving the
/// application window. Requires the owning framework to be live.
pub fn publish(
    brief: &mut Brief,
    framework: &Framework,
    now: DateTime<Utc>,
) -> Result<BriefDates, TransitionError> {
    if !framework.is_live() {
        return Err(TransitionError::FrameworkNotLive {
            slug: framework.slug.clone(),
            status: framework.status.label(),
        });
    }

    let from = brief.status(now);
    if from != BriefStatus::Draft {
        return Err(TransitionError::Illegal {
            from,
            to: BriefStatus::Live,
        });
    }

    brief.published_at = Some(now);
    brief.updated_at = now;

    Ok(brief.dates().expect("published brief always has dates"))
}

/// Withdraw a live brief. Terminal: no transition leaves `withdrawn`.
pub fn withdraw(brief: &mut Brief, now: DateTime<Utc>) -> Result<(), TransitionError> {
    let from = brief.status(now);
    if from != BriefStatus::Live {
        return Err(TransitionError::Illegal {
            from,
            to: BriefStatus::Withdrawn,
        });
    }

    brief.withdrawn_at = Some(now);
    brief.updated_at = now;
    Ok(())
}
