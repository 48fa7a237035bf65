use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Known audit event types. Labels are the stored wire strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    CreateBrief,
    PublishBrief,
    WithdrawBrief,
    CreateBriefResponse,
    SubmitBriefResponse,
}

impl AuditType {
    pub const fn label(self) -> &'static str {
        match self {
            AuditType::CreateBrief => "create_brief",
            AuditType::PublishBrief => "publish_brief",
            AuditType::WithdrawBrief => "withdraw_brief",
            AuditType::CreateBriefResponse => "create_brief_response",
            AuditType::SubmitBriefResponse => "submit_brief_response",
        }
    }
}

/// Immutable log row recorded alongside every significant state change.
/// References the affected entity weakly by type name and id, never by an
/// owning pointer. Created once; never mutated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: AuditType,
    pub user: String,
    pub data: serde_json::Value,
    pub object_type: &'static str,
    pub object_id: u64,
    pub created_at: DateTime<Utc>,
}

/// Payload for an audit row the store has not yet numbered.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub kind: AuditType,
    pub user: String,
    pub data: serde_json::Value,
    pub object_type: &'static str,
    pub object_id: u64,
}

impl AuditRecord {
    pub fn new(
        kind: AuditType,
        user: impl Into<String>,
        data: serde_json::Value,
        object_type: &'static str,
        object_id: u64,
    ) -> Self {
        Self {
            kind,
            user: user.into(),
            data,
            object_type,
            object_id,
        }
    }

    pub fn into_event(self, id: u64, created_at: DateTime<Utc>) -> AuditEvent {
        AuditEvent {
            id,
            kind: self.kind,
            user: self.user,
            data: self.data,
            object_type: self.object_type,
            object_id: self.object_id,
            created_at,
        }
    }
}
