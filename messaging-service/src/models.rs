use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a scheduled message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Failed,
    Cancelled,
}

impl MessageStatus {
    /// Final states never transition again
    pub fn is_final(self) -> bool {
        !matches!(self, MessageStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Sent => "sent",
            MessageStatus::Failed => "failed",
            MessageStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct ScheduledMessage {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub phone: String,
    pub body: String,
    pub send_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub failure_reason: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScheduledMessage {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub phone: String,
    pub body: String,
    pub send_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_states() {
        assert!(!MessageStatus::Pending.is_final());
        assert!(MessageStatus::Sent.is_final());
        assert!(MessageStatus::Failed.is_final());
        assert!(MessageStatus::Cancelled.is_final());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let s = serde_json::to_string(&MessageStatus::Cancelled).unwrap();
        assert_eq!(s, "\"cancelled\"");
    }
}
