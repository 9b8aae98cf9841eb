// Audit trail for clinical record operations
use crate::error::DbResult;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres};
use tracing::{error, info};
use uuid::Uuid;

/// Audit writer for record mutations.
///
/// Writes are best-effort: a failed audit insert is logged loudly but does
/// not fail the operation that triggered it.
#[derive(Clone)]
pub struct AuditLog {
    pool: Pool<Postgres>,
    enabled: bool,
}

impl AuditLog {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            pool,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Record an action against a resource
    pub async fn record(
        &self,
        actor_id: Uuid,
        resource_type: &str,
        resource_id: Uuid,
        action: &str,
        detail: Option<JsonValue>,
    ) -> DbResult<()> {
        if !self.enabled {
            return Ok(());
        }

        info!(
            target: "audit",
            actor_id = %actor_id,
            resource_type = %resource_type,
            resource_id = %resource_id,
            action = %action,
            "Record operation audit"
        );

        let sanitized = detail.map(Self::redact_sensitive_fields);

        if let Err(e) = sqlx::query(
            r#"
            INSERT INTO audit_log (actor_id, resource_type, resource_id, action, detail)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(actor_id)
        .bind(resource_type)
        .bind(resource_id)
        .bind(action)
        .bind(sanitized)
        .execute(&self.pool)
        .await
        {
            error!(
                target: "audit",
                error = %e,
                "Failed to store audit record - this is a compliance issue!"
            );
        }

        Ok(())
    }

    /// Redact credential material from audit detail payloads
    fn redact_sensitive_fields(mut detail: JsonValue) -> JsonValue {
        if let Some(obj) = detail.as_object_mut() {
            let sensitive_fields = ["password", "password_hash", "token", "access_token"];

            for field in &sensitive_fields {
                if obj.contains_key(*field) {
                    obj.insert(
                        (*field).to_string(),
                        JsonValue::String("***REDACTED***".to_string()),
                    );
                }
            }
        }
        detail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_redacts_credentials() {
        let detail = json!({"password": "hunter2", "note": "annual checkup"});
        let redacted = AuditLog::redact_sensitive_fields(detail);

        assert_eq!(redacted["password"], "***REDACTED***");
        assert_eq!(redacted["note"], "annual checkup");
    }

    #[test]
    fn test_leaves_non_objects_alone() {
        let detail = json!(["a", "b"]);
        let redacted = AuditLog::redact_sensitive_fields(detail.clone());
        assert_eq!(redacted, detail);
    }
}
