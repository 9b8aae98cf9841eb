use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::{MessagingError, MessagingResult};
use crate::models::{MessageStatus, NewScheduledMessage, ScheduledMessage};

const MESSAGE_COLUMNS: &str = "id, doctor_id, patient_id, phone, body, send_at, status, \
                               failure_reason, sent_at, created_at";

/// Persistence seam for scheduled messages.
///
/// The scheduler only talks to this trait; production uses
/// [`SqlxMessageStore`], tests use an in-memory double.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, new: &NewScheduledMessage) -> MessagingResult<ScheduledMessage>;

    /// All messages still waiting to go out, oldest first
    async fn load_pending(&self) -> MessagingResult<Vec<ScheduledMessage>>;

    async fn get(&self, id: Uuid) -> MessagingResult<Option<ScheduledMessage>>;

    async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> MessagingResult<(Vec<ScheduledMessage>, i64)>;

    async fn mark_sent(&self, id: Uuid) -> MessagingResult<()>;

    async fn mark_failed(&self, id: Uuid, reason: &str) -> MessagingResult<()>;

    /// Transition a pending message to cancelled. Returns `false` when the
    /// message already reached a final state (the send may have raced ahead).
    async fn mark_cancelled(&self, id: Uuid) -> MessagingResult<bool>;
}

/// PostgreSQL-backed message store
#[derive(Debug, Clone)]
pub struct SqlxMessageStore {
    pool: Pool<Postgres>,
}

impl SqlxMessageStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for SqlxMessageStore {
    async fn insert(&self, new: &NewScheduledMessage) -> MessagingResult<ScheduledMessage> {
        let message = sqlx::query_as::<_, ScheduledMessage>(&format!(
            r#"
            INSERT INTO scheduled_messages (doctor_id, patient_id, phone, body, send_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(new.doctor_id)
        .bind(new.patient_id)
        .bind(&new.phone)
        .bind(&new.body)
        .bind(new.send_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn load_pending(&self) -> MessagingResult<Vec<ScheduledMessage>> {
        let messages = sqlx::query_as::<_, ScheduledMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM scheduled_messages
            WHERE status = 'pending'
            ORDER BY send_at ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn get(&self, id: Uuid) -> MessagingResult<Option<ScheduledMessage>> {
        let message = sqlx::query_as::<_, ScheduledMessage>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM scheduled_messages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn list_for_doctor(
        &self,
        doctor_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> MessagingResult<(Vec<ScheduledMessage>, i64)> {
        let messages = sqlx::query_as::<_, ScheduledMessage>(&format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM scheduled_messages
            WHERE doctor_id = $1
            ORDER BY send_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(doctor_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM scheduled_messages WHERE doctor_id = $1")
                .bind(doctor_id)
                .fetch_one(&self.pool)
                .await?;

        Ok((messages, total))
    }

    async fn mark_sent(&self, id: Uuid) -> MessagingResult<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_messages
            SET status = 'sent', sent_at = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> MessagingResult<()> {
        sqlx::query(
            r#"
            UPDATE scheduled_messages
            SET status = 'failed', failure_reason = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_cancelled(&self, id: Uuid) -> MessagingResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE scheduled_messages
            SET status = 'cancelled'
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // Distinguish "already final" from "no such message"
        let exists: Option<MessageStatus> =
            sqlx::query_scalar("SELECT status FROM scheduled_messages WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match exists {
            Some(_) => Ok(false),
            None => Err(MessagingError::NotFound),
        }
    }
}
