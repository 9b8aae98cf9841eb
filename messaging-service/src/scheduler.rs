use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::MessagingResult;
use crate::models::{MessageStatus, NewScheduledMessage, ScheduledMessage};
use crate::sender::MessageSender;
use crate::store::MessageStore;

/// Owns the outstanding scheduled-message jobs.
///
/// One tokio task per pending message, keyed by message id so a cancellation
/// can abort exactly the right job. The store row is the source of truth:
/// tasks are re-armed from it at startup, and every task records its outcome
/// in the store before exiting.
pub struct MessageScheduler {
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn MessageSender>,
    jobs: Arc<RwLock<HashMap<Uuid, JoinHandle<()>>>>,
}

impl MessageScheduler {
    pub fn new(store: Arc<dyn MessageStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            store,
            sender,
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Re-arm every pending message from the store. Messages already overdue
    /// are sent immediately. Returns the number of jobs armed.
    pub async fn start(&self) -> MessagingResult<usize> {
        let pending = self.store.load_pending().await?;
        let count = pending.len();

        for message in pending {
            self.arm(message).await;
        }

        info!(jobs = count, "Message scheduler started");
        Ok(count)
    }

    /// Persist a new message and arm its delivery task
    pub async fn schedule(&self, new: NewScheduledMessage) -> MessagingResult<ScheduledMessage> {
        let message = self.store.insert(&new).await?;

        info!(
            message_id = %message.id,
            send_at = %message.send_at,
            "Message scheduled"
        );

        self.arm(message.clone()).await;
        Ok(message)
    }

    /// Cancel a pending message: mark the row cancelled, then abort the task.
    /// Returns `false` when the message had already reached a final state.
    pub async fn cancel(&self, id: Uuid) -> MessagingResult<bool> {
        let cancelled = self.store.mark_cancelled(id).await?;

        if cancelled {
            if let Some(handle) = self.jobs.write().await.remove(&id) {
                handle.abort();
            }
            info!(message_id = %id, "Message cancelled");
        }

        Ok(cancelled)
    }

    /// Abort all outstanding delivery tasks. Rows stay pending and are
    /// re-armed by the next `start()`.
    pub async fn shutdown(&self) {
        let mut jobs = self.jobs.write().await;
        let count = jobs.len();

        for (_, handle) in jobs.drain() {
            handle.abort();
        }

        info!(jobs = count, "Message scheduler shut down");
    }

    /// Number of jobs currently armed
    pub async fn outstanding(&self) -> usize {
        self.jobs.read().await.len()
    }

    async fn arm(&self, message: ScheduledMessage) {
        if message.status != MessageStatus::Pending {
            warn!(message_id = %message.id, "Refusing to arm a non-pending message");
            return;
        }

        let id = message.id;
        let store = Arc::clone(&self.store);
        let sender = Arc::clone(&self.sender);
        let jobs = Arc::clone(&self.jobs);

        let handle = tokio::spawn(async move {
            let delay = (message.send_at - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(delay).await;

            match sender.send(&message.phone, &message.body).await {
                Ok(()) => {
                    if let Err(e) = store.mark_sent(id).await {
                        error!(message_id = %id, error = %e, "Failed to record sent message");
                    } else {
                        info!(message_id = %id, "Message sent");
                    }
                }
                Err(e) => {
                    let reason = e.to_string();
                    warn!(message_id = %id, error = %reason, "Message delivery failed");
                    if let Err(e) = store.mark_failed(id, &reason).await {
                        error!(message_id = %id, error = %e, "Failed to record failed message");
                    }
                }
            }

            jobs.write().await.remove(&id);
        });

        self.jobs.write().await.insert(id, handle);
    }
}

impl Drop for MessageScheduler {
    fn drop(&mut self) {
        if let Ok(jobs) = self.jobs.try_read() {
            for handle in jobs.values() {
                handle.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessagingError;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory store double
    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<ScheduledMessage>>,
    }

    impl MemoryStore {
        fn status_of(&self, id: Uuid) -> Option<MessageStatus> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.id == id)
                .map(|m| m.status)
        }

        fn seed_pending(&self, send_at: chrono::DateTime<Utc>) -> ScheduledMessage {
            let message = ScheduledMessage {
                id: Uuid::new_v4(),
                doctor_id: Uuid::new_v4(),
                patient_id: Uuid::new_v4(),
                phone: "+15550001111".to_string(),
                body: "Reminder: follow-up visit tomorrow".to_string(),
                send_at,
                status: MessageStatus::Pending,
                failure_reason: None,
                sent_at: None,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(message.clone());
            message
        }
    }

    #[async_trait]
    impl MessageStore for MemoryStore {
        async fn insert(&self, new: &NewScheduledMessage) -> MessagingResult<ScheduledMessage> {
            let message = ScheduledMessage {
                id: Uuid::new_v4(),
                doctor_id: new.doctor_id,
                patient_id: new.patient_id,
                phone: new.phone.clone(),
                body: new.body.clone(),
                send_at: new.send_at,
                status: MessageStatus::Pending,
                failure_reason: None,
                sent_at: None,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(message.clone());
            Ok(message)
        }

        async fn load_pending(&self) -> MessagingResult<Vec<ScheduledMessage>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.status == MessageStatus::Pending)
                .cloned()
                .collect())
        }

        async fn get(&self, id: Uuid) -> MessagingResult<Option<ScheduledMessage>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.id == id)
                .cloned())
        }

        async fn list_for_doctor(
            &self,
            doctor_id: Uuid,
            _limit: i64,
            _offset: i64,
        ) -> MessagingResult<(Vec<ScheduledMessage>, i64)> {
            let rows: Vec<_> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.doctor_id == doctor_id)
                .cloned()
                .collect();
            let total = rows.len() as i64;
            Ok((rows, total))
        }

        async fn mark_sent(&self, id: Uuid) -> MessagingResult<()> {
            for m in self.rows.lock().unwrap().iter_mut() {
                if m.id == id && m.status == MessageStatus::Pending {
                    m.status = MessageStatus::Sent;
                    m.sent_at = Some(Utc::now());
                }
            }
            Ok(())
        }

        async fn mark_failed(&self, id: Uuid, reason: &str) -> MessagingResult<()> {
            for m in self.rows.lock().unwrap().iter_mut() {
                if m.id == id && m.status == MessageStatus::Pending {
                    m.status = MessageStatus::Failed;
                    m.failure_reason = Some(reason.to_string());
                }
            }
            Ok(())
        }

        async fn mark_cancelled(&self, id: Uuid) -> MessagingResult<bool> {
            let mut rows = self.rows.lock().unwrap();
            let Some(m) = rows.iter_mut().find(|m| m.id == id) else {
                return Err(MessagingError::NotFound);
            };
            if m.status != MessageStatus::Pending {
                return Ok(false);
            }
            m.status = MessageStatus::Cancelled;
            Ok(true)
        }
    }

    /// Sender double that records deliveries
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, to: &str, _body: &str) -> MessagingResult<()> {
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }
    }

    /// Sender double that always fails
    struct FailingSender;

    #[async_trait]
    impl MessageSender for FailingSender {
        async fn send(&self, _to: &str, _body: &str) -> MessagingResult<()> {
            Err(MessagingError::SendFailed(
                "provider unavailable".to_string(),
            ))
        }
    }

    fn new_message(send_at: chrono::DateTime<Utc>) -> NewScheduledMessage {
        NewScheduledMessage {
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            phone: "+15550001111".to_string(),
            body: "Reminder: follow-up visit tomorrow".to_string(),
            send_at,
        }
    }

    async fn wait_until_drained(scheduler: &MessageScheduler) {
        for _ in 0..50 {
            if scheduler.outstanding().await == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_due_message_is_sent_and_recorded() {
        let store = Arc::new(MemoryStore::default());
        let sender = Arc::new(RecordingSender::default());
        let scheduler = MessageScheduler::new(store.clone(), sender.clone());

        let message = scheduler.schedule(new_message(Utc::now())).await.unwrap();

        wait_until_drained(&scheduler).await;

        assert_eq!(sender.sent.lock().unwrap().len(), 1);
        assert_eq!(store.status_of(message.id), Some(MessageStatus::Sent));
    }

    #[tokio::test]
    async fn test_cancelled_message_never_sends() {
        let store = Arc::new(MemoryStore::default());
        let sender = Arc::new(RecordingSender::default());
        let scheduler = MessageScheduler::new(store.clone(), sender.clone());

        let message = scheduler
            .schedule(new_message(Utc::now() + ChronoDuration::hours(1)))
            .await
            .unwrap();

        assert!(scheduler.cancel(message.id).await.unwrap());
        assert_eq!(scheduler.outstanding().await, 0);
        assert_eq!(store.status_of(message.id), Some(MessageStatus::Cancelled));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_after_send_reports_already_final() {
        let store = Arc::new(MemoryStore::default());
        let sender = Arc::new(RecordingSender::default());
        let scheduler = MessageScheduler::new(store.clone(), sender.clone());

        let message = scheduler.schedule(new_message(Utc::now())).await.unwrap();
        wait_until_drained(&scheduler).await;

        assert!(!scheduler.cancel(message.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_cancel_unknown_message_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let scheduler = MessageScheduler::new(store, Arc::new(RecordingSender::default()));

        let result = scheduler.cancel(Uuid::new_v4()).await;
        assert!(matches!(result, Err(MessagingError::NotFound)));
    }

    #[tokio::test]
    async fn test_start_rearms_pending_rows() {
        let store = Arc::new(MemoryStore::default());
        let overdue = store.seed_pending(Utc::now() - ChronoDuration::minutes(5));
        store.seed_pending(Utc::now() + ChronoDuration::hours(2));

        let sender = Arc::new(RecordingSender::default());
        let scheduler = MessageScheduler::new(store.clone(), sender.clone());

        let armed = scheduler.start().await.unwrap();
        assert_eq!(armed, 2);

        // The overdue message goes out immediately; the future one stays armed
        for _ in 0..50 {
            if scheduler.outstanding().await == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.status_of(overdue.id), Some(MessageStatus::Sent));
        assert_eq!(scheduler.outstanding().await, 1);

        scheduler.shutdown().await;
        assert_eq!(scheduler.outstanding().await, 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_recorded() {
        let store = Arc::new(MemoryStore::default());
        let scheduler = MessageScheduler::new(store.clone(), Arc::new(FailingSender));

        let message = scheduler.schedule(new_message(Utc::now())).await.unwrap();
        wait_until_drained(&scheduler).await;

        assert_eq!(store.status_of(message.id), Some(MessageStatus::Failed));
        let stored = store.get(message.id).await.unwrap().unwrap();
        assert!(stored
            .failure_reason
            .unwrap()
            .contains("provider unavailable"));
    }
}
