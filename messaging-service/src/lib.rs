//! Scheduled patient messaging for Carelog Engine
//!
//! Clinics schedule WhatsApp reminders (appointment follow-ups, medication
//! prompts) to go out at a future time. This crate owns that lifecycle:
//!
//! - [`MessageScheduler`] holds the outstanding jobs in an owned map keyed by
//!   message id, with explicit `start` / `schedule` / `cancel` / `shutdown`.
//! - Messages are database rows first and in-memory tasks second:
//!   [`MessageScheduler::start`] re-arms every pending row, so scheduled
//!   messages survive a process restart.
//! - Transport is behind [`MessageSender`]; the WhatsApp HTTP client is one
//!   thin implementation and tests substitute their own.

pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod sender;
pub mod store;

pub use config::WhatsAppConfig;
pub use error::MessagingError;
pub use models::{MessageStatus, NewScheduledMessage, ScheduledMessage};
pub use scheduler::MessageScheduler;
pub use sender::{LogOnlySender, MessageSender, WhatsAppSender};
pub use store::{MessageStore, SqlxMessageStore};
