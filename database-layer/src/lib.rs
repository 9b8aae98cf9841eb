//! Database layer for Carelog Engine
//!
//! PostgreSQL access for the clinical record store. Responsibilities:
//!
//! - Connection pooling and health checks ([`DatabasePool`])
//! - Schema migrations (embedded from `migrations/`)
//! - Domain models shared with the HTTP layer
//! - Repositories for users, patients, and clinical notes
//! - Audit trail writes ([`AuditLog`])
//!
//! The clinic-ownership invariant lives here: every clinical-note mutation in
//! [`ClinicalRepository`] runs inside one transaction that locks the patient
//! row and compares its owning doctor against the acting doctor before
//! writing. Callers cannot reach the write path without the check.

pub mod audit;
pub mod clinical_repository;
pub mod connection;
pub mod error;
pub mod models;
pub mod patient_repository;
pub mod user_repository;

pub use audit::AuditLog;
pub use clinical_repository::ClinicalRepository;
pub use connection::DatabasePool;
pub use error::{DatabaseError, DbResult};
pub use models::*;
pub use patient_repository::PatientRepository;
pub use user_repository::UserRepository;
