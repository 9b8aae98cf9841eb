//! Centralized API route path constants
//!
//! Constants for all API routes so runtime route definitions stay consistent
//! with the OpenAPI documentation. utoipa `#[path(...)]` attributes need
//! string literals and cannot use these constants directly; the paths in
//! those attributes must match these constants exactly.

/// API base paths
pub const API_V1: &str = "/api/v1";

/// Health check endpoints
pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

/// Authentication endpoints
pub mod auth {
    pub const REGISTER: &str = "/auth/register";
    pub const LOGIN: &str = "/auth/login";
}

/// Patient management endpoints
pub mod patients {
    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_BY_ID: &str = "/patients/:patient_id";
    pub const PATIENT_SUMMARY: &str = "/patients/:patient_id/summary";

    pub const SOAP_NOTES: &str = "/patients/:patient_id/soap-notes";
    pub const SOAP_NOTE_BY_ID: &str = "/patients/:patient_id/soap-notes/:id";

    pub const EXAMINATIONS: &str = "/patients/:patient_id/examinations";
    pub const EXAMINATION_BY_ID: &str = "/patients/:patient_id/examinations/:id";

    pub const INTERVENTIONS: &str = "/patients/:patient_id/interventions";
    pub const INTERVENTION_BY_ID: &str = "/patients/:patient_id/interventions/:id";

    pub const INVESTIGATIONS: &str = "/patients/:patient_id/investigations";
    pub const INVESTIGATION_BY_ID: &str = "/patients/:patient_id/investigations/:id";

    pub const ASSISTANT_NOTES: &str = "/patients/:patient_id/assistant-notes";
    pub const ASSISTANT_NOTE_BY_ID: &str = "/patients/:patient_id/assistant-notes/:id";
}

/// Scheduled message endpoints
pub mod messages {
    pub const MESSAGES: &str = "/messages";
    pub const MESSAGE_BY_ID: &str = "/messages/:id";
}

/// Self-service endpoints for patient identities
pub mod me {
    pub const RECORD: &str = "/me/record";
}
