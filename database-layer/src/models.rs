// Domain models shared between the repositories and the HTTP layer
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Account row backing an identity token. `role` holds the wire-level role
/// string (CLINIC / CORPORATE / INDIVIDUAL); the HTTP layer owns the typed enum.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub full_name: String,
    pub clinic_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub sex: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub sex: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Partial patient update; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct PatientChanges {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct SoapNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewSoapNote {
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SoapNoteChanges {
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Examination {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Free-form vitals payload (blood pressure, pulse, temperature, ...)
    pub vitals: JsonValue,
    pub findings: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExamination {
    pub vitals: JsonValue,
    pub findings: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Intervention {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub title: String,
    pub description: String,
    pub performed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewIntervention {
    pub title: String,
    pub description: String,
    pub performed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Investigation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub title: String,
    pub result_summary: Option<String>,
    /// Reference to externally stored report material; upload mechanics are
    /// not handled here.
    pub attachment_url: Option<String>,
    pub attachment_mime: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInvestigation {
    pub title: String,
    pub result_summary: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_mime: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InvestigationChanges {
    pub result_summary: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_mime: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct AssistantNote {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub prompt: String,
    pub content: String,
    pub model_tag: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAssistantNote {
    pub prompt: String,
    pub content: String,
    pub model_tag: String,
}

/// Aggregated per-patient counters for reporting views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct PatientSummary {
    pub patient_id: Uuid,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub soap_note_count: i64,
    pub examination_count: i64,
    pub intervention_count: i64,
    pub investigation_count: i64,
    pub last_activity_at: Option<DateTime<Utc>>,
}

/// A patient's full chart as served to the patient themselves
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PatientChart {
    pub patient: Patient,
    pub soap_notes: Vec<SoapNote>,
    pub examinations: Vec<Examination>,
    pub interventions: Vec<Intervention>,
    pub investigations: Vec<Investigation>,
}
