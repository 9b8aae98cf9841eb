//! Examinations, interventions, investigations, and assistant notes.
//!
//! Every write goes through the ownership-checked repository; the patient in
//! the path must belong to the acting doctor or the write is rejected.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, api_success_with_meta, ApiError, ApiResponse};
use crate::middleware::AuthIdentity;
use crate::server::CarelogServer;
use crate::types::pagination::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_length, validate_required};

use database_layer::{
    AssistantNote, Examination, Intervention, Investigation, InvestigationChanges,
    NewAssistantNote, NewExamination, NewIntervention, NewInvestigation,
};

/// Shared list query parameters for clinical collections
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListClinicalParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

// ============================================================================
// EXAMINATIONS
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExaminationRequest {
    /// Free-form vitals payload (blood pressure, pulse, temperature, ...)
    pub vitals: Option<serde_json::Value>,
    #[schema(example = "Chest clear, no murmurs, mild ankle oedema")]
    pub findings: String,
}

impl RequestValidation for CreateExaminationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.findings, "Findings are required");
        validate_length!(self.findings, 1, 10_000, "Findings must be at most 10000 characters");

        if let Some(ref vitals) = self.vitals {
            validate_field!(vitals, vitals.is_object(), "Vitals must be a JSON object");
        }

        Ok(())
    }
}

/// Record an examination
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/examinations",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = CreateExaminationRequest,
    responses(
        (status = 201, description = "Examination recorded", body = Examination),
        (status = 403, description = "Patient is not in the caller's clinic")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn create_examination(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
    Json(req): Json<CreateExaminationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Examination>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let new = NewExamination {
        vitals: req.vitals.unwrap_or_else(|| json!({})),
        findings: req.findings,
    };

    let exam = server
        .clinical
        .create_examination(doctor_id, patient_id, &new)
        .await?;

    server
        .audit
        .record(
            auth.user_id,
            "examination",
            exam.id,
            "created",
            Some(json!({ "patient_id": patient_id })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(exam))))
}

/// List a patient's examinations
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/examinations",
    params(("patient_id" = Uuid, Path, description = "Patient ID"), ListClinicalParams),
    responses((status = 200, description = "Examinations retrieved", body = Vec<Examination>)),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn list_examinations(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<ListClinicalParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<Examination>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (exams, total) = server
        .clinical
        .list_examinations(
            doctor_id,
            patient_id,
            params.pagination.limit(),
            params.pagination.offset(),
        )
        .await?;

    Ok(Json(api_success_with_meta(
        exams,
        params.pagination.to_metadata(total),
    )))
}

/// Get an examination by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/examinations/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Examination ID")
    ),
    responses(
        (status = 200, description = "Examination retrieved", body = Examination),
        (status = 404, description = "Examination not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn get_examination(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Examination>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let exam = server
        .clinical
        .get_examination(doctor_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("examination"))?;

    Ok(Json(api_success(exam)))
}

/// Delete an examination
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/examinations/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Examination ID")
    ),
    responses(
        (status = 204, description = "Examination deleted"),
        (status = 404, description = "Examination not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn delete_examination(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<StatusCode, ApiError> {
    let doctor_id = auth.require_doctor()?;

    server.clinical.delete_examination(doctor_id, id).await?;

    server
        .audit
        .record(auth.user_id, "examination", id, "deleted", None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// INTERVENTIONS
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInterventionRequest {
    #[schema(example = "Wound dressing change")]
    pub title: String,
    pub description: String,
    /// Defaults to now when omitted
    pub performed_at: Option<DateTime<Utc>>,
}

impl RequestValidation for CreateInterventionRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.title, "Title is required");
        validate_length!(self.title, 1, 200, "Title must be between 1 and 200 characters");
        validate_required!(self.description, "Description is required");
        validate_length!(
            self.description,
            1,
            10_000,
            "Description must be at most 10000 characters"
        );
        Ok(())
    }
}

/// Record an intervention
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/interventions",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = CreateInterventionRequest,
    responses(
        (status = 201, description = "Intervention recorded", body = Intervention),
        (status = 403, description = "Patient is not in the caller's clinic")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn create_intervention(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
    Json(req): Json<CreateInterventionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Intervention>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let new = NewIntervention {
        title: req.title,
        description: req.description,
        performed_at: req.performed_at,
    };

    let intervention = server
        .clinical
        .create_intervention(doctor_id, patient_id, &new)
        .await?;

    server
        .audit
        .record(
            auth.user_id,
            "intervention",
            intervention.id,
            "created",
            Some(json!({ "patient_id": patient_id })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(intervention))))
}

/// List a patient's interventions
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/interventions",
    params(("patient_id" = Uuid, Path, description = "Patient ID"), ListClinicalParams),
    responses((status = 200, description = "Interventions retrieved", body = Vec<Intervention>)),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn list_interventions(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<ListClinicalParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<Intervention>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (interventions, total) = server
        .clinical
        .list_interventions(
            doctor_id,
            patient_id,
            params.pagination.limit(),
            params.pagination.offset(),
        )
        .await?;

    Ok(Json(api_success_with_meta(
        interventions,
        params.pagination.to_metadata(total),
    )))
}

/// Get an intervention by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/interventions/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Intervention ID")
    ),
    responses(
        (status = 200, description = "Intervention retrieved", body = Intervention),
        (status = 404, description = "Intervention not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn get_intervention(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Intervention>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let intervention = server
        .clinical
        .get_intervention(doctor_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("intervention"))?;

    Ok(Json(api_success(intervention)))
}

/// Delete an intervention
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/interventions/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Intervention ID")
    ),
    responses(
        (status = 204, description = "Intervention deleted"),
        (status = 404, description = "Intervention not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn delete_intervention(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<StatusCode, ApiError> {
    let doctor_id = auth.require_doctor()?;

    server.clinical.delete_intervention(doctor_id, id).await?;

    server
        .audit
        .record(auth.user_id, "intervention", id, "deleted", None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// INVESTIGATIONS
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInvestigationRequest {
    #[schema(example = "Full blood count")]
    pub title: String,
    pub result_summary: Option<String>,
    /// Reference to the externally stored report
    pub attachment_url: Option<String>,
    pub attachment_mime: Option<String>,
}

impl RequestValidation for CreateInvestigationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.title, "Title is required");
        validate_length!(self.title, 1, 200, "Title must be between 1 and 200 characters");

        if let Some(ref url) = self.attachment_url {
            validate_field!(
                url,
                url.starts_with("http://") || url.starts_with("https://"),
                "Attachment URL must be an http(s) URL"
            );
        }

        Ok(())
    }
}

/// Investigation update request (attach results as they come back)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateInvestigationRequest {
    pub result_summary: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_mime: Option<String>,
}

impl RequestValidation for UpdateInvestigationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref url) = self.attachment_url {
            validate_field!(
                url,
                url.starts_with("http://") || url.starts_with("https://"),
                "Attachment URL must be an http(s) URL"
            );
        }
        Ok(())
    }
}

/// Order an investigation
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/investigations",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = CreateInvestigationRequest,
    responses(
        (status = 201, description = "Investigation recorded", body = Investigation),
        (status = 403, description = "Patient is not in the caller's clinic")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn create_investigation(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
    Json(req): Json<CreateInvestigationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Investigation>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let new = NewInvestigation {
        title: req.title,
        result_summary: req.result_summary,
        attachment_url: req.attachment_url,
        attachment_mime: req.attachment_mime,
    };

    let investigation = server
        .clinical
        .create_investigation(doctor_id, patient_id, &new)
        .await?;

    server
        .audit
        .record(
            auth.user_id,
            "investigation",
            investigation.id,
            "created",
            Some(json!({ "patient_id": patient_id })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(investigation))))
}

/// List a patient's investigations
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/investigations",
    params(("patient_id" = Uuid, Path, description = "Patient ID"), ListClinicalParams),
    responses((status = 200, description = "Investigations retrieved", body = Vec<Investigation>)),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn list_investigations(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<ListClinicalParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<Investigation>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (investigations, total) = server
        .clinical
        .list_investigations(
            doctor_id,
            patient_id,
            params.pagination.limit(),
            params.pagination.offset(),
        )
        .await?;

    Ok(Json(api_success_with_meta(
        investigations,
        params.pagination.to_metadata(total),
    )))
}

/// Get an investigation by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/investigations/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Investigation ID")
    ),
    responses(
        (status = 200, description = "Investigation retrieved", body = Investigation),
        (status = 404, description = "Investigation not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn get_investigation(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Investigation>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let investigation = server
        .clinical
        .get_investigation(doctor_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("investigation"))?;

    Ok(Json(api_success(investigation)))
}

/// Attach results to an investigation
#[utoipa::path(
    put,
    path = "/api/v1/patients/{patient_id}/investigations/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Investigation ID")
    ),
    request_body = UpdateInvestigationRequest,
    responses(
        (status = 200, description = "Investigation updated", body = Investigation),
        (status = 403, description = "Patient is not in the caller's clinic"),
        (status = 404, description = "Investigation not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn update_investigation(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
    Json(req): Json<UpdateInvestigationRequest>,
) -> Result<Json<ApiResponse<Investigation>>, ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let investigation = server
        .clinical
        .update_investigation(doctor_id, id, &InvestigationChanges {
            result_summary: req.result_summary,
            attachment_url: req.attachment_url,
            attachment_mime: req.attachment_mime,
        })
        .await?;

    server
        .audit
        .record(auth.user_id, "investigation", id, "updated", None)
        .await?;

    Ok(Json(api_success(investigation)))
}

/// Delete an investigation
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/investigations/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Investigation ID")
    ),
    responses(
        (status = 204, description = "Investigation deleted"),
        (status = 404, description = "Investigation not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn delete_investigation(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<StatusCode, ApiError> {
    let doctor_id = auth.require_doctor()?;

    server.clinical.delete_investigation(doctor_id, id).await?;

    server
        .audit
        .record(auth.user_id, "investigation", id, "deleted", None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// ASSISTANT NOTES
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssistantNoteRequest {
    /// The prompt the assistant was asked
    pub prompt: String,
    /// The assistant's output, as reviewed by the doctor
    pub content: String,
    /// Which model produced the content
    #[schema(example = "gpt-4o-mini")]
    pub model_tag: String,
}

impl RequestValidation for CreateAssistantNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.prompt, "Prompt is required");
        validate_length!(self.prompt, 1, 10_000, "Prompt must be at most 10000 characters");
        validate_required!(self.content, "Content is required");
        validate_length!(self.content, 1, 50_000, "Content must be at most 50000 characters");
        validate_required!(self.model_tag, "Model tag is required");
        validate_length!(self.model_tag, 1, 100, "Model tag must be at most 100 characters");
        Ok(())
    }
}

/// Save an assistant note
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/assistant-notes",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = CreateAssistantNoteRequest,
    responses(
        (status = 201, description = "Assistant note saved", body = AssistantNote),
        (status = 403, description = "Patient is not in the caller's clinic")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn create_assistant_note(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
    Json(req): Json<CreateAssistantNoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AssistantNote>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let new = NewAssistantNote {
        prompt: req.prompt,
        content: req.content,
        model_tag: req.model_tag,
    };

    let note = server
        .clinical
        .create_assistant_note(doctor_id, patient_id, &new)
        .await?;

    server
        .audit
        .record(
            auth.user_id,
            "assistant_note",
            note.id,
            "created",
            Some(json!({ "patient_id": patient_id })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(note))))
}

/// List a patient's assistant notes
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/assistant-notes",
    params(("patient_id" = Uuid, Path, description = "Patient ID"), ListClinicalParams),
    responses((status = 200, description = "Assistant notes retrieved", body = Vec<AssistantNote>)),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn list_assistant_notes(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<ListClinicalParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<AssistantNote>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (notes, total) = server
        .clinical
        .list_assistant_notes(
            doctor_id,
            patient_id,
            params.pagination.limit(),
            params.pagination.offset(),
        )
        .await?;

    Ok(Json(api_success_with_meta(
        notes,
        params.pagination.to_metadata(total),
    )))
}

/// Get an assistant note by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/assistant-notes/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Assistant note ID")
    ),
    responses(
        (status = 200, description = "Assistant note retrieved", body = AssistantNote),
        (status = 404, description = "Assistant note not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn get_assistant_note(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<AssistantNote>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let note = server
        .clinical
        .get_assistant_note(doctor_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("assistant note"))?;

    Ok(Json(api_success(note)))
}

/// Delete an assistant note
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/assistant-notes/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "Assistant note ID")
    ),
    responses(
        (status = 204, description = "Assistant note deleted"),
        (status = 404, description = "Assistant note not found")
    ),
    tag = "clinical",
    security(("bearer_auth" = []))
)]
pub async fn delete_assistant_note(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<StatusCode, ApiError> {
    let doctor_id = auth.require_doctor()?;

    server.clinical.delete_assistant_note(doctor_id, id).await?;

    server
        .audit
        .record(auth.user_id, "assistant_note", id, "deleted", None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
