use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, api_success_with_meta, ApiError, ApiResponse};
use crate::middleware::AuthIdentity;
use crate::server::CarelogServer;
use crate::types::pagination::PaginationParams;
use crate::validation::RequestValidation;
use crate::validate_field;

use database_layer::{NewSoapNote, SoapNote, SoapNoteChanges};

/// Maximum length of a single SOAP section
const SECTION_MAX: usize = 10_000;

/// SOAP note creation request. At least one section must be present.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSoapNoteRequest {
    #[schema(example = "Patient reports intermittent chest tightness")]
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

fn validate_sections(
    sections: [&Option<String>; 4],
    require_any: bool,
) -> Result<(), ApiError> {
    if require_any && sections.iter().all(|s| s.is_none()) {
        return Err(ApiError::validation(
            "At least one SOAP section must be provided",
        ));
    }

    for section in sections.into_iter().flatten() {
        validate_field!(
            section,
            !section.trim().is_empty() && section.len() <= SECTION_MAX,
            "SOAP sections must be non-empty and at most 10000 characters"
        );
    }

    Ok(())
}

impl RequestValidation for CreateSoapNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_sections(
            [&self.subjective, &self.objective, &self.assessment, &self.plan],
            true,
        )
    }
}

/// SOAP note update request; absent sections keep their current value
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSoapNoteRequest {
    pub subjective: Option<String>,
    pub objective: Option<String>,
    pub assessment: Option<String>,
    pub plan: Option<String>,
}

impl RequestValidation for UpdateSoapNoteRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_sections(
            [&self.subjective, &self.objective, &self.assessment, &self.plan],
            false,
        )
    }
}

/// List SOAP notes query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSoapNotesParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Create a SOAP note for a patient
#[utoipa::path(
    post,
    path = "/api/v1/patients/{patient_id}/soap-notes",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = CreateSoapNoteRequest,
    responses(
        (status = 201, description = "SOAP note created", body = SoapNote),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Patient is not in the caller's clinic")
    ),
    tag = "soap-notes",
    security(("bearer_auth" = []))
)]
pub async fn create_soap_note(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
    Json(req): Json<CreateSoapNoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SoapNote>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let new = NewSoapNote {
        subjective: req.subjective,
        objective: req.objective,
        assessment: req.assessment,
        plan: req.plan,
    };

    let note = server
        .clinical
        .create_soap_note(doctor_id, patient_id, &new)
        .await?;

    server
        .audit
        .record(
            auth.user_id,
            "soap_note",
            note.id,
            "created",
            Some(json!({ "patient_id": patient_id, "request_id": auth.request_id() })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(note))))
}

/// List a patient's SOAP notes
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/soap-notes",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ListSoapNotesParams
    ),
    responses(
        (status = 200, description = "SOAP notes retrieved", body = Vec<SoapNote>)
    ),
    tag = "soap-notes",
    security(("bearer_auth" = []))
)]
pub async fn list_soap_notes(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    Query(params): Query<ListSoapNotesParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<SoapNote>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (notes, total) = server
        .clinical
        .list_soap_notes(
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

/// Get a SOAP note by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/soap-notes/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "SOAP note ID")
    ),
    responses(
        (status = 200, description = "SOAP note retrieved", body = SoapNote),
        (status = 404, description = "SOAP note not found")
    ),
    tag = "soap-notes",
    security(("bearer_auth" = []))
)]
pub async fn get_soap_note(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<SoapNote>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let note = server
        .clinical
        .get_soap_note(doctor_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("SOAP note"))?;

    Ok(Json(api_success(note)))
}

/// Update a SOAP note
#[utoipa::path(
    put,
    path = "/api/v1/patients/{patient_id}/soap-notes/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "SOAP note ID")
    ),
    request_body = UpdateSoapNoteRequest,
    responses(
        (status = 200, description = "SOAP note updated", body = SoapNote),
        (status = 403, description = "Patient is not in the caller's clinic"),
        (status = 404, description = "SOAP note not found")
    ),
    tag = "soap-notes",
    security(("bearer_auth" = []))
)]
pub async fn update_soap_note(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
    Json(req): Json<UpdateSoapNoteRequest>,
) -> Result<Json<ApiResponse<SoapNote>>, ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let note = server
        .clinical
        .update_soap_note(doctor_id, id, &SoapNoteChanges {
            subjective: req.subjective,
            objective: req.objective,
            assessment: req.assessment,
            plan: req.plan,
        })
        .await?;

    server
        .audit
        .record(auth.user_id, "soap_note", id, "updated", None)
        .await?;

    Ok(Json(api_success(note)))
}

/// Delete a SOAP note
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}/soap-notes/{id}",
    params(
        ("patient_id" = Uuid, Path, description = "Patient ID"),
        ("id" = Uuid, Path, description = "SOAP note ID")
    ),
    responses(
        (status = 204, description = "SOAP note deleted"),
        (status = 404, description = "SOAP note not found")
    ),
    tag = "soap-notes",
    security(("bearer_auth" = []))
)]
pub async fn delete_soap_note(
    State(server): State<CarelogServer>,
    Path((_patient_id, id)): Path<(Uuid, Uuid)>,
    auth: AuthIdentity,
) -> Result<StatusCode, ApiError> {
    let doctor_id = auth.require_doctor()?;

    server.clinical.delete_soap_note(doctor_id, id).await?;

    server
        .audit
        .record(auth.user_id, "soap_note", id, "deleted", None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
