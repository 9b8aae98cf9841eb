use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{api_success, api_success_with_meta, ApiError, ApiResponse};
use crate::middleware::AuthIdentity;
use crate::server::CarelogServer;
use crate::types::pagination::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_field, validate_length, validate_phone, validate_required};

use database_layer::{NewPatient, Patient, PatientChanges, PatientChart, PatientSummary};

/// Patient registration request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    #[schema(example = "Kwame Mensah")]
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub sex: Option<String>,
    /// Contact number used for scheduled reminders (E.164)
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl RequestValidation for CreatePatientRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.full_name, "Full name is required");
        validate_length!(self.full_name, 2, 200, "Full name must be between 2 and 200 characters");
        validate_phone!(self.phone, "Invalid phone number");

        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }

        validate_field!(
            self.date_of_birth,
            self.date_of_birth <= chrono::Utc::now().date_naive(),
            "Date of birth cannot be in the future"
        );

        Ok(())
    }
}

/// Patient update request; absent fields keep their current value
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePatientRequest {
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl RequestValidation for UpdatePatientRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref full_name) = self.full_name {
            validate_length!(full_name, 2, 200, "Full name must be between 2 and 200 characters");
        }
        if let Some(ref phone) = self.phone {
            validate_phone!(phone, "Invalid phone number");
        }
        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

/// List patients query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPatientsParams {
    /// Name search term
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// List the clinic's patients
#[utoipa::path(
    get,
    path = "/api/v1/patients",
    params(ListPatientsParams),
    responses(
        (status = 200, description = "Patients retrieved", body = Vec<Patient>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn list_patients(
    State(server): State<CarelogServer>,
    Query(params): Query<ListPatientsParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (patients, total) = server
        .patients
        .list(
            doctor_id,
            params.search.as_deref(),
            params.pagination.limit(),
            params.pagination.offset(),
        )
        .await?;

    Ok(Json(api_success_with_meta(
        patients,
        params.pagination.to_metadata(total),
    )))
}

/// Register a new patient
#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = Patient),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn register_patient(
    State(server): State<CarelogServer>,
    auth: AuthIdentity,
    Json(req): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let new = NewPatient {
        full_name: req.full_name,
        date_of_birth: req.date_of_birth,
        sex: req.sex,
        phone: req.phone,
        email: req.email,
        address: req.address,
    };

    let patient = server.patients.create(doctor_id, &new).await?;

    server
        .audit
        .record(
            auth.user_id,
            "patient",
            patient.id,
            "registered",
            Some(json!({ "request_id": auth.request_id() })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(patient))))
}

/// Get a patient by ID
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient retrieved", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn get_patient(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let patient = server
        .patients
        .get(doctor_id, patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("patient"))?;

    Ok(Json(api_success(patient)))
}

/// Update a patient's demographics
#[utoipa::path(
    put,
    path = "/api/v1/patients/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = Patient),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn update_patient(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
    Json(req): Json<UpdatePatientRequest>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    let changes = PatientChanges {
        full_name: req.full_name,
        date_of_birth: req.date_of_birth,
        sex: req.sex,
        phone: req.phone,
        email: req.email,
        address: req.address,
    };

    let patient = server
        .patients
        .update(doctor_id, patient_id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("patient"))?;

    server
        .audit
        .record(auth.user_id, "patient", patient_id, "updated", None)
        .await?;

    Ok(Json(api_success(patient)))
}

/// Archive a patient
#[utoipa::path(
    delete,
    path = "/api/v1/patients/{patient_id}",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 204, description = "Patient archived"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn archive_patient(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
) -> Result<StatusCode, ApiError> {
    let doctor_id = auth.require_doctor()?;

    if !server.patients.archive(doctor_id, patient_id).await? {
        return Err(ApiError::not_found("patient"));
    }

    server
        .audit
        .record(auth.user_id, "patient", patient_id, "archived", None)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Per-patient activity summary.
///
/// Clinic identities see their own patients only; corporate identities see
/// any patient's counters (reporting view, no clinical content).
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/summary",
    params(("patient_id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Summary retrieved", body = PatientSummary),
        (status = 403, description = "Access denied"),
        (status = 404, description = "Patient not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn patient_summary(
    State(server): State<CarelogServer>,
    Path(patient_id): Path<Uuid>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<PatientSummary>>, ApiError> {
    if auth.role == Role::Clinic {
        let doctor_id = auth.require_doctor()?;
        match server.patients.owner_of(patient_id).await? {
            Some(owner) if owner == doctor_id => {}
            _ => return Err(ApiError::AccessDenied),
        }
    }

    let summary = server
        .patients
        .summary(patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("patient"))?;

    Ok(Json(api_success(summary)))
}

/// A patient's own record, for individual identities
#[utoipa::path(
    get,
    path = "/api/v1/me/record",
    responses(
        (status = 200, description = "Record retrieved", body = PatientChart),
        (status = 403, description = "Identity is not bound to a patient"),
        (status = 404, description = "Record not found")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn my_record(
    State(server): State<CarelogServer>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<PatientChart>>, ApiError> {
    let patient_id = auth.require_patient()?;

    let chart = server
        .patients
        .chart(patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("record"))?;

    Ok(Json(api_success(chart)))
}
