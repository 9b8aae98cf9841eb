//! WhatsApp reminder scheduling.
//!
//! Scheduling a message is a patient-tied operation: the target patient must
//! belong to the acting doctor, checked before anything is persisted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, api_success_with_meta, ApiError, ApiResponse};
use crate::middleware::AuthIdentity;
use crate::server::CarelogServer;
use crate::types::pagination::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_length, validate_phone, validate_required};

use messaging_service::{MessageStore, NewScheduledMessage, ScheduledMessage};

/// Message scheduling request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScheduleMessageRequest {
    /// Target patient
    pub patient_id: Uuid,
    /// Destination number; defaults to the patient's registered phone
    pub phone: Option<String>,
    /// Message text
    #[schema(example = "Reminder: your follow-up visit is tomorrow at 10:00")]
    pub body: String,
    /// When to send
    pub send_at: DateTime<Utc>,
}

impl RequestValidation for ScheduleMessageRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.body, "Message body is required");
        validate_length!(self.body, 1, 4096, "Message body must be at most 4096 characters");

        if let Some(ref phone) = self.phone {
            validate_phone!(phone, "Invalid phone number");
        }

        // One minute of slack for clock skew between caller and server
        validate_field!(
            self.send_at,
            self.send_at > Utc::now() - Duration::minutes(1),
            "send_at must be in the future"
        );

        Ok(())
    }
}

/// List messages query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListMessagesParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Cancellation result
#[derive(Debug, Serialize, ToSchema)]
pub struct CancelMessageResponse {
    pub cancelled: bool,
}

/// Schedule a WhatsApp message to a patient
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    request_body = ScheduleMessageRequest,
    responses(
        (status = 201, description = "Message scheduled", body = ScheduledMessage),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Patient is not in the caller's clinic")
    ),
    tag = "messages",
    security(("bearer_auth" = []))
)]
pub async fn schedule_message(
    State(server): State<CarelogServer>,
    auth: AuthIdentity,
    Json(req): Json<ScheduleMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ScheduledMessage>>), ApiError> {
    req.validate()?;
    let doctor_id = auth.require_doctor()?;

    // Ownership check before anything is persisted; a missing patient and a
    // foreign patient answer identically.
    let patient = server
        .patients
        .get(doctor_id, req.patient_id)
        .await?
        .ok_or(ApiError::AccessDenied)?;

    let phone = req.phone.unwrap_or(patient.phone);

    let message = server
        .scheduler
        .schedule(NewScheduledMessage {
            doctor_id,
            patient_id: req.patient_id,
            phone,
            body: req.body,
            send_at: req.send_at,
        })
        .await?;

    server
        .audit
        .record(
            auth.user_id,
            "scheduled_message",
            message.id,
            "scheduled",
            Some(json!({ "patient_id": req.patient_id, "send_at": req.send_at })),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(api_success(message))))
}

/// List the clinic's scheduled messages
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    params(ListMessagesParams),
    responses((status = 200, description = "Messages retrieved", body = Vec<ScheduledMessage>)),
    tag = "messages",
    security(("bearer_auth" = []))
)]
pub async fn list_messages(
    State(server): State<CarelogServer>,
    Query(params): Query<ListMessagesParams>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<Vec<ScheduledMessage>>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let (messages, total) = server
        .messages
        .list_for_doctor(
            doctor_id,
            params.pagination.limit(),
            params.pagination.offset(),
        )
        .await?;

    Ok(Json(api_success_with_meta(
        messages,
        params.pagination.to_metadata(total),
    )))
}

/// Get a scheduled message by ID
#[utoipa::path(
    get,
    path = "/api/v1/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message retrieved", body = ScheduledMessage),
        (status = 404, description = "Message not found")
    ),
    tag = "messages",
    security(("bearer_auth" = []))
)]
pub async fn get_message(
    State(server): State<CarelogServer>,
    Path(id): Path<Uuid>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<ScheduledMessage>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    let message = server
        .messages
        .get(id)
        .await?
        .filter(|m| m.doctor_id == doctor_id)
        .ok_or_else(|| ApiError::not_found("message"))?;

    Ok(Json(api_success(message)))
}

/// Cancel a pending scheduled message
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    params(("id" = Uuid, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message cancelled", body = CancelMessageResponse),
        (status = 404, description = "Message not found"),
        (status = 409, description = "Message already reached a final state")
    ),
    tag = "messages",
    security(("bearer_auth" = []))
)]
pub async fn cancel_message(
    State(server): State<CarelogServer>,
    Path(id): Path<Uuid>,
    auth: AuthIdentity,
) -> Result<Json<ApiResponse<CancelMessageResponse>>, ApiError> {
    let doctor_id = auth.require_doctor()?;

    // Scope to the caller's clinic before touching the scheduler
    server
        .messages
        .get(id)
        .await?
        .filter(|m| m.doctor_id == doctor_id)
        .ok_or_else(|| ApiError::not_found("message"))?;

    if !server.scheduler.cancel(id).await? {
        return Err(ApiError::conflict(
            "message has already been sent, failed, or cancelled",
        ));
    }

    server
        .audit
        .record(auth.user_id, "scheduled_message", id, "cancelled", None)
        .await?;

    Ok(Json(api_success(CancelMessageResponse { cancelled: true })))
}
