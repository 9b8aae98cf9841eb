use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{password, Role};
use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CarelogServer;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_length, validate_phone, validate_required};

/// Clinic registration request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login email address
    #[schema(example = "dr.osei@example-clinic.org")]
    pub email: String,
    /// Account password
    pub password: String,
    /// Doctor's full name
    #[schema(example = "Dr. Ama Osei")]
    pub full_name: String,
    /// Clinic name
    #[schema(example = "Osei Family Practice")]
    pub clinic_name: String,
    /// Clinic phone number (E.164)
    pub phone: Option<String>,
}

impl RequestValidation for RegisterRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_email!(self.email, "Invalid email format");
        validate_length!(self.password, 8, 128, "Password must be between 8 and 128 characters");
        validate_required!(self.full_name, "Full name is required");
        validate_length!(self.full_name, 2, 200, "Full name must be between 2 and 200 characters");
        validate_required!(self.clinic_name, "Clinic name is required");
        validate_length!(self.clinic_name, 2, 200, "Clinic name must be between 2 and 200 characters");

        if let Some(ref phone) = self.phone {
            validate_phone!(phone, "Invalid phone number");
        }

        Ok(())
    }
}

/// Login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email address
    pub email: String,
    /// Account password
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

/// Authentication response
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Signed identity token
    pub token: String,
    /// Token lifetime in seconds
    pub expires_in: i64,
    /// Authenticated user ID
    pub user_id: Uuid,
    /// Actor role carried by the token
    pub role: Role,
}

/// Register a new clinic account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Clinic registered", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(server): State<CarelogServer>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    let (user, doctor) = server
        .users
        .create_clinic_user(
            &req.email,
            &password_hash,
            &req.full_name,
            &req.clinic_name,
            req.phone.as_deref(),
        )
        .await?;

    let token = server
        .tokens
        .issue(user.id, Role::Clinic, Some(doctor.id), None)?;

    server
        .audit
        .record(
            user.id,
            "user",
            user.id,
            "registered",
            Some(json!({ "clinic_name": req.clinic_name })),
        )
        .await?;

    let response = AuthResponse {
        token,
        expires_in: server.tokens.ttl_seconds(),
        user_id: user.id,
        role: Role::Clinic,
    };

    Ok((StatusCode::CREATED, Json(api_success(response))))
}

/// Authenticate and obtain an identity token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(server): State<CarelogServer>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate()?;

    let user = server
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let role = Role::parse(&user.role)
        .ok_or_else(|| ApiError::internal("account carries an unknown role"))?;

    let token = server
        .tokens
        .issue(user.id, role, user.doctor_id, user.patient_id)?;

    server
        .audit
        .record(user.id, "user", user.id, "logged_in", None)
        .await?;

    let response = AuthResponse {
        token,
        expires_in: server.tokens.ttl_seconds(),
        user_id: user.id,
        role,
    };

    Ok(Json(api_success(response)))
}
