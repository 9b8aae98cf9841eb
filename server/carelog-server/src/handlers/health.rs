use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CarelogServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system health status
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    pub timestamp: String,
    /// API version
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Individual service health checks
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    /// Application name
    #[schema(example = "Carelog Engine")]
    pub name: String,
    /// Application version
    pub version: String,
    /// Enabled features
    pub features: Vec<String>,
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "System is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(server): State<CarelogServer>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let mut checks = HashMap::new();

    let db_healthy = server.db.is_healthy().await;
    let db_status = if db_healthy { "healthy" } else { "unhealthy" };
    checks.insert("database".to_string(), db_status.to_string());

    let outstanding = server.scheduler.outstanding().await;
    checks.insert(
        "message_scheduler".to_string(),
        format!("{outstanding} jobs armed"),
    );

    let status = if db_healthy { "healthy" } else { "degraded" };
    let response = HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    };

    Ok(Json(api_success(response)))
}

/// Version information handler
#[utoipa::path(
    get,
    path = "/version",
    tag = "health",
    responses(
        (status = 200, description = "Version information retrieved successfully", body = VersionResponse)
    )
)]
pub async fn version_info() -> Result<Json<ApiResponse<VersionResponse>>, ApiError> {
    let response = VersionResponse {
        name: "Carelog Engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: vec![
            "clinical-records".to_string(),
            "audit-logging".to_string(),
            "message-scheduling".to_string(),
        ],
    };

    Ok(Json(api_success(response)))
}
