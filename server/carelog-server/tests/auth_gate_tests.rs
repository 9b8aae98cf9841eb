//! Gate-chain behavior, driven through a real router.
//!
//! The authentication and authorization gates are a pure function of the
//! presented token, so they are exercised here end-to-end without a
//! database: a minimal router with the same middleware stack the real
//! route table uses, plus a trivial handler.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::{from_fn, from_fn_with_state, Next},
    routing::get,
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use carelog_server::auth::{Role, TokenCodec, CLINIC_ONLY, INDIVIDUAL_ONLY};
use carelog_server::middleware::{authenticate, authorize, AuthIdentity};

const SECRET: &str = "gate-test-secret";

fn codec() -> TokenCodec {
    TokenCodec::new(SECRET, "carelog".to_string(), 3600)
}

async fn whoami(auth: AuthIdentity) -> String {
    auth.user_id.to_string()
}

/// A clinic-only route and an individual-only route behind the same
/// authentication gate, mirroring the production route table layout.
fn test_router(codec: TokenCodec) -> Router {
    Router::new()
        .merge(
            Router::new()
                .route("/clinic-only", get(whoami))
                .route_layer(from_fn(|req: axum::extract::Request, next: Next| {
                    authorize(CLINIC_ONLY, req, next)
                })),
        )
        .merge(
            Router::new()
                .route("/individual-only", get(whoami))
                .route_layer(from_fn(|req: axum::extract::Request, next: Next| {
                    authorize(INDIVIDUAL_ONLY, req, next)
                })),
        )
        .route_layer(from_fn_with_state(codec, authenticate))
}

async fn send(router: Router, path: &str, auth_header: Option<String>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(path);
    if let Some(value) = auth_header {
        builder = builder.header("Authorization", value);
    }

    let response = router
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };

    (status, body)
}

#[tokio::test]
async fn test_missing_header_is_auth_required() {
    let (status, body) = send(test_router(codec()), "/clinic-only", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "auth_required");
}

#[tokio::test]
async fn test_non_bearer_header_is_auth_required() {
    let (status, body) = send(
        test_router(codec()),
        "/clinic-only",
        Some("Token abc123".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "auth_required");
}

#[tokio::test]
async fn test_garbage_token_is_invalid_token() {
    let (status, body) = send(
        test_router(codec()),
        "/clinic-only",
        Some("Bearer not.a.token".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "invalid_token");
}

#[tokio::test]
async fn test_foreign_signature_is_invalid_token() {
    let foreign = TokenCodec::new("some-other-secret", "carelog".to_string(), 3600);
    let token = foreign
        .issue(Uuid::new_v4(), Role::Clinic, Some(Uuid::new_v4()), None)
        .unwrap();

    let (status, body) = send(
        test_router(codec()),
        "/clinic-only",
        Some(format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "invalid_token");
}

#[tokio::test]
async fn test_expired_token_is_invalid_token() {
    let expired_issuer = TokenCodec::new(SECRET, "carelog".to_string(), -120);
    let token = expired_issuer
        .issue(Uuid::new_v4(), Role::Clinic, Some(Uuid::new_v4()), None)
        .unwrap();

    let (status, body) = send(
        test_router(codec()),
        "/clinic-only",
        Some(format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "invalid_token");
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    // An INDIVIDUAL identity on a CLINIC-only route must be rejected even
    // though the token itself is perfectly valid.
    let codec = codec();
    let token = codec
        .issue(Uuid::new_v4(), Role::Individual, None, Some(Uuid::new_v4()))
        .unwrap();

    let (status, body) = send(
        test_router(codec),
        "/clinic-only",
        Some(format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");
}

#[tokio::test]
async fn test_corporate_is_rejected_on_individual_route() {
    let codec = codec();
    let token = codec
        .issue(Uuid::new_v4(), Role::Corporate, None, None)
        .unwrap();

    let (status, body) = send(
        test_router(codec),
        "/individual-only",
        Some(format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_type"], "forbidden");
}

#[tokio::test]
async fn test_allowed_role_reaches_handler() {
    let codec = codec();
    let user_id = Uuid::new_v4();
    let token = codec
        .issue(user_id, Role::Clinic, Some(Uuid::new_v4()), None)
        .unwrap();

    let (status, body) = send(
        test_router(codec),
        "/clinic-only",
        Some(format!("Bearer {token}")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::String(user_id.to_string()));
}

#[tokio::test]
async fn test_handler_without_gate_fails_closed() {
    // A route wired up without the authentication layer must still reject:
    // the extractor refuses to produce an identity out of thin air.
    let router = Router::new().route("/ungated", get(whoami));

    let (status, body) = send(router, "/ungated", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "auth_required");
}
