//! Authentication gate
//!
//! Validates the identity token on inbound requests. On success the decoded
//! identity is attached to the request as an [`AuthIdentity`] extension;
//! handlers receive it through the [`FromRequestParts`] extractor. Requests
//! without a usable credential never reach a handler.

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::auth::{Role, TokenCodec};
use crate::error::ApiError;
use crate::middleware::request_context::RequestContext;

/// Identity attached to a request after successful authentication.
///
/// Purely a function of the presented token: nothing here touches shared
/// state, and the value is dropped with the request.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    pub user_id: Uuid,
    pub role: Role,
    /// Owning doctor, present on clinic identities
    pub doctor_id: Option<Uuid>,
    /// Bound patient, present on individual identities
    pub patient_id: Option<Uuid>,
    /// Request metadata for audit correlation
    pub request: RequestContext,
}

impl AuthIdentity {
    /// Get request ID (convenience method)
    pub fn request_id(&self) -> &str {
        &self.request.request_id
    }

    /// The acting doctor, required for clinical writes. A clinic token
    /// without a doctor binding cannot touch patient data.
    pub fn require_doctor(&self) -> Result<Uuid, ApiError> {
        self.doctor_id
            .ok_or_else(|| ApiError::forbidden("identity is not bound to a doctor"))
    }

    /// The bound patient, required for self-service record access
    pub fn require_patient(&self) -> Result<Uuid, ApiError> {
        self.patient_id
            .ok_or_else(|| ApiError::forbidden("identity is not bound to a patient"))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::auth_required("Missing Authorization header"))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::auth_required("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

/// Authentication middleware.
///
/// Runs ahead of every protected route: extracts the bearer token, verifies
/// it with the process-wide codec, and attaches the decoded identity to the
/// request. Stateless and single-attempt; failures are terminal 401s.
pub async fn authenticate(
    State(codec): State<TokenCodec>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers())?;

    let claims = codec
        .decode(token)
        .map_err(|e| ApiError::invalid_token(e.to_string()))?;

    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::invalid_token("token subject is not a valid user ID"))?;

    let (mut parts, body) = req.into_parts();
    let remote_addr = RequestContext::remote_addr_from_parts(&parts);
    let request = RequestContext::from_headers(&parts.headers, remote_addr);

    let identity = AuthIdentity {
        user_id,
        role: claims.role,
        doctor_id: claims.doctor_id,
        patient_id: claims.patient_id,
        request,
    };
    parts.extensions.insert(identity);

    req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Unreachable when the route is behind `authenticate`; kept as a
        // guard against routes wired up without the gate.
        parts
            .extensions
            .get::<AuthIdentity>()
            .cloned()
            .ok_or_else(|| ApiError::auth_required("authentication is required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_token_strips_bearer_prefix() {
        let headers = headers_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_is_auth_required() {
        let err = extract_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.error_type(), "auth_required");
    }

    #[test]
    fn test_non_bearer_scheme_is_auth_required() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        let err = extract_token(&headers).unwrap_err();
        assert_eq!(err.error_type(), "auth_required");
    }

    #[test]
    fn test_require_doctor_rejects_unbound_identity() {
        let identity = AuthIdentity {
            user_id: Uuid::new_v4(),
            role: Role::Clinic,
            doctor_id: None,
            patient_id: None,
            request: RequestContext::new(),
        };
        assert_eq!(
            identity.require_doctor().unwrap_err().error_type(),
            "forbidden"
        );
    }
}
