//! Authorization gate
//!
//! Checks the attached identity's role against a route's allow-list. Must be
//! layered strictly after [`super::authenticate`]; the identity-missing
//! branch exists only to fail closed if that ordering is ever broken.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::{role_allowed, Role};
use crate::error::ApiError;
use crate::middleware::auth_context::AuthIdentity;

/// Role gate for a route group.
///
/// Applied at route-registration time with a static allow-list:
///
/// ```ignore
/// router.route_layer(from_fn(|req, next| authorize(CLINIC_ONLY, req, next)))
/// ```
pub async fn authorize(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = req
        .extensions()
        .get::<AuthIdentity>()
        .ok_or_else(|| ApiError::auth_required("authentication is required"))?;

    if !role_allowed(identity.role, allowed) {
        return Err(ApiError::forbidden(format!(
            "role {} is not permitted on this route",
            identity.role
        )));
    }

    Ok(next.run(req).await)
}
