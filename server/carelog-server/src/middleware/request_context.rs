//! Request context middleware for tracing
//!
//! Captures the request ID (propagated from `X-Request-ID` or generated) and
//! basic request metadata for audit and log correlation.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Request context containing tracing information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique request ID for tracing
    pub request_id: String,
    /// Origin header value
    pub origin: Option<String>,
    /// User-Agent header value
    pub user_agent: Option<String>,
    /// Remote IP address
    pub remote_addr: Option<String>,
}

impl RequestContext {
    /// Create a new request context with a generated request ID
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            origin: None,
            user_agent: None,
            remote_addr: None,
        }
    }

    /// Create from headers, propagating the caller's request ID when present
    pub fn from_headers(headers: &HeaderMap, remote_addr: Option<String>) -> Self {
        let origin = headers
            .get(header::ORIGIN)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        let request_id = headers
            .get("X-Request-ID")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        Self {
            request_id,
            origin,
            user_agent,
            remote_addr,
        }
    }

    /// Best-effort remote address: connect info first, then proxy headers
    pub fn remote_addr_from_parts(parts: &Parts) -> Option<String> {
        parts
            .extensions
            .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get("X-Forwarded-For")
                    .and_then(|h| h.to_str().ok())
                    .map(|s| s.split(',').next().unwrap_or("").trim().to_string())
            })
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote_addr = Self::remote_addr_from_parts(parts);
        Ok(RequestContext::from_headers(&parts.headers, remote_addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_context_new() {
        let ctx = RequestContext::new();
        assert!(!ctx.request_id.is_empty());
    }

    #[test]
    fn test_propagates_caller_request_id() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-ID", HeaderValue::from_static("req-42"));

        let ctx = RequestContext::from_headers(&headers, None);
        assert_eq!(ctx.request_id, "req-42");
    }

    #[test]
    fn test_generates_request_id_when_absent() {
        let ctx = RequestContext::from_headers(&HeaderMap::new(), None);
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());
    }

    #[test]
    fn test_captures_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let ctx = RequestContext::from_headers(&headers, Some("10.0.0.9".to_string()));
        assert_eq!(ctx.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(ctx.remote_addr.as_deref(), Some("10.0.0.9"));
    }
}
