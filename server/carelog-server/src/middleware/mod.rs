//! Middleware modules for request processing

pub mod auth_context;
pub mod authorize;
pub mod request_context;

// Re-export for convenience
pub use auth_context::{authenticate, AuthIdentity};
pub use authorize::authorize;
pub use request_context::RequestContext;

use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS layer for the API surface. The browser client runs on a
/// separate origin in every deployment shape.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
