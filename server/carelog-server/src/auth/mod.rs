//! Identity primitives: roles, the token codec, and password hashing

pub mod password;
pub mod roles;
pub mod tokens;

pub use roles::{role_allowed, Role, CLINIC_ONLY, CLINIC_OR_CORPORATE, INDIVIDUAL_ONLY};
pub use tokens::{IdentityClaims, TokenCodec, TokenError};
