/// Identity token codec
///
/// Issues and verifies the signed identity tokens presented on every request.
/// Tokens are HS256 JWTs with a bounded lifetime; an unexpired, well-signed
/// token round-trips to exactly the claims it was issued with.
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::roles::Role;

/// Claims carried by an identity token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID)
    pub sub: String,

    /// Actor role
    pub role: Role,

    /// Owning doctor, present on clinic identities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,

    /// Bound patient, present on individual identities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,

    /// Issued at timestamp (seconds since epoch)
    pub iat: i64,

    /// Expiration timestamp (seconds since epoch)
    pub exp: i64,

    /// JWT ID (unique token identifier)
    pub jti: String,

    /// Issuer
    pub iss: String,
}

impl IdentityClaims {
    pub fn new(
        user_id: Uuid,
        role: Role,
        doctor_id: Option<Uuid>,
        patient_id: Option<Uuid>,
        issuer: String,
        ttl_seconds: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            role,
            doctor_id,
            patient_id,
            iat: now,
            exp: now + ttl_seconds,
            jti: Uuid::new_v4().to_string(),
            iss: issuer,
        }
    }

    /// Get the subject as a UUID
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).context("Invalid user ID in token")
    }
}

/// Why a token failed verification
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed")]
    Malformed,
}

/// Encoder/decoder for identity tokens, bound to the process-wide secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl_seconds: i64,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str, issuer: String, ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No leeway: an expired token is expired
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl_seconds,
            validation,
        }
    }

    /// Configured token lifetime in seconds
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Issue a token for the given identity. Returns the encoded token.
    pub fn issue(
        &self,
        user_id: Uuid,
        role: Role,
        doctor_id: Option<Uuid>,
        patient_id: Option<Uuid>,
    ) -> Result<String> {
        let claims = IdentityClaims::new(
            user_id,
            role,
            doctor_id,
            patient_id,
            self.issuer.clone(),
            self.ttl_seconds,
        );
        self.encode(&claims)
    }

    /// Encode pre-built claims
    pub fn encode(&self, claims: &IdentityClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .context("Failed to encode identity token")
    }

    /// Verify and decode a token
    pub fn decode(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::ImmatureSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(secret: &str) -> TokenCodec {
        TokenCodec::new(secret, "carelog".to_string(), 3600)
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let codec = codec("unit-test-secret");
        let claims = IdentityClaims::new(
            Uuid::new_v4(),
            Role::Clinic,
            Some(Uuid::new_v4()),
            None,
            "carelog".to_string(),
            3600,
        );

        let token = codec.encode(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();

        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_wrong_key_is_invalid_signature() {
        let issuing = codec("secret-a");
        let verifying = codec("secret-b");

        let token = issuing
            .issue(Uuid::new_v4(), Role::Clinic, Some(Uuid::new_v4()), None)
            .unwrap();

        assert_eq!(
            verifying.decode(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let codec = TokenCodec::new("unit-test-secret", "carelog".to_string(), -120);

        let token = codec
            .issue(Uuid::new_v4(), Role::Individual, None, Some(Uuid::new_v4()))
            .unwrap();

        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec("unit-test-secret");
        assert_eq!(codec.decode("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.decode(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_individual_claims_carry_patient_binding() {
        let codec = codec("unit-test-secret");
        let patient_id = Uuid::new_v4();
        let token = codec
            .issue(Uuid::new_v4(), Role::Individual, None, Some(patient_id))
            .unwrap();

        let decoded = codec.decode(&token).unwrap();
        assert_eq!(decoded.role, Role::Individual);
        assert_eq!(decoded.patient_id, Some(patient_id));
        assert_eq!(decoded.doctor_id, None);
    }
}
