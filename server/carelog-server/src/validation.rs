//! Request validation utilities for consistent validation across handlers
//!
//! This module provides a `RequestValidation` trait and helper macros to
//! centralize validation logic and ensure consistent error messages.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// Implement this trait for all create/update request types so every
/// handler validates the same way.
pub trait RequestValidation {
    /// Validates the request and returns an error if validation fails
    fn validate(&self) -> Result<(), ApiError>;
}

/// Macro for validating fields with custom predicates
///
/// # Usage
///
/// ```rust,ignore
/// validate_field!(self.email, !self.email.trim().is_empty(), "Email is required");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Macro for validating required fields (non-empty strings)
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Macro for validating string length
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.len();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Macro for validating email format (basic check)
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, $field.contains('@') && $field.contains('.'), $message);
    };
}

/// Macro for validating E.164-style phone numbers
#[macro_export]
macro_rules! validate_phone {
    ($field:expr, $message:expr) => {
        $crate::validate_field!(
            $field,
            $field.starts_with('+')
                && $field.len() >= 9
                && $field.len() <= 16
                && $field.chars().skip(1).all(|c| c.is_ascii_digit()),
            $message
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    struct TestRequest {
        name: String,
        email: String,
        phone: String,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!(self.name, "Name is required");
            validate_length!(self.name, 2, 100, "Name must be between 2 and 100 characters");
            validate_email!(self.email, "Invalid email format");
            validate_phone!(self.phone, "Invalid phone number");
            Ok(())
        }
    }

    fn valid_request() -> TestRequest {
        TestRequest {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "+15551234567".to_string(),
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_name() {
        let mut request = valid_request();
        request.name = "".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_email() {
        let mut request = valid_request();
        request.email = "invalid-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validation_phone_requires_plus_prefix() {
        let mut request = valid_request();
        request.phone = "15551234567".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validation_phone_rejects_letters() {
        let mut request = valid_request();
        request.phone = "+1555CALLNOW".to_string();
        assert!(request.validate().is_err());
    }
}
