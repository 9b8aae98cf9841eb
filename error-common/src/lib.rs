//! Common error handling utilities for Carelog Engine
//!
//! This module provides standardized error types, error codes, and utilities
//! used across all Carelog Engine crates. It ensures consistent error handling
//! and secure error reporting: clinical deployments must never leak patient
//! contact details through error messages, so the sanitizer here is applied
//! before error strings reach the log stream.
//!
//! # Error Categories
//!
//! - **ValidationError**: Input validation and data format errors
//! - **AuthError**: Authentication and authorization errors
//! - **DatabaseError**: Database connection and query errors
//! - **NetworkError**: HTTP and network communication errors
//! - **ConfigError**: Startup and configuration errors
//! - **ExternalError**: Failures from third-party services
//! - **InternalError**: Infrastructure and system-level errors

pub mod codes;
pub mod sanitization;
pub mod types;

pub use sanitization::*;
pub use types::*;
