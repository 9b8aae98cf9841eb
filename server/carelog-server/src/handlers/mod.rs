//! HTTP request handlers

pub mod auth;
pub mod clinical;
pub mod health;
pub mod messages;
pub mod patients;
pub mod soap_notes;
