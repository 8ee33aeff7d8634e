//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients for external services: object storage and SMTP.

pub mod mailer;
pub mod storage;
