//! Credential protection.
//!
//! - `credentials`: login credentials with automatic memory zeroing
//!
//! Connection-string redaction lives next to the builder in
//! [`crate::connection_string`].

mod credentials;

pub use credentials::Credentials;

/// Placeholder shown wherever a password would otherwise be printed.
pub const REDACTED: &str = "****";
