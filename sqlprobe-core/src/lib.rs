//! Core types and operations for sqlprobe.
//!
//! This crate holds everything the `sqlprobe` binary needs apart from the
//! terminal UI: the settings record, the connection-string builder and the
//! connectivity prober that drives the `tiberius` TDS driver.
//!
//! # Security Guarantees
//! - Passwords live in `Zeroizing` containers and are cleared on drop
//! - Passwords never appear in `Debug` output or log lines
//! - The only statement ever sent to the server is `SELECT SYSTEM_USER`
//!
//! # Example
//! ```rust
//! use sqlprobe_core::{ConnectionSettings, ConnectionStringBuilder};
//!
//! let settings = ConnectionSettings::new("db.example.com".to_string())
//!     .with_database("Sales".to_string())
//!     .with_integrated_auth();
//!
//! let connection_string = ConnectionStringBuilder::from_settings(&settings).build();
//! assert!(connection_string.contains("Integrated Security=True"));
//! assert!(!connection_string.contains("User ID"));
//! ```

pub mod connection_string;
pub mod error;
pub mod logging;
pub mod probe;
pub mod security;
pub mod settings;

pub use connection_string::ConnectionStringBuilder;
pub use error::{ProbeError, Result, diagnostic_report};
pub use logging::init_logging;
pub use probe::{ProbeOutcome, Prober};
pub use security::Credentials;
pub use settings::{AuthMode, ConnectionSettings};
