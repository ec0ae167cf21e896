//! Error types for connection probing.
//!
//! Every failure the prober can hit ends up as a [`ProbeError`]. Driver errors
//! are kept as typed `tiberius` sources so the full server-side detail can be
//! rendered on request by [`diagnostic_report`].

use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Main error type for sqlprobe operations.
///
/// # Security
/// Messages never include the password. The driver does not echo credentials
/// back, and the connection string is only ever logged in redacted form.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Network unreachable, login rejected, TLS or SQL Browser failure
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: tiberius::error::Error,
    },

    /// The probe timeout elapsed first
    #[error("{operation} timed out after {} seconds", .timeout.as_secs())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Connected, but the identity query failed
    #[error("Query execution failed: {context}")]
    Query {
        context: String,
        #[source]
        source: tiberius::error::Error,
    },

    /// Invalid settings or connection string
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Convenience type alias for Results with ProbeError
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Creates a connection error with context
    pub fn connection_failed(context: impl Into<String>, error: tiberius::error::Error) -> Self {
        Self::Connection {
            context: context.into(),
            source: error,
        }
    }

    /// Creates a query error with context
    pub fn query_failed(context: impl Into<String>, error: tiberius::error::Error) -> Self {
        Self::Query {
            context: context.into(),
            source: error,
        }
    }

    /// Creates a timeout error for the named operation
    pub const fn timed_out(operation: &'static str, timeout: Duration) -> Self {
        Self::Timeout { operation, timeout }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` for failures that happened while talking to the server,
    /// as opposed to bad local input.
    pub const fn is_connection_failure(&self) -> bool {
        !matches!(self, Self::Configuration { .. })
    }

    /// The message the driver (or the timeout) produced, without our context.
    ///
    /// For server-side errors this is the text SQL Server sent back, e.g.
    /// `Login failed for user 'sa'.`
    pub fn driver_message(&self) -> String {
        match self {
            Self::Connection { source, .. } | Self::Query { source, .. } => match source {
                tiberius::error::Error::Server(token) => token.message().to_string(),
                other => other.to_string(),
            },
            Self::Timeout { .. } | Self::Configuration { .. } => self.to_string(),
        }
    }
}

/// Renders the full diagnostic detail for an error.
///
/// The report contains the top-level message, every error in the `source()`
/// chain, the SQL Server error fields when the server answered with an error
/// token, and finally the `Debug` representation.
///
/// # Example
/// ```rust
/// use sqlprobe_core::{ProbeError, diagnostic_report};
/// use std::time::Duration;
///
/// let error = ProbeError::timed_out("Opening the connection", Duration::from_secs(5));
/// let report = diagnostic_report(&error);
/// assert!(report.contains("timed out after 5 seconds"));
/// ```
pub fn diagnostic_report(error: &ProbeError) -> String {
    let mut lines = vec![format!("Error: {error}")];

    let mut source = error.source();
    let mut depth = 0_usize;
    if source.is_some() {
        lines.push("Caused by:".to_string());
    }
    while let Some(cause) = source {
        lines.push(format!("  {depth}: {cause}"));
        depth = depth.saturating_add(1);
        source = cause.source();
    }

    if let ProbeError::Connection {
        source: tiberius::error::Error::Server(token),
        ..
    }
    | ProbeError::Query {
        source: tiberius::error::Error::Server(token),
        ..
    } = error
    {
        lines.push("Server error:".to_string());
        lines.push(format!("  Number:    {}", token.code()));
        lines.push(format!("  State:     {}", token.state()));
        lines.push(format!("  Class:     {}", token.class()));
        lines.push(format!("  Message:   {}", token.message()));
        lines.push(format!("  Server:    {}", token.server()));
        lines.push(format!("  Procedure: {}", token.procedure()));
        lines.push(format!("  Line:      {}", token.line()));
    }

    lines.push("Details:".to_string());
    lines.push(format!("{error:#?}"));
    lines.join("\n")
}
