//! Logging setup for the sqlprobe binary.
//!
//! Logs go to stderr so they never mix with the report on stdout.

use crate::Result;
use tracing_subscriber::EnvFilter;

/// Maps the CLI verbosity flags to a log level.
///
/// The driver is chatty at INFO, so the default stays at WARN and `-v` is
/// needed to see the probe's own progress.
pub const fn verbosity_level(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Builds the filter directives for a verbosity level.
///
/// `tiberius` is held one step below our own crates until TRACE.
pub fn filter_directives(level: tracing::Level) -> String {
    let driver = match level {
        tracing::Level::TRACE => tracing::Level::TRACE,
        tracing::Level::DEBUG => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };
    let driver = if level < driver { level } else { driver };
    format!("{level},tiberius={driver}").to_lowercase()
}

/// Initializes structured logging based on verbosity level.
///
/// `RUST_LOG`, when set, replaces the computed filter entirely.
///
/// # Arguments
/// * `verbose` - Verbosity level (0=WARN, 1=INFO, 2=DEBUG, 3+=TRACE)
/// * `quiet` - If true, only show ERROR level logs
///
/// # Example
/// ```rust,no_run
/// use sqlprobe_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = verbosity_level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(level)))
        .map_err(|e| {
            crate::error::ProbeError::configuration(format!("Invalid log filter: {}", e))
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| {
            crate::error::ProbeError::configuration(format!(
                "Failed to initialize logging: {}",
                e
            ))
        })?;

    Ok(())
}
