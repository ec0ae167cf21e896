//! SQL Server connectivity checker.
//!
//! Builds a connection string from the command line, opens one connection
//! with a short timeout and reports the outcome.
//!
//! # Exit Codes
//! - 0: connected
//! - 1: connection failed (unreachable, login rejected, timed out)
//! - 2: invalid settings or local setup failure
//!
//! # Security Guarantees
//! - Passwords never appear in logs
//! - The printed connection string keeps the password only with
//!   `--persist-security true` (the default)
//! - The only statement sent is `SELECT SYSTEM_USER`

mod cli;
mod report;

use clap::Parser;
use cli::Cli;
use sqlprobe_core::{ProbeError, Prober, init_logging};
use std::process::ExitCode;
use tracing::{debug, info, warn};

const EXIT_CONNECTION_FAILED: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {e}");
        return ExitCode::from(EXIT_CONFIGURATION);
    }

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(EXIT_CONFIGURATION)
        }
    }
}

/// Runs one connectivity check.
///
/// Connection failures are reported and mapped to an exit code here;
/// only configuration errors are returned.
async fn run(cli: &Cli) -> Result<ExitCode, ProbeError> {
    let password = cli.connection.resolve_password()?;
    let settings = cli.connection.to_settings(password);
    let prober = Prober::new(&settings)?;

    report::print_settings_summary(&settings);

    let message = format!(
        "Connecting to the database (timeout {}s)...",
        prober.probe_timeout().as_secs()
    );
    let spinner = report::start_spinner(&message, cli.global.quiet);
    let result = prober.probe().await;
    spinner.finish_and_clear();

    match result {
        Ok(outcome) => {
            debug!(elapsed_ms = outcome.elapsed.as_millis(), "Connectivity check passed");
            report::print_success(&settings, &outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_connection_failure() => {
            info!(target_server = %settings, "Connectivity check failed: {}", e);
            report::print_failure(&e);
            if let Err(prompt_error) =
                report::offer_diagnostics(&e, cli.global.diagnostics_mode())
            {
                warn!("Could not show diagnostics: {}", prompt_error);
            }
            Ok(ExitCode::from(EXIT_CONNECTION_FAILED))
        }
        Err(e) => Err(e),
    }
}
