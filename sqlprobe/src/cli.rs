//! Command-line interface definition.
//!
//! Precedence is flag, then environment variable, then the static default.

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser};
use sqlprobe_core::settings::{
    DEFAULT_APPLICATION_NAME, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE, DEFAULT_PASSWORD,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_SERVER, DEFAULT_USERNAME,
};
use sqlprobe_core::{ConnectionSettings, ProbeError};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "sqlprobe")]
#[command(about = "SQL Server connectivity checker")]
#[command(version)]
#[command(long_about = "
sqlprobe - SQL Server connectivity checker

Builds a connection string from the given options, opens a single connection
with a short timeout and reports whether it worked. On success the connection
string is printed; on failure the driver's message is shown and the full
diagnostic detail is available on request.

Boolean options take an optional value: -E, -E true, --pooling false.

EXAMPLES:
  sqlprobe -S \"localhost\\SQLEXPRESS\" -d MyDB -U sa -P secret
  sqlprobe -S tcp:db.example.com,1433 -d Sales -E
  sqlprobe -S db.example.com -d Sales -U app --prompt-password --whoami
")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Application name shown in the server's activity monitor
    #[arg(short = 'K', long = "app-name", default_value = DEFAULT_APPLICATION_NAME)]
    pub application_name: String,

    /// Server host name or IP address; use host\instance for a named instance
    #[arg(
        short = 'S',
        long,
        env = "SQLPROBE_SERVER",
        default_value = DEFAULT_SERVER
    )]
    pub server: String,

    /// Database to connect to
    #[arg(
        short = 'd',
        long,
        env = "SQLPROBE_DATABASE",
        default_value = DEFAULT_DATABASE
    )]
    pub database: String,

    /// Use Windows (integrated) authentication instead of a SQL Server login
    #[arg(
        short = 'E',
        long = "windows-auth",
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub windows_auth: bool,

    /// SQL Server login name; ignored with Windows authentication
    #[arg(
        short = 'U',
        long,
        env = "SQLPROBE_USER",
        default_value = DEFAULT_USERNAME
    )]
    pub user: String,

    /// SQL Server login password; ignored with Windows authentication
    #[arg(
        short = 'P',
        long,
        env = "SQLPROBE_PASSWORD",
        hide_env_values = true,
        conflicts_with = "prompt_password"
    )]
    pub password: Option<String>,

    /// Read the password from the terminal without echoing it
    #[arg(long)]
    pub prompt_password: bool,

    /// Connect timeout written into the connection string, in seconds
    #[arg(short = 'l', long = "timeout", value_name = "SECONDS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    pub connect_timeout: u64,

    /// Keep the password in the printed connection string
    #[arg(
        short = 'p',
        long = "persist-security",
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "true",
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub persist_security_info: bool,

    /// Connection pooling flag for the connection string
    #[arg(
        short = 'A',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "true",
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub pooling: bool,

    /// Encrypt the connection (recommended in production)
    #[arg(
        short = 'N',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub encrypt: bool,

    /// Accept the server certificate without validation
    #[arg(
        short = 'C',
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub trust_server_certificate: bool,

    /// Timeout for the connection check, in seconds; keep it shorter than --timeout
    #[arg(short = 'o', long = "open-timeout", value_name = "SECONDS", default_value_t = DEFAULT_PROBE_TIMEOUT_SECS)]
    pub probe_timeout: u64,

    /// Show the login identity reported by the server (always on with -E)
    #[arg(long)]
    pub whoami: bool,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, help = "Suppress all log output except errors")]
    pub quiet: bool,

    /// Print the full diagnostic detail on failure without asking
    #[arg(long, conflicts_with = "no_prompt")]
    pub details: bool,

    /// Never ask whether to print the diagnostic detail
    #[arg(long)]
    pub no_prompt: bool,
}

/// What to do with the diagnostic report after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticsMode {
    Always,
    Ask,
    Never,
}

impl GlobalArgs {
    pub const fn diagnostics_mode(&self) -> DiagnosticsMode {
        if self.details {
            DiagnosticsMode::Always
        } else if self.no_prompt {
            DiagnosticsMode::Never
        } else {
            DiagnosticsMode::Ask
        }
    }
}

impl ConnectionArgs {
    /// Resolves the password from the flag, the terminal prompt or the default.
    ///
    /// The prompt is skipped for Windows authentication, which has no use
    /// for a password.
    pub fn resolve_password(&self) -> Result<String, ProbeError> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }

        if self.prompt_password && !self.windows_auth {
            let prompt = format!("Password for {}: ", self.user);
            return rpassword::prompt_password(prompt).map_err(|e| {
                ProbeError::configuration(format!("Failed to read password: {}", e))
            });
        }

        Ok(DEFAULT_PASSWORD.to_string())
    }

    /// Builds the settings record from the parsed arguments.
    pub fn to_settings(&self, password: String) -> ConnectionSettings {
        let settings = ConnectionSettings::new(self.server.clone())
            .with_application_name(self.application_name.clone())
            .with_database(self.database.clone())
            .with_sql_login(self.user.clone(), password)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_probe_timeout(Duration::from_secs(self.probe_timeout))
            .with_persist_security_info(self.persist_security_info)
            .with_pooling(self.pooling)
            .with_encrypt(self.encrypt)
            .with_trust_server_certificate(self.trust_server_certificate)
            .with_show_identity(self.whoami);

        if self.windows_auth {
            settings.with_integrated_auth()
        } else {
            settings
        }
    }
}
