//! Connection settings.
//!
//! `ConnectionSettings` is the single record the whole tool works from: the
//! CLI fills it in, the builder turns it into a connection string and the
//! prober uses its probe timeout.

use crate::security::Credentials;
use std::time::Duration;
use tracing::warn;

/// Default application name reported to the server.
pub const DEFAULT_APPLICATION_NAME: &str = "Dummy";
/// Default data source (default instance on the local machine).
pub const DEFAULT_SERVER: &str = "localhost\\MSSQLSERVER";
/// Default initial catalog.
pub const DEFAULT_DATABASE: &str = "DatabaseName";
/// Default SQL Server login name.
pub const DEFAULT_USERNAME: &str = "user";
/// Default SQL Server login password.
pub const DEFAULT_PASSWORD: &str = "password";
/// Default connect timeout written into the connection string, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 90;
/// Default timeout for the diagnostic connection attempt, in seconds.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// How the login authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// OS-level identity of the calling process (Windows SSPI or Kerberos)
    Integrated,
    /// Explicit SQL Server login name and password
    #[default]
    SqlServer,
}

impl AuthMode {
    /// Maps the CLI's `--windows-auth` flag.
    pub const fn from_integrated_flag(integrated: bool) -> Self {
        if integrated {
            Self::Integrated
        } else {
            Self::SqlServer
        }
    }

    /// Returns `true` for integrated authentication.
    pub const fn is_integrated(self) -> bool {
        matches!(self, Self::Integrated)
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integrated => write!(f, "Integrated (Windows)"),
            Self::SqlServer => write!(f, "SQL Server"),
        }
    }
}

/// Settings for one connectivity check.
///
/// # Example
/// ```rust
/// use sqlprobe_core::{AuthMode, ConnectionSettings};
/// use std::time::Duration;
///
/// let settings = ConnectionSettings::new("db.example.com".to_string())
///     .with_database("Sales".to_string())
///     .with_sql_login("app".to_string(), "secret".to_string())
///     .with_probe_timeout(Duration::from_secs(3));
///
/// assert_eq!(settings.auth_mode, AuthMode::SqlServer);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    /// Application name shown in the server's activity monitor
    pub application_name: String,
    /// Host, `host\instance`, `host,port` or `tcp:host,port`
    pub server: String,
    /// Initial catalog
    pub database: String,
    /// Authentication mode
    pub auth_mode: AuthMode,
    /// Login used for SQL Server authentication; ignored for integrated auth
    pub credentials: Credentials,
    /// Connect timeout written into the connection string
    pub connect_timeout: Duration,
    /// Shorter timeout used for the diagnostic attempt
    pub probe_timeout: Duration,
    /// Whether the password is kept in the printed connection string
    pub persist_security_info: bool,
    /// Pooling flag written into the connection string
    pub pooling: bool,
    /// Whether to require an encrypted connection
    pub encrypt: bool,
    /// Whether to accept any server certificate
    pub trust_server_certificate: bool,
    /// Query the login identity even for SQL Server authentication
    pub show_identity: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            server: DEFAULT_SERVER.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            auth_mode: AuthMode::default(),
            credentials: Credentials::new(
                DEFAULT_USERNAME.to_string(),
                DEFAULT_PASSWORD.to_string(),
            ),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            persist_security_info: true,
            pooling: true,
            encrypt: false,
            trust_server_certificate: false,
            show_identity: false,
        }
    }
}

impl std::fmt::Display for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({})", self.server, self.database, self.auth_mode)
        // Intentionally omit credentials
    }
}

impl ConnectionSettings {
    /// Creates settings for a server with all other fields at their defaults.
    pub fn new(server: String) -> Self {
        Self {
            server,
            ..Default::default()
        }
    }

    /// Validates the settings.
    ///
    /// A probe timeout longer than the connect timeout is accepted with a
    /// warning.
    ///
    /// # Errors
    /// Returns error if the server is empty, or a timeout is zero or not a
    /// whole number of seconds
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.trim().is_empty() {
            return Err(crate::error::ProbeError::configuration(
                "server cannot be empty",
            ));
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(crate::error::ProbeError::configuration(
                "connect timeout must be at least 1 second",
            ));
        }

        if self.probe_timeout.as_secs() == 0 {
            return Err(crate::error::ProbeError::configuration(
                "probe timeout must be at least 1 second",
            ));
        }

        // The connection string carries whole seconds only
        if self.connect_timeout.subsec_nanos() != 0 {
            return Err(crate::error::ProbeError::configuration(
                "connect timeout must be a whole number of seconds",
            ));
        }

        if self.probe_timeout.subsec_nanos() != 0 {
            return Err(crate::error::ProbeError::configuration(
                "probe timeout must be a whole number of seconds",
            ));
        }

        if self.probe_timeout > self.connect_timeout {
            warn!(
                probe_timeout_secs = self.probe_timeout.as_secs(),
                connect_timeout_secs = self.connect_timeout.as_secs(),
                "Probe timeout is longer than the connect timeout"
            );
        }

        Ok(())
    }

    /// Whether the prober should run the identity query.
    pub const fn wants_identity(&self) -> bool {
        self.auth_mode.is_integrated() || self.show_identity
    }

    /// Builder method to set the application name.
    pub fn with_application_name(mut self, application_name: String) -> Self {
        self.application_name = application_name;
        self
    }

    /// Builder method to set the database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = database;
        self
    }

    /// Builder method to switch to integrated authentication.
    pub fn with_integrated_auth(mut self) -> Self {
        self.auth_mode = AuthMode::Integrated;
        self
    }

    /// Builder method to switch to SQL Server authentication with a login.
    pub fn with_sql_login(mut self, username: String, password: String) -> Self {
        self.auth_mode = AuthMode::SqlServer;
        self.credentials = Credentials::new(username, password);
        self
    }

    /// Builder method to set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Builder method to set the probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Builder method to keep or drop the password in the printed string.
    pub fn with_persist_security_info(mut self, persist: bool) -> Self {
        self.persist_security_info = persist;
        self
    }

    /// Builder method to set the pooling flag.
    pub fn with_pooling(mut self, pooling: bool) -> Self {
        self.pooling = pooling;
        self
    }

    /// Builder method to toggle encryption.
    pub fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Builder method to toggle certificate trust.
    pub fn with_trust_server_certificate(mut self, trust: bool) -> Self {
        self.trust_server_certificate = trust;
        self
    }

    /// Builder method to request the identity query.
    pub fn with_show_identity(mut self, show_identity: bool) -> Self {
        self.show_identity = show_identity;
        self
    }
}
