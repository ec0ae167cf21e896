//! Connectivity probing against SQL Server.
//!
//! A probe is a single attempt: open one connection with the short probe
//! timeout, optionally ask the server who we are, close the connection.
//! There are no retries.
//!
//! # Security
//! - The connection string is only logged in redacted form
//! - The identity query is read-only (`SELECT SYSTEM_USER`)

use crate::connection_string::ConnectionStringBuilder;
use crate::error::{ProbeError, Result};
use crate::settings::ConnectionSettings;
use std::time::{Duration, Instant};
use tiberius::{Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info, warn};

/// Query used to read the login identity.
pub const IDENTITY_QUERY: &str = "SELECT SYSTEM_USER";

/// Identity reported when the server returns no value.
pub const UNKNOWN_IDENTITY: &str = "Unknown";

type SqlClient = Client<Compat<TcpStream>>;

/// Result of a successful probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Time from the start of the attempt until the connection was closed
    pub elapsed: Duration,
    /// Login identity reported by the server, when it was requested
    pub identity: Option<String>,
}

/// Single-shot connectivity prober.
///
/// # Example
/// ```rust,no_run
/// use sqlprobe_core::{ConnectionSettings, Prober};
///
/// # async fn run() -> sqlprobe_core::Result<()> {
/// let settings = ConnectionSettings::new("tcp:localhost,1433".to_string())
///     .with_sql_login("sa".to_string(), "secret".to_string())
///     .with_show_identity(true);
///
/// let outcome = Prober::new(&settings)?.probe().await?;
/// println!("connected as {:?}", outcome.identity);
/// # Ok(())
/// # }
/// ```
pub struct Prober {
    config: Config,
    target: String,
    probe_timeout: Duration,
    wants_identity: bool,
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // tiberius::Config carries the password in its Debug output
        f.debug_struct("Prober")
            .field("target", &self.target)
            .field("probe_timeout", &self.probe_timeout)
            .field("wants_identity", &self.wants_identity)
            .finish_non_exhaustive()
    }
}

impl Prober {
    /// Prepares a probe for the given settings.
    ///
    /// The connection string is rebuilt with the probe timeout in place of
    /// the connect timeout and parsed by the driver.
    ///
    /// # Errors
    /// Returns a configuration error if the settings are invalid or the
    /// driver rejects the connection string
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        settings.validate()?;

        let builder = ConnectionStringBuilder::from_settings(settings)
            .with_connect_timeout(settings.probe_timeout);
        let connection_string = builder.build();
        debug!(
            connection_string = %builder.build_redacted(),
            "Prepared probe connection string"
        );

        let config = Config::from_ado_string(&connection_string).map_err(|e| {
            ProbeError::configuration(format!("Invalid connection string: {}", e))
        })?;

        if settings.auth_mode.is_integrated() && !integrated_auth_available() {
            warn!(
                "Integrated authentication is not available in this build; \
                 the server will most likely reject the login"
            );
        }

        if !settings.auth_mode.is_integrated() && !settings.credentials.has_password() {
            warn!(
                user = settings.credentials.username(),
                "SQL Server login has an empty password"
            );
        }

        Ok(Self {
            config,
            target: settings.to_string(),
            probe_timeout: settings.probe_timeout,
            wants_identity: settings.wants_identity(),
        })
    }

    /// Timeout applied to the connection attempt and to the identity query.
    pub const fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Runs the probe.
    ///
    /// The client is dropped on every error path; on success it is closed
    /// explicitly before returning.
    ///
    /// # Errors
    /// Returns `ProbeError::Timeout` when the probe timeout elapses,
    /// `ProbeError::Connection` when the server cannot be reached or rejects
    /// the login, and `ProbeError::Query` when the identity query fails
    pub async fn probe(&self) -> Result<ProbeOutcome> {
        let started = Instant::now();
        info!(
            target_server = %self.target,
            timeout_secs = self.probe_timeout.as_secs(),
            "Opening connection"
        );

        let mut client = timeout(self.probe_timeout, connect(self.config.clone()))
            .await
            .map_err(|_| ProbeError::timed_out("Opening the connection", self.probe_timeout))??;
        debug!(elapsed_ms = started.elapsed().as_millis(), "Login succeeded");

        let identity = if self.wants_identity {
            let identity = timeout(self.probe_timeout, current_identity(&mut client))
                .await
                .map_err(|_| ProbeError::timed_out("The identity query", self.probe_timeout))??;
            debug!(%identity, "Resolved login identity");
            Some(identity)
        } else {
            None
        };

        if let Err(e) = client.close().await {
            debug!(error = %e, "Connection did not close cleanly");
        }

        let elapsed = started.elapsed();
        info!(elapsed_ms = elapsed.as_millis(), "Probe succeeded");
        Ok(ProbeOutcome { elapsed, identity })
    }
}

/// Whether this build can perform integrated authentication.
pub const fn integrated_auth_available() -> bool {
    cfg!(any(windows, feature = "integrated-auth-gssapi"))
}

/// Opens the TCP stream and performs the TDS login.
///
/// A routing redirect (Azure SQL gateways) is followed once.
async fn connect(mut config: Config) -> Result<SqlClient> {
    let tcp = open_named(&config).await?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        Err(tiberius::error::Error::Routing { host, port }) => {
            info!(%host, port, "Server redirected the connection");
            config.host(&host);
            config.port(port);

            let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
                ProbeError::connection_failed("Could not reach the redirected server", e.into())
            })?;
            set_nodelay(&tcp)?;

            Client::connect(config, tcp.compat_write())
                .await
                .map_err(|e| ProbeError::connection_failed("Login failed after redirect", e))
        }
        Err(e) => Err(ProbeError::connection_failed("Login failed", e)),
    }
}

/// Resolves the address, asking the SQL Browser for named instances.
async fn open_named(config: &Config) -> Result<TcpStream> {
    debug!(addr = %config.get_addr(), "Connecting TCP stream");
    let tcp = TcpStream::connect_named(config)
        .await
        .map_err(|e| ProbeError::connection_failed("Could not reach the server", e))?;
    set_nodelay(&tcp)?;
    Ok(tcp)
}

fn set_nodelay(tcp: &TcpStream) -> Result<()> {
    tcp.set_nodelay(true)
        .map_err(|e| ProbeError::connection_failed("Setting TCP_NODELAY failed", e.into()))
}

/// Reads the login identity with [`IDENTITY_QUERY`].
async fn current_identity(client: &mut SqlClient) -> Result<String> {
    let row = client
        .simple_query(IDENTITY_QUERY)
        .await
        .map_err(|e| ProbeError::query_failed(IDENTITY_QUERY, e))?
        .into_row()
        .await
        .map_err(|e| ProbeError::query_failed(IDENTITY_QUERY, e))?;

    let identity = match row {
        Some(row) => row
            .try_get::<&str, _>(0)
            .map_err(|e| ProbeError::query_failed(IDENTITY_QUERY, e))?
            .map(str::to_owned),
        None => None,
    };

    Ok(identity.unwrap_or_else(|| UNKNOWN_IDENTITY.to_string()))
}
