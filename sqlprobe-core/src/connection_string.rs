//! ADO.NET-style connection string building.
//!
//! Keys are emitted in a fixed order so the same settings always produce the
//! same string:
//!
//! `Application Name`, `Data Source`, `Initial Catalog`, `Connect Timeout`,
//! `Persist Security Info`, `Pooling`, `Encrypt`, `TrustServerCertificate`,
//! `Integrated Security`, then `User ID` and `Password` for SQL Server logins.
//!
//! The same string is handed to `tiberius::Config::from_ado_string` by the
//! prober, so what the report prints is what was used to connect.

use crate::security::REDACTED;
use crate::settings::{AuthMode, ConnectionSettings};
use std::borrow::Cow;
use std::time::Duration;
use zeroize::Zeroizing;

/// How the password value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PasswordRendering {
    Plain,
    Redacted,
}

/// Builds connection strings from [`ConnectionSettings`].
///
/// # Example
/// ```rust
/// use sqlprobe_core::{ConnectionSettings, ConnectionStringBuilder};
///
/// let settings = ConnectionSettings::new("db.example.com".to_string())
///     .with_database("Sales".to_string())
///     .with_sql_login("app".to_string(), "secret".to_string());
///
/// let builder = ConnectionStringBuilder::from_settings(&settings);
/// assert!(builder.build().contains("User ID=app;Password=secret"));
/// assert!(builder.build_redacted().ends_with("Password=****"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConnectionStringBuilder<'a> {
    settings: &'a ConnectionSettings,
    connect_timeout: Duration,
}

impl<'a> ConnectionStringBuilder<'a> {
    /// Creates a builder using the settings' own connect timeout.
    pub const fn from_settings(settings: &'a ConnectionSettings) -> Self {
        Self {
            settings,
            connect_timeout: settings.connect_timeout,
        }
    }

    /// Overrides the `Connect Timeout` value, e.g. with the probe timeout.
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Full connection string including the password.
    pub fn build(&self) -> Zeroizing<String> {
        Zeroizing::new(self.render(PasswordRendering::Plain))
    }

    /// Connection string with the password replaced by `****`.
    ///
    /// This is the only form that may be logged.
    pub fn build_redacted(&self) -> String {
        self.render(PasswordRendering::Redacted)
    }

    /// Connection string as shown to the user.
    ///
    /// The password is kept only when persist-security-info is enabled.
    pub fn build_for_display(&self) -> String {
        if self.settings.persist_security_info {
            self.render(PasswordRendering::Plain)
        } else {
            self.build_redacted()
        }
    }

    fn render(&self, password: PasswordRendering) -> String {
        let settings = self.settings;
        let mut pairs: Vec<(&str, Cow<'_, str>)> = vec![
            ("Application Name", quote_value(&settings.application_name)),
            ("Data Source", quote_value(&settings.server)),
            ("Initial Catalog", quote_value(&settings.database)),
            (
                "Connect Timeout",
                Cow::Owned(self.connect_timeout.as_secs().to_string()),
            ),
            (
                "Persist Security Info",
                ado_bool(settings.persist_security_info),
            ),
            ("Pooling", ado_bool(settings.pooling)),
            ("Encrypt", ado_bool(settings.encrypt)),
            (
                "TrustServerCertificate",
                ado_bool(settings.trust_server_certificate),
            ),
        ];

        match settings.auth_mode {
            AuthMode::Integrated => {
                pairs.push(("Integrated Security", ado_bool(true)));
            }
            AuthMode::SqlServer => {
                pairs.push(("Integrated Security", ado_bool(false)));
                pairs.push(("User ID", quote_value(settings.credentials.username())));
                let value = match password {
                    PasswordRendering::Plain => quote_value(settings.credentials.password()),
                    PasswordRendering::Redacted => Cow::Borrowed(REDACTED),
                };
                pairs.push(("Password", value));
            }
        }

        let capacity = pairs
            .iter()
            .map(|(key, value)| key.len().saturating_add(value.len()).saturating_add(2))
            .sum();
        let mut out = String::with_capacity(capacity);
        for (key, value) in &pairs {
            if !out.is_empty() {
                out.push(';');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
        }
        out
    }
}

fn ado_bool(value: bool) -> Cow<'static, str> {
    Cow::Borrowed(if value { "True" } else { "False" })
}

/// Quotes a value the way ADO.NET does when it would otherwise be ambiguous.
///
/// Values with `;`, `=`, quotes, or surrounding whitespace are wrapped in double
/// quotes (embedded double quotes doubled), or in single quotes when the value
/// holds a double quote but no single quote.
fn quote_value(value: &str) -> Cow<'_, str> {
    let needs_quotes = value.contains([';', '=', '\'', '"'])
        || value.starts_with(char::is_whitespace)
        || value.ends_with(char::is_whitespace);

    if !needs_quotes {
        return Cow::Borrowed(value);
    }

    if value.contains('"') && !value.contains('\'') {
        Cow::Owned(format!("'{value}'"))
    } else {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    }
}
