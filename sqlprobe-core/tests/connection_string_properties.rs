//! Property tests for the connection-string builder.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use sqlprobe_core::{AuthMode, ConnectionSettings, ConnectionStringBuilder, Prober};
use std::time::Duration;

/// Splits a built string back into its keys, in order.
///
/// Only valid for values without quotes or separators, which the strategies
/// below guarantee.
fn keys(connection_string: &str) -> Vec<&str> {
    connection_string
        .split(';')
        .filter_map(|pair| pair.split_once('=').map(|(key, _)| key))
        .collect()
}

fn plain_value() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_.\\\\-]{1,24}"
}

/// Any printable ASCII, including separators, quotes and padding spaces.
fn printable_value() -> impl Strategy<Value = String> {
    "[ -~]{1,24}"
}

/// Printable host names. `,`, `\` and `:` select a port, an instance or a
/// protocol, so they are left out to keep the address well formed.
fn printable_server() -> impl Strategy<Value = String> {
    printable_value()
        .prop_map(|s| s.replace([',', '\\', ':'], "_"))
        .prop_filter("server must not be blank", |s| !s.trim().is_empty())
}

prop_compose! {
    fn arb_settings()(
        server in plain_value(),
        database in plain_value(),
        user in plain_value(),
        password in plain_value(),
        integrated in any::<bool>(),
        connect_secs in 1_u64..600,
        probe_secs in 1_u64..60,
        persist in any::<bool>(),
        pooling in any::<bool>(),
        encrypt in any::<bool>(),
        trust in any::<bool>(),
    ) -> ConnectionSettings {
        let mut settings = ConnectionSettings::new(server)
            .with_database(database)
            .with_sql_login(user, password)
            .with_connect_timeout(Duration::from_secs(connect_secs))
            .with_probe_timeout(Duration::from_secs(probe_secs))
            .with_encrypt(encrypt)
            .with_trust_server_certificate(trust);
        settings.auth_mode = AuthMode::from_integrated_flag(integrated);
        settings.persist_security_info = persist;
        settings.pooling = pooling;
        settings
    }
}

proptest! {
    #[test]
    fn built_string_names_server_database_and_one_auth_clause(settings in arb_settings()) {
        let built = ConnectionStringBuilder::from_settings(&settings).build();

        let server_pair = format!("Data Source={};", settings.server);
        let database_pair = format!("Initial Catalog={};", settings.database);
        prop_assert!(built.contains(&server_pair));
        prop_assert!(built.contains(&database_pair));

        let keys = keys(&built);
        prop_assert_eq!(keys.iter().filter(|k| **k == "Integrated Security").count(), 1);

        match settings.auth_mode {
            AuthMode::Integrated => {
                prop_assert!(built.contains("Integrated Security=True"));
                prop_assert!(!keys.contains(&"User ID"));
                prop_assert!(!keys.contains(&"Password"));
            }
            AuthMode::SqlServer => {
                prop_assert!(built.contains("Integrated Security=False"));
                let user_pair = format!("User ID={};", settings.credentials.username());
                let password_pair = format!("Password={}", settings.credentials.password());
                prop_assert!(built.contains(&user_pair));
                prop_assert!(built.ends_with(&password_pair));
            }
        }
    }

    #[test]
    fn key_order_is_fixed(settings in arb_settings()) {
        let built = ConnectionStringBuilder::from_settings(&settings).build();
        let mut expected = vec![
            "Application Name",
            "Data Source",
            "Initial Catalog",
            "Connect Timeout",
            "Persist Security Info",
            "Pooling",
            "Encrypt",
            "TrustServerCertificate",
            "Integrated Security",
        ];
        if settings.auth_mode == AuthMode::SqlServer {
            expected.extend(["User ID", "Password"]);
        }
        prop_assert_eq!(keys(&built), expected);
    }

    #[test]
    fn redacted_string_never_contains_password(settings in arb_settings()) {
        let builder = ConnectionStringBuilder::from_settings(&settings);
        let redacted = builder.build_redacted();
        let password_pair = format!("Password={}", settings.credentials.password());
        prop_assert!(!redacted.contains(&password_pair));

        let shown = builder.build_for_display();
        if settings.auth_mode == AuthMode::SqlServer && settings.persist_security_info {
            prop_assert!(shown.contains(&password_pair));
        } else {
            prop_assert!(!shown.contains(&password_pair));
        }
    }

    #[test]
    fn timeout_override_changes_only_connect_timeout(settings in arb_settings()) {
        let normal = ConnectionStringBuilder::from_settings(&settings).build();
        let short = ConnectionStringBuilder::from_settings(&settings)
            .with_connect_timeout(settings.probe_timeout)
            .build();

        let normal_timeout = format!("Connect Timeout={};", settings.connect_timeout.as_secs());
        let short_timeout = format!("Connect Timeout={};", settings.probe_timeout.as_secs());
        prop_assert!(normal.contains(&normal_timeout));
        prop_assert!(short.contains(&short_timeout));
        prop_assert_eq!(
            normal.replace(&normal_timeout, ""),
            short.replace(&short_timeout, "")
        );
    }

    #[test]
    fn driver_parses_any_printable_values(
        server in printable_server(),
        database in printable_value(),
        user in printable_value(),
        password in printable_value(),
        application_name in printable_value(),
        integrated in any::<bool>(),
    ) {
        let mut settings = ConnectionSettings::new(server)
            .with_application_name(application_name)
            .with_database(database)
            .with_sql_login(user, password);
        settings.auth_mode = AuthMode::from_integrated_flag(integrated);

        let built = ConnectionStringBuilder::from_settings(&settings).build();
        let parsed = tiberius::Config::from_ado_string(&built);
        prop_assert!(parsed.is_ok(), "driver rejected {:?}: {:?}", built.as_str(), parsed.err());
        prop_assert!(Prober::new(&settings).is_ok());
    }
}
