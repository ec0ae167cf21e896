//! Probe failure tests that need no SQL Server.
//!
//! A local listener that accepts connections but never answers stands in for
//! a server that hangs during pre-login, and a closed port stands in for an
//! unreachable host.

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use sqlprobe_core::{ConnectionSettings, ProbeError, Prober};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

/// Binds a listener that accepts sockets and holds them open without
/// ever writing a byte.
async fn silent_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    port
}

/// Returns a port nothing is listening on.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn settings_for(port: u16) -> ConnectionSettings {
    ConnectionSettings::new(format!("tcp:127.0.0.1,{port}"))
        .with_sql_login("probe".to_string(), "not-a-real-password".to_string())
        .with_connect_timeout(Duration::from_secs(90))
        .with_probe_timeout(Duration::from_secs(1))
}

#[tokio::test]
async fn test_probe_times_out_with_probe_timeout() {
    let port = silent_server().await;
    let prober = Prober::new(&settings_for(port)).unwrap();

    let started = Instant::now();
    let result = prober.probe().await;
    let elapsed = started.elapsed();

    match result {
        Err(ProbeError::Timeout { timeout, .. }) => {
            assert_eq!(timeout, Duration::from_secs(1));
        }
        other => panic!("expected a timeout, got {:?}", other),
    }

    // Bounded by the probe timeout, nowhere near the 90 second connect timeout
    assert!(elapsed >= Duration::from_millis(900), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(10), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_probe_reports_refused_connection() {
    let port = closed_port().await;
    let prober = Prober::new(&settings_for(port)).unwrap();

    let started = Instant::now();
    let err = prober.probe().await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(err.is_connection_failure());
    assert!(
        matches!(
            err,
            ProbeError::Connection { .. } | ProbeError::Timeout { .. }
        ),
        "unexpected error: {:?}",
        err
    );
    assert!(!err.driver_message().is_empty());
}

#[tokio::test]
async fn test_probe_errors_never_contain_password() {
    let port = silent_server().await;
    let prober = Prober::new(&settings_for(port)).unwrap();

    let err = prober.probe().await.unwrap_err();
    let report = sqlprobe_core::diagnostic_report(&err);

    assert!(!report.contains("not-a-real-password"));
    assert!(!format!("{:?}", prober).contains("not-a-real-password"));
}
