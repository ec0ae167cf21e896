//! Terminal output: settings summary, spinner, result panels.
//!
//! Rendering is split from printing so the layout can be tested without a
//! terminal. Widths are measured in chars; the spinner goes to stderr.

use crate::cli::DiagnosticsMode;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use sqlprobe_core::{
    ConnectionSettings, ConnectionStringBuilder, ProbeError, ProbeOutcome, diagnostic_report,
};
use std::io::IsTerminal;
use std::time::Duration;

const RULE_WIDTH: usize = 72;

/// Border drawn around a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    Rounded,
    Heavy,
}

impl Border {
    /// Top-left, top-right, bottom-left, bottom-right, horizontal, vertical.
    const fn glyphs(self) -> [char; 6] {
        match self {
            Self::Rounded => ['╭', '╮', '╰', '╯', '─', '│'],
            Self::Heavy => ['┏', '┓', '┗', '┛', '━', '┃'],
        }
    }
}

/// A left-justified heading: `── Title ─────…`
pub fn rule(title: &str) -> String {
    let used = title.chars().count().saturating_add(4);
    let fill = "─".repeat(RULE_WIDTH.saturating_sub(used));
    format!("── {} {}", title.yellow().bold(), fill)
}

/// Draws text inside a box with one column and one line of padding.
pub fn panel(text: &str, border: Border) -> String {
    let [tl, tr, bl, br, h, v] = border.glyphs();
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let inner = width.saturating_add(2);
    let horizontal: String = std::iter::repeat_n(h, inner).collect();
    let blank = format!("{v}{}{v}", " ".repeat(inner));

    let mut lines = Vec::new();
    lines.push(format!("{tl}{horizontal}{tr}"));
    lines.push(blank.clone());
    for line in text.lines() {
        let pad = width.saturating_sub(line.chars().count());
        lines.push(format!("{v} {line}{} {v}", " ".repeat(pad)));
    }
    lines.push(blank);
    lines.push(format!("{bl}{horizontal}{br}"));
    lines.join("\n")
}

/// Summary rows, in display order. The login row only appears for SQL Server
/// authentication and never includes the password.
pub fn settings_rows(settings: &ConnectionSettings) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Server", settings.server.clone()),
        ("Database", settings.database.clone()),
        ("Authentication", settings.auth_mode.to_string()),
    ];
    if !settings.auth_mode.is_integrated() {
        rows.push(("User ID", settings.credentials.username().to_string()));
    }
    rows.extend([
        (
            "Connect timeout",
            format!("{}s", settings.connect_timeout.as_secs()),
        ),
        (
            "Probe timeout",
            format!("{}s", settings.probe_timeout.as_secs()),
        ),
        ("Pooling", yes_no(settings.pooling).to_string()),
        ("Encrypt", yes_no(settings.encrypt).to_string()),
    ]);
    rows
}

/// Renders the settings as a two-column table.
pub fn render_settings_summary(settings: &ConnectionSettings) -> String {
    let rows = settings_rows(settings);
    let key_width = rows
        .iter()
        .map(|(key, _)| key.len())
        .chain(std::iter::once("Setting".len()))
        .max()
        .unwrap_or(0);

    let mut lines = vec![
        rule("Connection settings"),
        format!("{:<key_width$}  {}", "Setting".bold(), "Value".bold()),
    ];
    for (key, value) in rows {
        lines.push(format!("{key:<key_width$}  {value}"));
    }
    lines.join("\n")
}

/// Renders the success section.
pub fn render_success(settings: &ConnectionSettings, outcome: &ProbeOutcome) -> String {
    let mut lines = vec![format!(
        "{} ({} ms)",
        "Connected successfully!".green().bold(),
        outcome.elapsed.as_millis()
    )];
    if let Some(identity) = &outcome.identity {
        lines.push(format!("{} {}", "Connected as:".blue(), identity));
    }
    lines.push(rule("Connection string"));
    let connection_string = ConnectionStringBuilder::from_settings(settings).build_for_display();
    lines.push(panel(&connection_string, Border::Rounded));
    lines.join("\n")
}

/// Renders the failure section with the driver's message.
pub fn render_failure(error: &ProbeError) -> String {
    format!(
        "{}\n{}",
        "Could not connect.".red().bold(),
        panel(&error.driver_message(), Border::Heavy).red()
    )
}

pub fn print_settings_summary(settings: &ConnectionSettings) {
    println!("{}", render_settings_summary(settings));
}

pub fn print_success(settings: &ConnectionSettings, outcome: &ProbeOutcome) {
    println!("{}", render_success(settings, outcome));
}

pub fn print_failure(error: &ProbeError) {
    println!("{}", render_failure(error));
}

/// Starts the "connecting" spinner on stderr.
///
/// indicatif hides the bar by itself when stderr is not a terminal.
pub fn start_spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Checks if both stdin and stdout are connected to a terminal.
fn is_interactive_terminal() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// Prints the diagnostic report according to the mode.
///
/// In `Ask` mode the user is prompted only on an interactive terminal.
pub fn offer_diagnostics(error: &ProbeError, mode: DiagnosticsMode) -> anyhow::Result<()> {
    let show = match mode {
        DiagnosticsMode::Always => true,
        DiagnosticsMode::Never => false,
        DiagnosticsMode::Ask => {
            is_interactive_terminal()
                && Confirm::new()
                    .with_prompt("Show detailed error information?")
                    .default(false)
                    .interact()?
        }
    };

    if show {
        println!("{}", rule("Diagnostics"));
        println!("{}", diagnostic_report(error));
    }
    Ok(())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlprobe_core::AuthMode;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_render_panel_rounded() {
        plain();
        let rendered = panel("abc", Border::Rounded);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines,
            vec!["╭─────╮", "│     │", "│ abc │", "│     │", "╰─────╯"]
        );
    }

    #[test]
    fn test_render_panel_pads_short_lines() {
        let rendered = panel("long line\nx", Border::Heavy);
        assert!(rendered.contains("┃ long line ┃"));
        assert!(rendered.contains("┃ x         ┃"));
        assert!(rendered.starts_with('┏'));
        assert!(rendered.ends_with('┛'));
    }

    #[test]
    fn test_render_rule_has_title() {
        plain();
        let heading = rule("Connection string");
        assert!(heading.starts_with("── Connection string ─"));
        assert_eq!(heading.chars().count(), RULE_WIDTH);
    }

    #[test]
    fn test_settings_rows_sql_login() {
        let settings = ConnectionSettings::new("db01".to_string())
            .with_sql_login("admin".to_string(), "hunter2".to_string());
        let rows = settings_rows(&settings);
        let keys: Vec<&str> = rows.iter().map(|(k, _)| *k).collect();

        assert_eq!(
            keys,
            vec![
                "Server",
                "Database",
                "Authentication",
                "User ID",
                "Connect timeout",
                "Probe timeout",
                "Pooling",
                "Encrypt",
            ]
        );
        assert!(rows.contains(&("User ID", "admin".to_string())));
        assert!(rows.contains(&("Probe timeout", "5s".to_string())));
        assert!(rows.iter().all(|(_, v)| !v.contains("hunter2")));
    }

    #[test]
    fn test_settings_rows_integrated_has_no_user() {
        let settings = ConnectionSettings::default().with_integrated_auth();
        let rows = settings_rows(&settings);
        assert!(rows.iter().all(|(k, _)| *k != "User ID"));
        assert!(rows.contains(&("Authentication", AuthMode::Integrated.to_string())));
    }

    #[test]
    fn test_render_settings_summary() {
        plain();
        let summary = render_settings_summary(&ConnectionSettings::default());
        assert!(summary.contains("Connection settings"));
        assert!(summary.contains("Server           localhost\\MSSQLSERVER"));
        assert!(summary.contains("Connect timeout  90s"));
        assert!(!summary.contains("password"));
    }

    #[test]
    fn test_render_success_with_identity() {
        plain();
        let settings = ConnectionSettings::default().with_integrated_auth();
        let outcome = ProbeOutcome {
            elapsed: Duration::from_millis(42),
            identity: Some("CORP\\alice".to_string()),
        };
        let rendered = render_success(&settings, &outcome);

        assert!(rendered.contains("Connected successfully! (42 ms)"));
        assert!(rendered.contains("Connected as: CORP\\alice"));
        assert!(rendered.contains("Integrated Security=True"));
    }

    #[test]
    fn test_render_success_respects_persist_security_info() {
        plain();
        let mut settings = ConnectionSettings::default()
            .with_sql_login("admin".to_string(), "hunter2".to_string());
        settings.persist_security_info = false;
        let outcome = ProbeOutcome {
            elapsed: Duration::from_millis(5),
            identity: None,
        };
        let rendered = render_success(&settings, &outcome);

        assert!(!rendered.contains("Connected as"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("Password=****"));
    }

    #[test]
    fn test_render_failure_shows_driver_message() {
        plain();
        let error = ProbeError::timed_out("Opening the connection", Duration::from_secs(5));
        let rendered = render_failure(&error);
        assert!(rendered.contains("Could not connect."));
        assert!(rendered.contains("Opening the connection timed out after 5 seconds"));
    }

    #[test]
    fn test_offer_diagnostics_never_is_silent() {
        let error = ProbeError::configuration("unused");
        assert!(offer_diagnostics(&error, DiagnosticsMode::Never).is_ok());
    }

    #[test]
    fn test_spinner_hidden_when_quiet() {
        let spinner = start_spinner("Connecting", true);
        assert!(spinner.is_hidden());
        spinner.finish_and_clear();
    }
}
