// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Transaction Message Gateway
//!
//! Entry point for the `txmsg-gateway` binary. Parses CLI arguments,
//! initializes logging and metrics, and serves the HTTP API.
//!
//! The binary supports five subcommands:
//!
//! - `serve`     start the HTTP gateway
//! - `sample`    print a message built from a preset
//! - `validate`  check a message file offline
//! - `send`      post a message file to a downstream service
//! - `version`   print build version information

mod api;
mod cli;
mod config;
mod logging;
mod metrics;
mod transport;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;

use txmsg_protocol::MessageEnvelope;

use cli::{Commands, GatewayCli};
use config::GatewayConfig;
use logging::LogFormat;
use metrics::GatewayMetrics;
use transport::{HttpTransport, MessageClient, DEFAULT_TIMEOUT};

/// Filter for the offline subcommands, which print their result to stdout.
const QUIET_FILTER: &str = "txmsg_gateway=warn,txmsg_protocol=warn";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GatewayCli::parse();

    match cli.command {
        Commands::Serve(args) => serve(GatewayConfig::from(args)).await,
        Commands::Sample(args) => sample(args),
        Commands::Validate(args) => validate(args),
        Commands::Send(args) => send(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the HTTP gateway and runs until a shutdown signal arrives.
async fn serve(config: GatewayConfig) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, config.log_format);

    tracing::info!(
        bind = %config.bind,
        downstream = %config.downstream_url,
        require_valid = config.require_valid,
        timeout_secs = config.timeout.as_secs(),
        "starting txmsg-gateway"
    );

    let transport = HttpTransport::new(config.timeout).context("failed to build HTTP transport")?;
    let metrics = Arc::new(GatewayMetrics::new().context("failed to register metrics")?);

    let bind = config.bind;
    let state = api::AppState::new(config, Arc::new(transport), metrics);
    let router = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind listener on {}", bind))?;
    tracing::info!("gateway listening on {}", bind);

    tokio::select! {
        res = axum::serve(listener, router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("txmsg-gateway stopped");
    Ok(())
}

/// Builds a preset, applies `--set` overrides, and prints the wire text.
fn sample(args: cli::SampleArgs) -> Result<()> {
    logging::init_logging(QUIET_FILTER, LogFormat::Pretty);

    let envelope = build_sample(&args);
    if args.pretty {
        println!("{}", envelope.to_pretty_wire_format());
    } else {
        println!("{}", envelope.to_wire_format());
    }
    Ok(())
}

fn build_sample(args: &cli::SampleArgs) -> MessageEnvelope {
    args.overrides
        .iter()
        .fold(args.scenario.assembler(Utc::now()), |assembler, (key, value)| {
            assembler.apply_override(key, value.as_str())
        })
        .build()
}

/// Prints both predicates and every violation; fails if either predicate is false.
fn validate(args: cli::ValidateArgs) -> Result<()> {
    logging::init_logging(QUIET_FILTER, LogFormat::Pretty);

    let envelope = read_envelope(&args.file)?;
    let (report, ok) = validation_report(&envelope);
    print!("{report}");

    if !ok {
        bail!("{} failed validation", args.file.display());
    }
    Ok(())
}

/// Posts a message file to `--url` and prints the response body.
async fn send(args: cli::SendArgs) -> Result<()> {
    logging::init_logging(QUIET_FILTER, LogFormat::Pretty);

    let envelope = read_envelope(&args.file)?;
    let transport = HttpTransport::new(DEFAULT_TIMEOUT).context("failed to build HTTP transport")?;
    let client = MessageClient::new(Arc::new(transport));

    let reply = if args.validate {
        client.send_validated(&args.url, &envelope).await?
    } else {
        client.send(&args.url, &envelope).await?
    };
    println!("{reply}");
    Ok(())
}

/// Reads and strictly parses a message file.
fn read_envelope(path: &Path) -> Result<MessageEnvelope> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let envelope = MessageEnvelope::from_wire_format_strict(&text)
        .with_context(|| format!("{} is not a valid message", path.display()))?;
    match envelope {
        Some(envelope) => Ok(envelope),
        None => bail!("{} is empty", path.display()),
    }
}

/// Renders a human-readable report. The flag is true when both rule sets pass.
fn validation_report(envelope: &MessageEnvelope) -> (String, bool) {
    let violations = envelope.violations();
    let format_violations = envelope.format_violations();
    let valid = violations.is_empty();
    let format_valid = format_violations.is_empty();

    let mut report = format!(
        "{}\n  valid        : {}\n  format valid : {}\n",
        envelope.summary(),
        valid,
        format_valid,
    );
    for violation in violations.iter().chain(&format_violations) {
        report.push_str(&format!("  - {violation}\n"));
    }
    (report, valid && format_valid)
}

/// Prints version information to stdout.
fn print_version() {
    println!("txmsg-gateway {}", env!("CARGO_PKG_VERSION"));
    println!("rustc         {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use txmsg_protocol::{MessageError, Scenario};

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn sample_applies_overrides_as_text() {
        let args = GatewayCli::try_parse_from([
            "txmsg-gateway",
            "sample",
            "-s",
            "transfer",
            "--set",
            "header.txCode=Q001",
            "--set",
            "entity.amount=2500.50",
            "--set",
            "comn.curQryReqNum=5",
        ])
        .unwrap();
        let Commands::Sample(args) = args.command else {
            panic!("expected sample");
        };

        let envelope = build_sample(&args);
        assert_eq!(envelope.header().tx_code.as_deref(), Some("Q001"));
        assert_eq!(
            envelope.entity().field("amount"),
            Some(&serde_json::json!("2500.50"))
        );
        assert_eq!(
            envelope.field_groups().field(1, "curQryReqNum"),
            Some(&serde_json::json!("5"))
        );
    }

    #[test]
    fn read_envelope_parses_file() {
        let envelope = Scenario::Query.build(Utc::now());
        let file = write_temp(&envelope.to_pretty_wire_format());
        assert_eq!(read_envelope(file.path()).unwrap(), envelope);
    }

    #[test]
    fn read_envelope_rejects_empty_and_incomplete_files() {
        let empty = write_temp("   \n");
        let err = read_envelope(empty.path()).unwrap_err();
        assert!(err.to_string().ends_with("is empty"));

        let incomplete = write_temp(r#"{"txHeader":{},"txBody":{}}"#);
        let err = read_envelope(incomplete.path()).unwrap_err();
        let source = err.downcast_ref::<MessageError>().unwrap();
        assert!(matches!(source, MessageError::MissingComponent("txEntity")));
    }

    #[test]
    fn read_envelope_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_envelope(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().starts_with("failed to read"));
    }

    #[test]
    fn report_for_valid_message() {
        let (report, ok) = validation_report(&Scenario::Standard.build(Utc::now()));
        assert!(ok);
        assert!(report.contains("valid        : true"));
        assert!(!report.contains("  - "));
    }

    #[test]
    fn report_lists_violations() {
        let (report, ok) = validation_report(&Scenario::InvalidFormat.build(Utc::now()));
        assert!(!ok);
        assert!(report.contains("format valid : false"));
        assert_eq!(report.matches("  - ").count(), 10);
        assert!(report.contains("missing required field: globalBusiTrackNo"));
    }
}
