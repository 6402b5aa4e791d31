//! # CLI Interface
//!
//! Defines the command-line argument structure for `txmsg-gateway` using
//! `clap` derive. Supports five subcommands: `serve`, `sample`, `validate`,
//! `send`, and `version`.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use txmsg_protocol::Scenario;

use crate::logging::LogFormat;

/// Transaction message gateway.
///
/// Validates transaction messages and relays them to a downstream service.
/// Also builds sample messages and checks message files offline.
#[derive(Parser, Debug)]
#[command(
    name = "txmsg-gateway",
    about = "Transaction message gateway",
    version,
    propagate_version = true
)]
pub struct GatewayCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP gateway.
    Serve(ServeArgs),
    /// Print a sample message built from a preset.
    Sample(SampleArgs),
    /// Check a message file against both validation rule sets.
    Validate(ValidateArgs),
    /// Post a message file to a downstream service.
    Send(SendArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address the HTTP server listens on.
    #[arg(long, env = "TXMSG_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Where `/api/send` forwards messages.
    #[arg(
        long,
        env = "TXMSG_DOWNSTREAM_URL",
        default_value = "http://localhost:8080/mock-service"
    )]
    pub downstream_url: String,

    /// Refuse to relay messages that fail validation.
    #[arg(long, env = "TXMSG_REQUIRE_VALID")]
    pub require_valid: bool,

    /// Downstream request timeout in seconds.
    #[arg(long, env = "TXMSG_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "TXMSG_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Arguments for the `sample` subcommand.
#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Preset name: standard, query, transfer, sparse, min-boundary,
    /// max-boundary, invalid-format.
    #[arg(long, short = 's', default_value = "standard")]
    pub scenario: Scenario,

    /// Override a field, e.g. `header.txCode=Q001` or `comn.accountingDate=20231201`.
    /// Repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub overrides: Vec<(String, String)>,

    /// Indent the output.
    #[arg(long)]
    pub pretty: bool,
}

/// Arguments for the `validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to a JSON message file.
    pub file: PathBuf,
}

/// Arguments for the `send` subcommand.
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Destination URL.
    #[arg(long, env = "TXMSG_DOWNSTREAM_URL")]
    pub url: String,

    /// Run both validation rule sets before sending.
    #[arg(long)]
    pub validate: bool,

    /// Path to a JSON message file.
    pub file: PathBuf,
}

/// Splits `key=value` at the first `=`.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        GatewayCli::command().debug_assert();
    }

    #[test]
    fn sample_accepts_repeated_overrides() {
        let cli = GatewayCli::try_parse_from([
            "txmsg-gateway",
            "sample",
            "--scenario",
            "transfer",
            "--set",
            "header.txCode=Q001",
            "--set",
            "memo=a=b",
            "--pretty",
        ])
        .unwrap();

        match cli.command {
            Commands::Sample(args) => {
                assert_eq!(args.scenario, Scenario::Transfer);
                assert_eq!(
                    args.overrides,
                    vec![
                        ("header.txCode".to_string(), "Q001".to_string()),
                        ("memo".to_string(), "a=b".to_string()),
                    ]
                );
                assert!(args.pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        let result = GatewayCli::try_parse_from(["txmsg-gateway", "sample", "-s", "random"]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_override_is_rejected() {
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
        assert_eq!(
            parse_key_value("k=").unwrap(),
            ("k".to_string(), String::new())
        );
    }

    #[test]
    fn serve_defaults() {
        let cli = GatewayCli::try_parse_from(["txmsg-gateway", "serve"]).unwrap();
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.bind.port(), 8080);
                assert_eq!(args.log_format, LogFormat::Pretty);
                assert_eq!(args.timeout_secs, 30);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
