//! Runtime configuration for the HTTP gateway.

use std::net::SocketAddr;
use std::time::Duration;

use crate::cli::ServeArgs;
use crate::logging::LogFormat;

/// Resolved settings for `serve`, after CLI flags and environment fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Where `/api/send` forwards messages.
    pub downstream_url: String,
    /// Refuse to relay messages that fail either rule set.
    pub require_valid: bool,
    /// Per-request downstream timeout.
    pub timeout: Duration,
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            downstream_url: "http://localhost:8080/mock-service".to_string(),
            require_valid: false,
            timeout: crate::transport::DEFAULT_TIMEOUT,
            log_format: LogFormat::Pretty,
        }
    }
}

impl From<ServeArgs> for GatewayConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind: args.bind,
            downstream_url: args.downstream_url,
            require_valid: args.require_valid,
            timeout: Duration::from_secs(args.timeout_secs),
            log_format: args.log_format,
        }
    }
}
