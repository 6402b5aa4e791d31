//! # Prometheus Metrics
//!
//! Operational counters for the gateway, served at `/metrics`.
//!
//! All metrics are registered in a dedicated [`prometheus::Registry`] so they
//! do not collide with any default global registry consumers.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

/// Holds all Prometheus metric handles for the gateway.
///
/// Prometheus handles are reference-counted, so clones share counters.
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    /// Messages checked by `/api/validate` or `/api/send`.
    pub messages_validated_total: IntCounter,
    /// Messages forwarded downstream successfully.
    pub messages_relayed_total: IntCounter,
    /// Messages refused because they failed validation.
    pub validation_rejections_total: IntCounter,
    /// Relay attempts that failed in the transport.
    pub transport_failures_total: IntCounter,
    /// Time spent waiting on the downstream service, in seconds.
    pub relay_latency_seconds: Histogram,
}

impl GatewayMetrics {
    /// Creates and registers all metrics. Call once at startup.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("txmsg".into()), None)?;

        let messages_validated_total = IntCounter::new(
            "messages_validated_total",
            "Total number of messages run through validation",
        )?;
        registry.register(Box::new(messages_validated_total.clone()))?;

        let messages_relayed_total = IntCounter::new(
            "messages_relayed_total",
            "Total number of messages forwarded downstream",
        )?;
        registry.register(Box::new(messages_relayed_total.clone()))?;

        let validation_rejections_total = IntCounter::new(
            "validation_rejections_total",
            "Total number of messages refused for failing validation",
        )?;
        registry.register(Box::new(validation_rejections_total.clone()))?;

        let transport_failures_total = IntCounter::new(
            "transport_failures_total",
            "Total number of relay attempts that failed in transport",
        )?;
        registry.register(Box::new(transport_failures_total.clone()))?;

        let relay_latency_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "relay_latency_seconds",
                "Downstream round-trip latency in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
        )?;
        registry.register(Box::new(relay_latency_seconds.clone()))?;

        Ok(Self {
            registry,
            messages_validated_total,
            messages_relayed_total,
            validation_rejections_total,
            transport_failures_total,
            relay_latency_seconds,
        })
    }

    /// Encodes all registered metrics into the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Shared metrics handle passed to axum handlers.
pub type SharedMetrics = Arc<GatewayMetrics>;

/// Axum handler that renders `/metrics` in Prometheus text format.
pub async fn metrics_handler(
    axum::extract::State(metrics): axum::extract::State<SharedMetrics>,
) -> impl IntoResponse {
    match metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "metrics encoding failed").into_response()
        }
    }
}
