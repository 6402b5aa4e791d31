//! # HTTP API
//!
//! Builds the axum router for the gateway. All endpoints share application
//! state through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path             | Description                                  |
//! |--------|------------------|----------------------------------------------|
//! | GET    | `/health`        | Liveness probe                               |
//! | POST   | `/api/validate`  | Validation report for a wire message         |
//! | POST   | `/api/send`      | Relay a wire message to the downstream URL   |
//! | POST   | `/mock-service`  | Stand-in downstream that acknowledges input  |
//! | GET    | `/metrics`       | Prometheus exposition                        |
//!
//! Failures are JSON `{"error": "..."}` with status 400 for unparseable or
//! incomplete messages, 422 for validation failures and 502 when the
//! downstream call fails.

use axum::{
    extract::{FromRef, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use txmsg_protocol::{FieldViolation, MessageEnvelope, MessageError};

use crate::config::GatewayConfig;
use crate::metrics::{metrics_handler, SharedMetrics};
use crate::transport::{MessageClient, Transport, TransportError};

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: everything behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub client: MessageClient<dyn Transport>,
    pub metrics: SharedMetrics,
}

impl AppState {
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        metrics: SharedMetrics,
    ) -> Self {
        Self {
            config: Arc::new(config),
            client: MessageClient::new(transport),
            metrics,
        }
    }
}

impl FromRef<AppState> for SharedMetrics {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.metrics)
    }
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/validate", post(validate_handler))
        .route("/api/send", post(send_handler))
        .route("/mock-service", post(mock_service_handler))
        .route("/metrics", get(metrics_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Body of a successful `/api/validate` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// Required fields present, accounting date well formed.
    pub valid: bool,
    /// Length ceilings and patterns respected.
    pub format_valid: bool,
    pub summary: String,
    /// Semantic violations first, then format violations.
    pub violations: Vec<FieldViolation>,
}

/// Error body returned on failure.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body is empty")]
    EmptyBody,
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::EmptyBody => StatusCode::BAD_REQUEST,
            ApiError::Message(MessageError::ParseFailed(_) | MessageError::MissingComponent(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Message(
                MessageError::ValidationFailed { .. } | MessageError::FormatValidationFailed { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let violations = match &self {
            ApiError::Message(err) => err.violations().to_vec(),
            _ => Vec::new(),
        };
        let body = ErrorResponse {
            error: self.to_string(),
            violations,
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /health`: Returns 200 if the gateway is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Strictly parses a request body into an envelope.
fn parse_body(body: &str) -> Result<MessageEnvelope, ApiError> {
    MessageEnvelope::from_wire_format_strict(body)?.ok_or(ApiError::EmptyBody)
}

/// `POST /api/validate`: Reports both predicates and every violation.
async fn validate_handler(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<ValidateResponse>, ApiError> {
    let envelope = parse_body(&body)?;
    state.metrics.messages_validated_total.inc();

    let mut violations = envelope.violations();
    let valid = violations.is_empty();
    let format_violations = envelope.format_violations();
    let format_valid = format_violations.is_empty();
    violations.extend(format_violations);

    tracing::debug!(summary = %envelope, valid, format_valid, "validated message");
    Ok(Json(ValidateResponse {
        valid,
        format_valid,
        summary: envelope.summary(),
        violations,
    }))
}

/// `POST /api/send`: Forwards the compact wire text downstream and returns
/// the downstream response body.
async fn send_handler(State(state): State<AppState>, body: String) -> Result<String, ApiError> {
    let envelope = parse_body(&body)?;

    if state.config.require_valid {
        state.metrics.messages_validated_total.inc();
        if let Err(err) = envelope.ensure_valid() {
            state.metrics.validation_rejections_total.inc();
            tracing::warn!(summary = %envelope, error = %err, "refusing to relay invalid message");
            return Err(err.into());
        }
    }

    let destination = state.config.downstream_url.as_str();
    let started = Instant::now();
    let result = state.client.send(destination, &envelope).await;
    state
        .metrics
        .relay_latency_seconds
        .observe(started.elapsed().as_secs_f64());

    match result {
        Ok(reply) => {
            state.metrics.messages_relayed_total.inc();
            tracing::info!(summary = %envelope, destination, "message relayed");
            Ok(reply)
        }
        Err(err) => {
            state.metrics.transport_failures_total.inc();
            tracing::error!(summary = %envelope, destination, error = %err, "relay failed");
            Err(err.into())
        }
    }
}

/// `POST /mock-service`: Logs the request and acknowledges it.
async fn mock_service_handler(body: String) -> impl IntoResponse {
    tracing::info!(bytes = body.len(), body = %body, "mock service received request");
    Json(serde_json::json!({
        "status": "success",
        "message": "Request received successfully by mock service",
    }))
}
