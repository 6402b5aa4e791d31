//! Outbound delivery of wire messages.
//!
//! The core library hands over text and gets text back; everything about
//! how it travels lives behind the [`Transport`] trait. [`HttpTransport`] is
//! the production implementation. Tests substitute a recording transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::{debug, warn};

use txmsg_protocol::{MessageEnvelope, MessageError};

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("request to {destination} failed: {source}")]
    Request {
        destination: String,
        #[source]
        source: reqwest::Error,
    },

    /// The downstream service answered with a non-success status.
    #[error("{destination} responded with HTTP {status}: {body}")]
    Status {
        destination: String,
        status: u16,
        body: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Delivers a rendered message and returns the response text.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, destination: &str, body: String) -> Result<String, TransportError>;
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// POSTs the message as `application/json`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, destination: &str, body: String) -> Result<String, TransportError> {
        debug!(destination, bytes = body.len(), "posting message");
        let request_failed = |source| TransportError::Request {
            destination: destination.to_string(),
            source,
        };

        let response = self
            .client
            .post(destination)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let text = response.text().await.map_err(request_failed)?;

        if !status.is_success() {
            warn!(destination, status = status.as_u16(), "downstream rejected message");
            return Err(TransportError::Status {
                destination: destination.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Either the message was refused locally or the transport failed.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Renders envelopes and pushes them through a [`Transport`].
pub struct MessageClient<T: ?Sized> {
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for MessageClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport + ?Sized> MessageClient<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Sends the compact wire text without checking it.
    pub async fn send(
        &self,
        destination: &str,
        envelope: &MessageEnvelope,
    ) -> Result<String, TransportError> {
        debug!(destination, summary = %envelope, "sending message");
        self.transport
            .send(destination, envelope.to_wire_format())
            .await
    }

    /// Runs both validation rule sets, then sends.
    pub async fn send_validated(
        &self,
        destination: &str,
        envelope: &MessageEnvelope,
    ) -> Result<String, ClientError> {
        envelope.ensure_valid()?;
        Ok(self.send(destination, envelope).await?)
    }
}
