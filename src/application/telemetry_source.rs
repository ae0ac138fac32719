// Transport traits for the telemetry stream
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {address}: {reason}")]
    Connect { address: String, reason: String },
    #[error("connection dropped: {0}")]
    Receive(String),
    #[error("failed to close connection: {0}")]
    Close(String),
}

/// An open, message-oriented link to the telemetry publisher.
#[async_trait]
pub trait TelemetrySource: Send {
    /// Wait for the next payload.
    ///
    /// Returns `Ok(None)` once the source has closed the link.
    async fn next_payload(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Close the link from our side.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Factory for [`TelemetrySource`] links.
#[async_trait]
pub trait TelemetryConnector: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Box<dyn TelemetrySource>, TransportError>;
}
