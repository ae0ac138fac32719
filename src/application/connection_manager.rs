// Connection manager - Owns the single link to the telemetry source
use crate::application::telemetry_source::{TelemetryConnector, TelemetrySource, TransportError};
use crate::domain::connection::ConnectionState;
use std::sync::Arc;

/// Holds at most one connection per view lifecycle.
///
/// `open` only acts from `Idle`; `close` only acts from `Open`. Both are safe
/// to call repeatedly.
pub struct ConnectionManager {
    connector: Arc<dyn TelemetryConnector>,
    state: ConnectionState,
    source: Option<Box<dyn TelemetrySource>>,
    address: Option<String>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn TelemetryConnector>) -> Self {
        Self {
            connector,
            state: ConnectionState::Idle,
            source: None,
            address: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub async fn open(&mut self, address: &str) -> Result<(), TransportError> {
        if self.state != ConnectionState::Idle {
            tracing::debug!(state = %self.state, "connection already created, ignoring open");
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        self.address = Some(address.to_string());
        tracing::debug!(address, "connecting to telemetry source");

        match self.connector.connect(address).await {
            Ok(source) => {
                self.source = Some(source);
                self.state = ConnectionState::Open;
                tracing::info!(address, "connection established");
                Ok(())
            }
            Err(e) => {
                // No retry: the lifecycle that asked for this link is over.
                self.state = ConnectionState::Closed;
                tracing::error!(address, error = %e, "failed to connect to telemetry source");
                Err(e)
            }
        }
    }

    /// Wait for the next inbound payload.
    ///
    /// Returns `None` when the connection is not open, or once the source
    /// closes or drops the link. The state is `Closed` afterwards in both cases.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        let source = self.source.as_mut()?;
        match source.next_payload().await {
            Ok(Some(payload)) => Some(payload),
            Ok(None) => {
                tracing::info!(address = ?self.address, "telemetry source closed the connection");
                self.release();
                None
            }
            Err(e) => {
                tracing::error!(address = ?self.address, error = %e, "telemetry connection lost");
                self.release();
                None
            }
        }
    }

    pub async fn close(&mut self) {
        if !self.state.is_open() {
            tracing::debug!(state = %self.state, "close ignored, connection not open");
            return;
        }
        if let Some(source) = self.source.as_mut() {
            if let Err(e) = source.close().await {
                tracing::warn!(error = %e, "error while closing telemetry connection");
            }
        }
        self.release();
        tracing::info!(address = ?self.address, "disconnected");
    }

    fn release(&mut self) {
        self.source = None;
        self.state = ConnectionState::Closed;
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if self.source.is_some() {
            tracing::warn!(address = ?self.address, "connection dropped without explicit close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_source::testing::{ScriptEnd, ScriptedConnector};

    const ADDRESS: &str = "ws://localhost:8765";

    #[tokio::test]
    async fn test_open_twice_connects_once() {
        let connector = Arc::new(ScriptedConnector::new(Vec::<Vec<u8>>::new(), ScriptEnd::Hang));
        let probe = connector.probe.clone();
        let mut manager = ConnectionManager::new(connector);

        manager.open(ADDRESS).await.unwrap();
        manager.open(ADDRESS).await.unwrap();

        assert_eq!(probe.connects(), 1);
        assert_eq!(manager.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn test_close_twice_is_harmless() {
        let connector = Arc::new(ScriptedConnector::new(Vec::<Vec<u8>>::new(), ScriptEnd::Hang));
        let probe = connector.probe.clone();
        let mut manager = ConnectionManager::new(connector);

        manager.open(ADDRESS).await.unwrap();
        manager.close().await;
        manager.close().await;

        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(probe.closes(), 1);
    }

    #[tokio::test]
    async fn test_close_before_open_stays_idle() {
        let connector = Arc::new(ScriptedConnector::new(Vec::<Vec<u8>>::new(), ScriptEnd::Close));
        let probe = connector.probe.clone();
        let mut manager = ConnectionManager::new(connector);

        manager.close().await;

        assert_eq!(manager.state(), ConnectionState::Idle);
        assert_eq!(probe.connects(), 0);
        assert!(manager.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_open_after_close_is_noop() {
        let connector = Arc::new(ScriptedConnector::new(Vec::<Vec<u8>>::new(), ScriptEnd::Hang));
        let probe = connector.probe.clone();
        let mut manager = ConnectionManager::new(connector);

        manager.open(ADDRESS).await.unwrap();
        manager.close().await;
        manager.open(ADDRESS).await.unwrap();

        assert_eq!(probe.connects(), 1);
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_source_close_ends_stream() {
        let connector = Arc::new(ScriptedConnector::new(vec!["a", "b"], ScriptEnd::Close));
        let mut manager = ConnectionManager::new(connector);
        manager.open(ADDRESS).await.unwrap();

        assert_eq!(manager.recv().await, Some(b"a".to_vec()));
        assert_eq!(manager.recv().await, Some(b"b".to_vec()));
        assert_eq!(manager.recv().await, None);
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_transport_drop_closes() {
        let connector = Arc::new(ScriptedConnector::new(vec!["a"], ScriptEnd::Drop));
        let mut manager = ConnectionManager::new(connector);
        manager.open(ADDRESS).await.unwrap();

        assert!(manager.recv().await.is_some());
        assert!(manager.recv().await.is_none());
        assert_eq!(manager.state(), ConnectionState::Closed);
        manager.close().await;
        assert_eq!(manager.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_close_while_connecting() {
        let connector = Arc::new(ScriptedConnector::stalling());
        let probe = connector.probe.clone();
        let mut manager = ConnectionManager::new(connector);

        let abandoned =
            tokio::time::timeout(std::time::Duration::from_millis(10), manager.open(ADDRESS)).await;
        assert!(abandoned.is_err());
        assert_eq!(manager.state(), ConnectionState::Connecting);

        manager.close().await;

        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(probe.connects(), 1);
        assert_eq!(probe.closes(), 0);
    }

    #[tokio::test]
    async fn test_failed_connect() {
        let connector = Arc::new(ScriptedConnector::refusing());
        let probe = connector.probe.clone();
        let mut manager = ConnectionManager::new(connector);

        let err = manager.open(ADDRESS).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
        assert_eq!(manager.state(), ConnectionState::Closed);

        manager.open(ADDRESS).await.unwrap();
        assert_eq!(probe.connects(), 1);
    }
}
