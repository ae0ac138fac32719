// WebSocket transport for the telemetry stream
use crate::application::telemetry_source::{TelemetryConnector, TelemetrySource, TransportError};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl TelemetryConnector for WebSocketConnector {
    async fn connect(&self, address: &str) -> Result<Box<dyn TelemetrySource>, TransportError> {
        let (stream, _) = tokio_tungstenite::connect_async(address)
            .await
            .map_err(|e| TransportError::Connect {
                address: address.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Box::new(WebSocketSource { stream }))
    }
}

/// One open websocket. Each text or binary frame is one sample payload.
pub struct WebSocketSource {
    stream: WsStream,
}

#[async_trait]
impl TelemetrySource for WebSocketSource {
    async fn next_payload(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        while let Some(frame) = self.stream.next().await {
            let frame = frame.map_err(|e| TransportError::Receive(e.to_string()))?;
            match frame {
                Message::Text(text) => return Ok(Some(text.as_bytes().to_vec())),
                Message::Binary(bytes) => return Ok(Some(bytes.to_vec())),
                Message::Close(frame) => {
                    tracing::debug!(frame = ?frame, "received close frame");
                    return Ok(None);
                }
                // tungstenite queues the pong reply itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream
            .close(None)
            .await
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}
