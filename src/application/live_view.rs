// Live view - One connection lifecycle feeding one renderer
use crate::application::connection_manager::ConnectionManager;
use crate::application::ingest_pipeline::{IngestPipeline, PipelineStats};
use crate::application::render_bridge::{RenderBridge, Renderer};
use crate::application::sample_decoder::SampleDecoder;
use crate::application::telemetry_source::TelemetryConnector;
use crate::domain::telemetry::Point;
use crate::domain::window::SlidingWindow;
use std::future::Future;
use std::sync::Arc;

/// How a live view lifecycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewExit {
    /// Shutdown was requested by the owner.
    Teardown,
    /// The source closed or dropped the connection.
    SourceClosed,
    /// The connection could not be established.
    ConnectFailed,
}

#[derive(Debug, Clone, Copy)]
pub struct ViewOutcome {
    pub exit: ViewExit,
    pub stats: PipelineStats,
}

/// Lifecycle controller: owns the connection and the pipeline for one view.
///
/// `run` consumes the view, so a window can only be reset by building a new one.
pub struct LiveView {
    address: String,
    connection: ConnectionManager,
    pipeline: IngestPipeline,
}

impl LiveView {
    pub fn new(
        connector: Arc<dyn TelemetryConnector>,
        address: impl Into<String>,
        value_field: &str,
        capacity: usize,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let pipeline = IngestPipeline::new(
            SampleDecoder::new(value_field),
            SlidingWindow::new(capacity),
            RenderBridge::new(renderer),
        );
        Self {
            address: address.into(),
            connection: ConnectionManager::new(connector),
            pipeline,
        }
    }

    /// Connect, then handle messages until `shutdown` resolves or the source goes away.
    ///
    /// Each message is decoded, appended and published without yielding, so a
    /// shutdown is only observed between messages.
    pub async fn run<F>(mut self, shutdown: F) -> ViewOutcome
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        let exit = tokio::select! {
            biased;
            _ = &mut shutdown => Some(ViewExit::Teardown),
            opened = self.connection.open(&self.address) => match opened {
                Ok(()) => None,
                Err(_) => Some(ViewExit::ConnectFailed),
            },
        };

        let exit = match exit {
            Some(exit) => exit,
            None => self.pump(&mut shutdown).await,
        };

        self.connection.close().await;

        let stats = self.pipeline.stats();
        let last_sample_at = self.pipeline.snapshot().latest().and_then(Point::datetime);
        tracing::info!(
            exit = ?exit,
            last_sample_at = ?last_sample_at,
            received = stats.received,
            published = stats.published,
            discarded = stats.discarded,
            out_of_order = stats.out_of_order,
            duplicates = stats.duplicates,
            "live view finished"
        );
        ViewOutcome { exit, stats }
    }

    async fn pump<F>(&mut self, shutdown: &mut std::pin::Pin<&mut F>) -> ViewExit
    where
        F: Future<Output = ()>,
    {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => return ViewExit::Teardown,
                payload = self.connection.recv() => match payload {
                    Some(payload) => {
                        // Decode errors are logged by the pipeline and never stop the loop.
                        let _ = self.pipeline.handle_payload(&payload);
                    }
                    None => return ViewExit::SourceClosed,
                },
            }
        }
    }
}
