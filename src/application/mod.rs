// Application layer - Ingest pipeline and connection lifecycle
pub mod connection_manager;
pub mod ingest_pipeline;
pub mod live_view;
pub mod render_bridge;
pub mod sample_decoder;
pub mod telemetry_source;
