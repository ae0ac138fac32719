// Ingest pipeline - decode, append, publish for one payload at a time
use crate::application::render_bridge::RenderBridge;
use crate::application::sample_decoder::{DecodeError, SampleDecoder};
use crate::domain::telemetry::Point;
use crate::domain::window::{SlidingWindow, WindowSnapshot};

const LOGGED_PAYLOAD_CHARS: usize = 120;

/// Counters kept for the lifetime of one pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub received: u64,
    pub published: u64,
    pub discarded: u64,
    pub out_of_order: u64,
    pub duplicates: u64,
}

/// Owns the window and drives each payload through decode -> append -> publish.
///
/// The source is assumed to deliver non-decreasing, unique timestamps. When it
/// doesn't, the point is still appended in arrival order and only counted.
pub struct IngestPipeline {
    decoder: SampleDecoder,
    window: SlidingWindow,
    bridge: RenderBridge,
    stats: PipelineStats,
}

impl IngestPipeline {
    pub fn new(decoder: SampleDecoder, window: SlidingWindow, bridge: RenderBridge) -> Self {
        Self {
            decoder,
            window,
            bridge,
            stats: PipelineStats::default(),
        }
    }

    /// Handle one inbound payload. Nothing is published on error.
    pub fn handle_payload(&mut self, payload: &[u8]) -> Result<WindowSnapshot, DecodeError> {
        self.stats.received += 1;

        let sample = match self.decoder.decode(payload) {
            Ok(sample) => sample,
            Err(e) => {
                self.stats.discarded += 1;
                tracing::warn!(
                    error = %e,
                    payload = %preview(payload),
                    "discarding undecodable message"
                );
                return Err(e);
            }
        };

        let point = sample.to_point();
        self.check_ordering(&point);

        let snapshot = self.window.append(point);
        self.bridge.publish(&snapshot);
        self.stats.published += 1;
        Ok(snapshot)
    }

    fn check_ordering(&mut self, point: &Point) {
        let Some(previous) = self.window.last() else {
            return;
        };
        if point.timestamp_millis < previous.timestamp_millis {
            self.stats.out_of_order += 1;
            tracing::debug!(
                previous = previous.timestamp_millis,
                current = point.timestamp_millis,
                "out-of-order sample kept in arrival order"
            );
        } else if point.timestamp_millis == previous.timestamp_millis {
            self.stats.duplicates += 1;
            tracing::debug!(
                timestamp = point.timestamp_millis,
                "sample repeats previous timestamp"
            );
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.window.snapshot()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}

fn preview(payload: &[u8]) -> String {
    let text = String::from_utf8_lossy(payload);
    if text.chars().count() > LOGGED_PAYLOAD_CHARS {
        let head: String = text.chars().take(LOGGED_PAYLOAD_CHARS).collect();
        format!("{head}…")
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render_bridge::testing::RecordingRenderer;

    fn pipeline(capacity: usize) -> (IngestPipeline, RecordingRenderer) {
        let renderer = RecordingRenderer::default();
        let pipeline = IngestPipeline::new(
            SampleDecoder::new("e0"),
            SlidingWindow::new(capacity),
            RenderBridge::new(Box::new(renderer.clone())),
        );
        (pipeline, renderer)
    }

    fn message(ts: u64, value: f64) -> Vec<u8> {
        format!(r#"{{"ts": {ts}, "e0": {value}}}"#).into_bytes()
    }

    #[test]
    fn test_one_publication_per_valid_message() {
        let (mut pipeline, renderer) = pipeline(10);
        for i in 0..4 {
            pipeline.handle_payload(&message(i * 1000, i as f64)).unwrap();
        }
        assert_eq!(renderer.count(), 4);
        assert_eq!(pipeline.stats().published, 4);
    }

    #[test]
    fn test_bad_payload_is_not_published() {
        let (mut pipeline, renderer) = pipeline(10);
        pipeline.handle_payload(&message(1000, 1.0)).unwrap();

        assert!(pipeline.handle_payload(b"{not json").is_err());
        assert!(pipeline.handle_payload(br#"{"ts": "abc", "e0": 1.0}"#).is_err());
        assert_eq!(renderer.count(), 1);
        assert_eq!(pipeline.snapshot().len(), 1);

        let snapshot = pipeline.handle_payload(&message(2000, 2.0)).unwrap();
        assert_eq!(renderer.count(), 2);
        assert_eq!(snapshot.points[1].value, 2.0);
        assert_eq!(snapshot.points[1].timestamp_millis, 2);

        let stats = pipeline.stats();
        assert_eq!(stats.received, 4);
        assert_eq!(stats.discarded, 2);
        assert_eq!(stats.published, 2);
    }

    #[test]
    fn test_out_of_order_and_duplicates_counted_not_corrected() {
        let (mut pipeline, _renderer) = pipeline(10);
        pipeline.handle_payload(&message(3_000, 1.0)).unwrap();
        pipeline.handle_payload(&message(1_000, 2.0)).unwrap();
        let snapshot = pipeline.handle_payload(&message(1_000, 3.0)).unwrap();

        let stamps: Vec<i64> = snapshot.points.iter().map(|p| p.timestamp_millis).collect();
        assert_eq!(stamps, vec![3, 1, 1]);
        assert_eq!(pipeline.stats().out_of_order, 1);
        assert_eq!(pipeline.stats().duplicates, 1);
    }

    #[test]
    fn test_renderer_sees_latest_sample() {
        let (mut pipeline, renderer) = pipeline(3);
        for i in 0..7u64 {
            pipeline.handle_payload(&message(i * 1000, i as f64)).unwrap();
            let last = renderer.last().unwrap();
            assert_eq!(last.latest().unwrap().value, i as f64);
            assert!(last.len() <= 3);
        }
    }

    #[test]
    fn test_preview_truncates_long_payloads() {
        let long = vec![b'x'; 500];
        let text = preview(&long);
        assert_eq!(text.chars().count(), LOGGED_PAYLOAD_CHARS + 1);
        assert_eq!(preview(b"short"), "short");
    }
}
