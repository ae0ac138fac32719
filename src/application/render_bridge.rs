// Render bridge - The single channel from the pipeline to the renderer
use crate::domain::window::WindowSnapshot;

/// Downstream consumer of window snapshots.
///
/// Each call replaces whatever the renderer showed before. Implementations
/// must not block: they run inside the message loop.
pub trait Renderer: Send {
    fn render(&mut self, snapshot: &WindowSnapshot);
}

/// Hands every snapshot to exactly one [`Renderer`], in publication order.
pub struct RenderBridge {
    renderer: Box<dyn Renderer>,
    last_sequence: u64,
}

impl RenderBridge {
    pub fn new(renderer: Box<dyn Renderer>) -> Self {
        Self {
            renderer,
            last_sequence: 0,
        }
    }

    pub fn publish(&mut self, snapshot: &WindowSnapshot) {
        debug_assert!(
            snapshot.sequence > self.last_sequence,
            "snapshot {} published after {}",
            snapshot.sequence,
            self.last_sequence
        );
        self.renderer.render(snapshot);
        self.last_sequence = snapshot.sequence;
        tracing::trace!(
            sequence = snapshot.sequence,
            points = snapshot.len(),
            "published window snapshot"
        );
    }
}
