// Renderer that hands snapshots to the HTTP layer through a watch channel
use crate::application::render_bridge::Renderer;
use crate::domain::window::WindowSnapshot;
use tokio::sync::watch;

/// Keeps only the newest snapshot; HTTP readers subscribe to it.
pub struct WatchRenderer {
    tx: watch::Sender<WindowSnapshot>,
}

impl WatchRenderer {
    pub fn new(capacity: usize) -> (Self, watch::Receiver<WindowSnapshot>) {
        let (tx, rx) = watch::channel(WindowSnapshot::empty(capacity));
        (Self { tx }, rx)
    }
}

impl Renderer for WatchRenderer {
    fn render(&mut self, snapshot: &WindowSnapshot) {
        // send_replace succeeds even while no HTTP client is subscribed.
        self.tx.send_replace(snapshot.clone());
    }
}
