// Application state for HTTP handlers
use crate::domain::window::WindowSnapshot;
use crate::infrastructure::config::ChartSettings;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    pub chart: ChartSettings,
    pub capacity: usize,
    pub window: watch::Receiver<WindowSnapshot>,
}
