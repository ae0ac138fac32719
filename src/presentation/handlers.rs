// HTTP request handlers
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{extract::State, http::HeaderMap, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

const PAGE_TITLE: &str = "MinxTuner X2-10 EEG";
const SERIES_NAME: &str = "Live Data";

/// Everything the chart needs besides the points themselves.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDescriptor {
    pub page_title: &'static str,
    pub title: String,
    pub series_name: &'static str,
    pub series_type: &'static str,
    pub animation: bool,
    pub legend_enabled: bool,
    pub x_axis_type: &'static str,
    pub margin_right: u32,
    pub unit: String,
    pub y_min: f64,
    pub y_max: f64,
    pub use_utc: bool,
    pub capacity: usize,
}

impl ChartDescriptor {
    fn from_state(state: &AppState) -> Self {
        Self {
            page_title: PAGE_TITLE,
            title: state.chart.title.clone(),
            series_name: SERIES_NAME,
            series_type: "spline",
            animation: false,
            legend_enabled: false,
            x_axis_type: "datetime",
            margin_right: 10,
            unit: state.chart.unit.clone(),
            y_min: state.chart.y_min,
            y_max: state.chart.y_max,
            use_utc: state.chart.use_utc,
            capacity: state.capacity,
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Chart layout and axis configuration
pub async fn chart_descriptor(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let descriptor = ChartDescriptor::from_state(&state);
    match json_response(&descriptor, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Latest published window snapshot
pub async fn current_window(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Clone out of the watch guard before awaiting.
    let snapshot = state.window.borrow().clone();
    match json_response(&snapshot, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream of window snapshots, one frame per update
pub async fn stream_window(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    stream_from_watch(state.window.clone(), accepts_brotli(&headers))
}
