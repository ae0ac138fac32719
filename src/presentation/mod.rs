// Presentation layer - HTTP surface for the chart renderer
pub mod app_state;
pub mod handlers;
