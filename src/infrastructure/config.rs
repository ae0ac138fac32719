use anyhow::bail;
use serde::Deserialize;

const CONFIG_FILE: &str = "config/viewer";
const ADDRESS_ENV: &str = "EEG_VIEWER_ADDRESS";

#[derive(Debug, Deserialize, Clone)]
pub struct ViewerConfig {
    pub source: SourceSettings,
    pub window: WindowSettings,
    pub chart: ChartSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub address: String,
    pub value_field: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WindowSettings {
    pub capacity: usize,
}

/// Axis and labelling hints forwarded to the renderer as-is.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ChartSettings {
    pub title: String,
    pub unit: String,
    pub y_min: f64,
    pub y_max: f64,
    pub use_utc: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

pub fn load_viewer_config() -> anyhow::Result<ViewerConfig> {
    load_viewer_config_from(CONFIG_FILE, std::env::var(ADDRESS_ENV).ok())
}

/// Built-in defaults, then the optional file at `path`, then the address override.
pub fn load_viewer_config_from(
    path: &str,
    address_override: Option<String>,
) -> anyhow::Result<ViewerConfig> {
    let settings = config::Config::builder()
        .set_default("source.address", "ws://localhost:8765")?
        .set_default("source.value_field", "e0")?
        .set_default("window.capacity", 600_i64)?
        .set_default("chart.title", "Live Data Stream")?
        .set_default("chart.unit", "mV")?
        .set_default("chart.y_min", -110.0)?
        .set_default("chart.y_max", 110.0)?
        .set_default("chart.use_utc", false)?
        .set_default("server.bind", "0.0.0.0:8080")?
        .add_source(config::File::with_name(path).required(false))
        .set_override_option("source.address", address_override)?
        .build()?;

    let config: ViewerConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl ViewerConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let address = &self.source.address;
        // The websocket client is built without TLS support.
        if !address.starts_with("ws://") {
            bail!("source.address must be a ws:// URL, got {:?}", address);
        }
        if self.source.value_field.trim().is_empty() {
            bail!("source.value_field must not be empty");
        }
        if self.window.capacity == 0 {
            bail!("window.capacity must be at least 1");
        }
        if !(self.chart.y_min < self.chart.y_max) {
            bail!(
                "chart.y_min ({}) must be below chart.y_max ({})",
                self.chart.y_min,
                self.chart.y_max
            );
        }
        Ok(())
    }
}
