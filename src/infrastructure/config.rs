use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub view: ViewDefaults,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Initial control values for a new session.
#[derive(Debug, Deserialize, Clone)]
pub struct ViewDefaults {
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "default_granularity")]
    pub granularity: String,
    #[serde(default = "default_aggregation")]
    pub aggregation: String,
    #[serde(default = "default_compare")]
    pub compare: String,
}

impl Default for ViewDefaults {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            granularity: default_granularity(),
            aggregation: default_aggregation(),
            compare: default_compare(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_refresh_secs")]
    pub interval_secs: u64,
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputSettings {
    #[serde(default = "default_chart_path")]
    pub chart_path: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            chart_path: default_chart_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_preset() -> String {
    "7d".to_string()
}

fn default_granularity() -> String {
    "hour".to_string()
}

fn default_aggregation() -> String {
    "max".to_string()
}

fn default_compare() -> String {
    "none".to_string()
}

fn default_refresh_secs() -> u64 {
    120
}

fn default_chart_path() -> PathBuf {
    PathBuf::from("chart.json")
}

/// Load `config/dashboard.*` (optional) with `DASHBOARD__SECTION__KEY`
/// environment overrides on top.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

impl DashboardConfig {
    /// Reject values that would stall the refresh loop or every request.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh.interval_secs == 0 {
            anyhow::bail!("refresh.interval_secs must be greater than zero");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
