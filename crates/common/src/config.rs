use std::path::PathBuf;

use crate::error::AppError;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON snapshot of the provider outputs
    pub snapshot_path: PathBuf,

    /// Where to write the rendered panel (stdout when unset)
    pub chart_output_path: Option<PathBuf>,

    /// Snapshot polling interval in milliseconds (default: 1500)
    pub snapshot_poll_interval_ms: u64,

    /// Keep polling the snapshot instead of rendering once
    pub snapshot_watch: bool,

    /// Initial state of the logarithmic toggle
    pub log_scale: bool,

    /// Extra token symbol fragments whose price feed is inverted
    pub inverted_price_symbols: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        Ok(Self {
            snapshot_path: var("SNAPSHOT_PATH")
                .map(PathBuf::from)
                .ok_or_else(|| {
                    AppError::Config("SNAPSHOT_PATH environment variable is required".to_string())
                })?,
            chart_output_path: var("CHART_OUTPUT_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            snapshot_poll_interval_ms: var("SNAPSHOT_POLL_INTERVAL_MS")
                .unwrap_or_else(|| "1500".to_string())
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| {
                    AppError::Config(
                        "SNAPSHOT_POLL_INTERVAL_MS must be a positive number of milliseconds"
                            .to_string(),
                    )
                })?,
            snapshot_watch: var("SNAPSHOT_WATCH")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .map_err(|_| AppError::Config("SNAPSHOT_WATCH must be true or false".to_string()))?,
            log_scale: var("LOG_SCALE")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .map_err(|_| AppError::Config("LOG_SCALE must be true or false".to_string()))?,
            inverted_price_symbols: var("INVERTED_PRICE_SYMBOLS")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}
