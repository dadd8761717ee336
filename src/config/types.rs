use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of products requested per listing page (`pc` query parameter)
pub const DEFAULT_PAGE_SIZE: u32 = 60;

/// Main configuration structure for Catalog-Walker
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Site base URL, prefixed to every relative link found on the site
    pub url: String,

    /// Allow-list of top-level category display names to crawl
    #[serde(default)]
    pub categories: Vec<String>,

    /// `[min, max]` seconds of random delay before each request
    #[serde(default = "default_delay_range")]
    pub delay_range_s: [f64; 2],

    /// Outer reconnect policy
    pub restart: RestartConfig,

    /// Inner retry bound, per outer attempt
    pub max_retries: u32,

    /// Regex matched against the `class` attribute of side-menu links
    #[serde(rename = "PATTERN_SUB_MENU")]
    pub pattern_sub_menu: String,

    /// Products requested per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Outer retry ("reconnect") configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RestartConfig {
    /// Maximum number of outer reconnect cycles
    pub restart_count: u32,

    /// Seconds to wait between outer cycles
    pub interval_m: f64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the export file; created when absent
    pub output_directory: String,

    /// Export file name inside `output_directory`
    pub filename_output: String,
}

/// Log file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub logs_dir: String,
    pub logs_filename: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_dir: "logs".to_string(),
            logs_filename: "catalog-walker.log".to_string(),
        }
    }
}

impl Config {
    /// Full path of the export file
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(&self.output.output_directory).join(&self.output.filename_output)
    }

    /// Full path of the log file
    pub fn log_path(&self) -> PathBuf {
        PathBuf::from(&self.logging.logs_dir).join(&self.logging.logs_filename)
    }

    /// Sleep between outer reconnect cycles
    pub fn restart_interval(&self) -> Result<Duration, ConfigError> {
        seconds("restart.interval_m", self.restart.interval_m)
    }

    /// `(min, max)` bounds of the politeness delay
    pub fn delay_bounds(&self) -> Result<(Duration, Duration), ConfigError> {
        let [min, max] = self.delay_range_s;
        Ok((
            seconds("delay_range_s", min)?,
            seconds("delay_range_s", max)?,
        ))
    }

    /// Whether a top-level category is on the crawl allow-list
    pub fn allows_category(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }
}

/// Converts a seconds setting, rejecting negative, non-finite or oversized values
pub(crate) fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Validation(format!(
            "{} must hold a representable number of seconds, got {}",
            field, value
        ))
    })
}

fn default_delay_range() -> [f64; 2] {
    [0.0, 0.0]
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_user_agent() -> String {
    format!("catalog-walker/{}", env!("CARGO_PKG_VERSION"))
}
