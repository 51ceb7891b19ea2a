use serde::Deserialize;
use std::time::Duration;

/// Fixed Accept header sent with every request, mirroring a browser
pub const ACCEPT_HEADER: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

const DEFAULT_BASE_URL: &str = "https://www.fortiguard.com/appcontrol";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";

/// Main configuration structure for Appctl-Harvest
///
/// A single value is constructed at the program boundary and passed by
/// reference through every call; there is no process-wide default.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Catalog location configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Root URL of the paginated signature catalog
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,
}

/// HTTP behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Base delay between retries (seconds)
    #[serde(rename = "retry-delay", default = "default_retry_delay")]
    pub retry_delay: f64,

    /// Throttling sleep before every request, retry or not (seconds)
    #[serde(rename = "warmup-delay", default = "default_warmup_delay")]
    pub warmup_delay: f64,

    /// Maximum fetch attempts per logical page
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Worker pool size for the concurrent scraping rounds
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path the exported record set is written to
    #[serde(default = "default_output_path")]
    pub path: String,

    /// Whether to report per-task progress while scraping
    #[serde(rename = "show-progress", default = "default_show_progress")]
    pub show_progress: bool,
}

impl HttpConfig {
    /// Per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Base retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f64(self.retry_delay)
    }

    /// Pre-request warm-up sleep as a Duration
    pub fn warmup_delay(&self) -> Duration {
        Duration::from_secs_f64(self.warmup_delay)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_retry_delay() -> f64 {
    2.0
}

fn default_warmup_delay() -> f64 {
    1.0
}

fn default_max_retries() -> u32 {
    5
}

fn default_max_workers() -> usize {
    1
}

fn default_output_path() -> String {
    "appid.csv".to_string()
}

fn default_show_progress() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            retry_delay: default_retry_delay(),
            warmup_delay: default_warmup_delay(),
            max_retries: default_max_retries(),
            max_workers: default_max_workers(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            show_progress: default_show_progress(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            http: HttpConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
