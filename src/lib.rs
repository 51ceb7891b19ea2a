//! Appctl-Harvest: application-control signature catalog harvester
//!
//! This crate scrapes a paginated application-control signature catalog and
//! produces one record per signature, enriched with detail fields fetched
//! from each signature's own page. Scraping runs in two concurrent rounds
//! (catalog pages, then per-signature details) over a bounded worker pool,
//! with retry and backoff on transient failures.

pub mod config;
pub mod model;
pub mod output;
pub mod progress;
pub mod scrape;

use thiserror::Error;

/// Main error type for Appctl-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON export error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Fatal errors raised while discovering the catalog shape from page 1.
///
/// These are the only errors that abort a whole run. Per-page and per-item
/// failures after discovery are isolated and recovered locally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("failed to fetch the initial catalog page")]
    InitialPageUnreachable,

    #[error("could not find the total count marker on page 1")]
    TotalCountMissing,

    #[error("could not extract a total count from: {0}")]
    TotalCountUnparseable(String),

    #[error("no catalog rows found on page 1")]
    NoCatalogRows,

    #[error("items per page resolved to zero")]
    ZeroPageSize,
}

/// Result type alias for Appctl-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{AppRecord, CatalogShape, DetailFields, PartialRecord};
pub use progress::{LogProgress, NoopProgress, ProgressReporter};
pub use scrape::run_harvest;
