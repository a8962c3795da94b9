//! Scraper configuration.
//!
//! Defaults mirror the tuning the target site needs in practice: three fetch
//! attempts, a long settle delay for client-side rendering, and soft readiness
//! timeouts. A JSON file with the same shape can override any subset of fields.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root, used to resolve relative links and seed location discovery.
    pub base_url: String,

    /// Root directory for JSON output and mirrored page sources.
    pub output_dir: PathBuf,

    /// Page fetch / retry tuning.
    pub fetch: FetchConfig,

    /// Lower bound of the randomized pause between consecutive page fetches.
    pub min_request_delay_ms: u64,

    /// Upper bound of the randomized pause between consecutive page fetches.
    pub max_request_delay_ms: u64,

    pub logging: LoggingConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.tollbrothers.com".to_string(),
            output_dir: PathBuf::from("data/tollbrothers"),
            fetch: FetchConfig::default(),
            min_request_delay_ms: 2000,
            max_request_delay_ms: 5000,
            logging: LoggingConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a JSON file. Missing fields fall back to their
    /// defaults via `#[serde(default)]`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Retry and readiness tuning for the page fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum fetch attempts per page, including the first one.
    pub max_retries: u32,

    /// Base retry delay; the wait before attempt N+1 is `retry_delay * N`.
    pub retry_delay_ms: u64,

    /// Fixed settle delay after navigation, before any readiness checks.
    pub settle_delay_ms: u64,

    /// How long to wait for the caller-supplied readiness marker.
    pub marker_timeout_ms: u64,

    /// How long to wait for `<body>` when the requested marker never appears.
    pub body_fallback_timeout_ms: u64,

    /// How long to wait for the document-ready signal.
    pub ready_timeout_ms: u64,

    /// Extra delay after readiness, for late-arriving dynamic content.
    pub post_ready_delay_ms: u64,

    /// When set, the raw rendered markup of every successful fetch is written
    /// here for offline debugging. Write failures never abort a fetch.
    pub debug_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 5000,
            settle_delay_ms: 10_000,
            marker_timeout_ms: 30_000,
            body_fallback_timeout_ms: 10_000,
            ready_timeout_ms: 30_000,
            post_ready_delay_ms: 5000,
            debug_dir: None,
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn marker_timeout(&self) -> Duration {
        Duration::from_millis(self.marker_timeout_ms)
    }

    pub fn body_fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.body_fallback_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn post_ready_delay(&self) -> Duration {
        Duration::from_millis(self.post_ready_delay_ms)
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: String,

    /// Enable console output.
    pub console_output: bool,

    /// Enable file output under `log_dir`.
    pub file_output: bool,

    pub log_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}
