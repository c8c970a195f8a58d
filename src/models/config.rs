//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP fetch behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Search profile: what counts as a matching listing
    #[serde(default)]
    pub search: SearchConfig,

    /// Poll loop and retention settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Notification delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Seen-set database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_retries == 0 {
            return Err(AppError::validation("http.max_retries must be > 0"));
        }
        if self.search.make.trim().is_empty() {
            return Err(AppError::validation("search.make is empty"));
        }
        if self.search.model_tokens.is_empty() {
            return Err(AppError::validation("No model tokens defined"));
        }
        if self.search.year_min > self.search.year_max {
            return Err(AppError::validation("search.year_min exceeds year_max"));
        }
        if self.search.locations.is_empty() {
            return Err(AppError::validation("No target locations defined"));
        }
        if self.watcher.poll_interval_minutes == 0 {
            return Err(AppError::validation(
                "watcher.poll_interval_minutes must be > 0",
            ));
        }
        if !self.watcher.dry_run && self.notifier.webhook_url.trim().is_empty() {
            return Err(AppError::validation(
                "notifier.webhook_url is required unless watcher.dry_run is set",
            ));
        }
        Ok(())
    }
}

/// HTTP client and fetch retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Number of fetch attempts before giving up
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base retry delay in seconds, doubled per attempt
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_secs: u64,

    /// Delay after each successful request in seconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_secs: defaults::retry_delay(),
            request_delay_secs: defaults::request_delay(),
        }
    }
}

/// Search criteria for matching listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Target make token (case-insensitive containment match)
    #[serde(default = "defaults::make")]
    pub make: String,

    /// Model family tokens, at least one must appear in the model text
    #[serde(default = "defaults::model_tokens")]
    pub model_tokens: Vec<String>,

    /// Sibling model names that disqualify a row even when a family
    /// token matches (e.g. "dakota" when watching for "ram")
    #[serde(default = "defaults::model_exclusions")]
    pub model_exclusions: Vec<String>,

    /// Minimum model year, inclusive
    #[serde(default = "defaults::year_min")]
    pub year_min: i32,

    /// Maximum model year, inclusive
    #[serde(default = "defaults::year_max")]
    pub year_max: i32,

    /// Target yard locations (case-insensitive containment match)
    #[serde(default = "defaults::locations")]
    pub locations: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            make: defaults::make(),
            model_tokens: defaults::model_tokens(),
            model_exclusions: defaults::model_exclusions(),
            year_min: defaults::year_min(),
            year_max: defaults::year_max(),
            locations: defaults::locations(),
        }
    }
}

/// Poll loop and seen-set retention settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Minutes between scheduled poll cycles
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_minutes: u64,

    /// Days to keep seen listings before the retention sweep removes them
    #[serde(default = "defaults::retention_days")]
    pub retention_days: i64,

    /// Run the full pipeline but suppress notification delivery
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_minutes: defaults::poll_interval(),
            retention_days: defaults::retention_days(),
            dry_run: false,
        }
    }
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifierConfig {
    /// Webhook endpoint receiving one message per new listing
    #[serde(default)]
    pub webhook_url: String,
}

/// Seen-set database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "defaults::database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: defaults::database_path(),
        }
    }
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; yardwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        5
    }
    pub fn request_delay() -> u64 {
        3
    }

    // Search defaults
    pub fn make() -> String {
        "Dodge".into()
    }
    pub fn model_tokens() -> Vec<String> {
        vec!["ram".into()]
    }
    pub fn model_exclusions() -> Vec<String> {
        vec![
            "dakota".into(),
            "durango".into(),
            "caravan".into(),
            "charger".into(),
            "challenger".into(),
        ]
    }
    pub fn year_min() -> i32 {
        1994
    }
    pub fn year_max() -> i32 {
        2026
    }
    pub fn locations() -> Vec<String> {
        vec!["Calgary".into(), "Edmonton".into()]
    }

    // Watcher defaults
    pub fn poll_interval() -> u64 {
        30
    }
    pub fn retention_days() -> i64 {
        90
    }

    // Database defaults
    pub fn database_path() -> String {
        "listings.db".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_needs_webhook() {
        // Defaults carry no webhook URL, so only dry-run validates cleanly.
        let mut config = Config::default();
        assert!(config.validate().is_err());
        config.watcher.dry_run = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.watcher.dry_run = true;
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_year_range() {
        let mut config = Config::default();
        config.watcher.dry_run = true;
        config.search.year_min = 2020;
        config.search.year_max = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_retries() {
        let mut config = Config::default();
        config.watcher.dry_run = true;
        config.http.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [search]
            year_min = 2000

            [notifier]
            webhook_url = "https://example.com/hook"
            "#,
        )
        .unwrap();

        assert_eq!(config.search.year_min, 2000);
        assert_eq!(config.search.year_max, defaults::year_max());
        assert_eq!(config.http.max_retries, 3);
        assert!(config.validate().is_ok());
    }
}
