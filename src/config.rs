//! # Configuration
//!
//! JSON configuration file. Every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "external_base_url": "https://annorepo.example.org",
//!   "page_size": 100,
//!   "range_selector_type": "urn:republic:TextAnchorSelector",
//!   "pretty_print": true,
//!   "search": { "idle_timeout_secs": 3600, "capacity": 1000 },
//!   "http": { "host": "0.0.0.0", "port": 8080 },
//!   "seed_dir": "./data"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;
use crate::search::SessionCacheConfig;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base of every URL handed out to clients
    #[serde(default = "default_external_base_url")]
    pub external_base_url: String,

    /// Result page size
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Selector type matched by the range query functions
    #[serde(default = "default_range_selector_type")]
    pub range_selector_type: String,

    /// Indent JSON responses
    #[serde(default = "default_pretty_print")]
    pub pretty_print: bool,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub http: HttpServerConfig,

    /// Directory of `<container>.json` annotation arrays loaded at startup
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,
}

fn default_external_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_page_size() -> u64 {
    100
}

fn default_range_selector_type() -> String {
    "urn:republic:TextAnchorSelector".to_string()
}

fn default_pretty_print() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            external_base_url: default_external_base_url(),
            page_size: default_page_size(),
            range_selector_type: default_range_selector_type(),
            pretty_print: default_pretty_print(),
            search: SearchConfig::default(),
            http: HttpServerConfig::default(),
            seed_dir: None,
        }
    }
}

/// Search session cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Period of the background sweep of idle sessions
    #[serde(default = "default_eviction_interval_secs")]
    pub eviction_interval_secs: u64,
}

fn default_idle_timeout_secs() -> u64 {
    3600
}

fn default_capacity() -> usize {
    1000
}

fn default_eviction_interval_secs() -> u64 {
    60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            capacity: default_capacity(),
            eviction_interval_secs: default_eviction_interval_secs(),
        }
    }
}

impl SearchConfig {
    pub fn cache_config(&self) -> SessionCacheConfig {
        let secs = i64::try_from(self.idle_timeout_secs)
            .unwrap_or(i64::MAX)
            .min(i64::MAX / 1000);
        SessionCacheConfig {
            idle_timeout: chrono::Duration::seconds(secs),
            capacity: self.capacity,
        }
    }

    pub fn eviction_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.eviction_interval_secs.max(1))
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.external_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "external_base_url must not be empty".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be > 0".to_string()));
        }
        if self.search.capacity == 0 {
            return Err(ConfigError::Invalid(
                "search.capacity must be > 0".to_string(),
            ));
        }
        if self.search.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "search.idle_timeout_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
