use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub denylist: DenylistConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenylistConfig {
    #[serde(default = "default_denylist_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Broker topic for bulk link-creation messages
    #[serde(default = "default_bulk_topic")]
    pub topic: String,
    /// How long the import pipeline waits for a per-message ack before
    /// reporting the row as still pending
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_denylist_path() -> String {
    "denylist.txt".to_string()
}

fn default_bulk_topic() -> String {
    "shorturl.bulk.create".to_string()
}

fn default_ack_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DenylistConfig {
    fn default() -> Self {
        Self {
            path: default_denylist_path(),
        }
    }
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            topic: default_bulk_topic(),
            ack_timeout_ms: default_ack_timeout_ms(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults for
    /// missing sections. A missing file is not an error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    debug!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Config::default()
                }
            },
            Err(_) => {
                debug!("No config file at {}, using defaults", path.display());
                Config::default()
            }
        };
        config.apply_env_overrides();
        config
    }

    /// Load configuration from `SHORTURL_CONFIG` (default `config.toml`)
    pub fn load() -> Self {
        let path = env::var("SHORTURL_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_file(path)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = env::var("SHORTURL_DENYLIST_PATH") {
            self.denylist.path = path;
        }
        if let Ok(level) = env::var("SHORTURL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(topic) = env::var("SHORTURL_BULK_TOPIC") {
            self.bulk.topic = topic;
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Install the process-wide configuration. Later calls are ignored.
pub fn init_config(config: Config) {
    if CONFIG.set(config).is_err() {
        warn!("Configuration already initialized");
    }
}

/// Process-wide configuration, defaults if `init_config` was never called
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}
