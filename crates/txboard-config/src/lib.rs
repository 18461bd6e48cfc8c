//! Configuration management for txboard
//!
//! This module handles loading, validation, and management of
//! txboard configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size when a query does not specify one
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Largest page size a query may request
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

/// Report settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Longest range a single report may cover, in days
    #[serde(default = "default_max_days")]
    pub max_days: u32,
    /// Range used when the start date is omitted
    #[serde(default = "default_report_days")]
    pub default_days: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            max_days: default_max_days(),
            default_days: default_report_days(),
        }
    }
}

fn default_max_days() -> u32 {
    3660
}

fn default_report_days() -> u32 {
    30
}

/// Transaction generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of transactions generated into the store at startup
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,
    /// Background job tick interval in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Start the background job in the running state
    #[serde(default)]
    pub start_running: bool,
    /// Fixed RNG seed (random when absent)
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Seeded transactions are back-dated up to this many days
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed_count: default_seed_count(),
            interval_ms: default_interval_ms(),
            start_running: false,
            rng_seed: None,
            history_days: default_history_days(),
        }
    }
}

fn default_seed_count() -> usize {
    243
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_history_days() -> u32 {
    30
}

/// Values applied to new transactions that omit them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// ISO country code
    #[serde(default = "default_country")]
    pub country: String,
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            currency: default_currency(),
        }
    }
}

fn default_country() -> String {
    "IN".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Report settings
    #[serde(default)]
    pub reports: ReportsConfig,
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Defaults for new transactions
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().into_owned(),
            },
            _ => ConfigError::IoError {
                path: path.to_string_lossy().into_owned(),
                message: e.to_string(),
            },
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_limit".to_string(),
                reason: "Default page size must be greater than 0".to_string(),
            });
        }

        if self.pagination.max_limit < self.pagination.default_limit {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_limit".to_string(),
                reason: "Maximum page size must not be below the default page size".to_string(),
            });
        }

        // The default range spans default_days + 1 calendar days
        if self.reports.max_days == 0 || self.reports.default_days >= self.reports.max_days {
            return Err(ConfigError::InvalidValue {
                field: "reports.default_days".to_string(),
                reason: "Default report range must be shorter than reports.max_days".to_string(),
            });
        }

        if self.generator.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generator.interval_ms".to_string(),
                reason: "Generator interval must be greater than 0".to_string(),
            });
        }

        if self.generator.history_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "generator.history_days".to_string(),
                reason: "History window must be at least one day".to_string(),
            });
        }

        if !is_code(&self.defaults.country, 2) {
            return Err(ConfigError::InvalidValue {
                field: "defaults.country".to_string(),
                reason: "Country must be a two-letter code".to_string(),
            });
        }

        if !is_code(&self.defaults.currency, 3) {
            return Err(ConfigError::InvalidValue {
                field: "defaults.currency".to_string(),
                reason: "Currency must be a three-letter code".to_string(),
            });
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "logging.level".to_string(),
                    reason: format!("Unknown log level: {}", self.logging.level),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn is_code(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_alphabetic())
}
