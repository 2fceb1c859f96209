//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub upstream: UpstreamConfig,
    pub worker: WorkerConfig,
    pub logging: LoggingConfig,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Upstream platform API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL of the platform's JSON API
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
    /// IDs per cursor page on follower/friend listings (default: 5000)
    pub page_size: usize,
    /// IDs per detail-lookup batch (default: 100, the upstream limit)
    pub lookup_batch_size: usize,
}

/// Worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between reconciliation runs (default: 86400 = daily)
    pub interval_seconds: u64,
    /// Run a single reconciliation pass and exit
    #[serde(default)]
    pub run_once: bool,
    /// Events per page on query-layer event listings (default: 10)
    pub page_size: usize,
    /// Maximum IDs materialized per event list (default: 200)
    pub max_event_limit: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (FOLLOWTRACE_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("database.path", "followtrace.db")?
            .set_default("upstream.timeout_seconds", 30)?
            .set_default("upstream.page_size", 5000)?
            .set_default("upstream.lookup_batch_size", 100)?
            .set_default("worker.interval_seconds", 86400)?
            .set_default("worker.run_once", false)?
            .set_default("worker.page_size", 10)?
            .set_default("worker.max_event_limit", 200)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (FOLLOWTRACE_*)
            .add_source(
                Environment::with_prefix("FOLLOWTRACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.upstream.base_url.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "upstream.base_url is required".to_string(),
            ));
        }

        url::Url::parse(&self.upstream.base_url).map_err(|e| {
            crate::error::AppError::Config(format!("upstream.base_url must be a valid URL: {}", e))
        })?;

        if self.upstream.page_size == 0 {
            return Err(crate::error::AppError::Config(
                "upstream.page_size must be greater than 0".to_string(),
            ));
        }

        if self.upstream.lookup_batch_size == 0 {
            return Err(crate::error::AppError::Config(
                "upstream.lookup_batch_size must be greater than 0".to_string(),
            ));
        }

        if self.worker.page_size == 0 {
            return Err(crate::error::AppError::Config(
                "worker.page_size must be greater than 0".to_string(),
            ));
        }

        if self.worker.max_event_limit == 0 {
            return Err(crate::error::AppError::Config(
                "worker.max_event_limit must be greater than 0".to_string(),
            ));
        }

        if self.worker.interval_seconds == 0 && !self.worker.run_once {
            return Err(crate::error::AppError::Config(
                "worker.interval_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
