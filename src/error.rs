//! Error types for FollowTrace
//!
//! All errors in the application are converted to `AppError`.
//! The batch worker treats transient upstream failures as countable
//! per-user errors rather than run aborts.

use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Upstream credentials rejected
    #[error("Authentication required")]
    Unauthorized,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Upstream platform error (network, malformed response)
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Upstream rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl AppError {
    /// Whether the error is a transient upstream condition that a later
    /// run can be expected to recover from.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Upstream(_) | AppError::RateLimited | AppError::HttpClient(_)
        )
    }

    /// Metric label for this error variant.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Validation(_) => "validation",
            AppError::Database(_) => "database",
            AppError::HttpClient(_) => "http_client",
            AppError::Upstream(_) => "upstream",
            AppError::RateLimited => "rate_limited",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
