//! FollowTrace - daily follower/friend change tracking
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                           │
//! │  - Reconciliation engine (daily diff + persist)             │
//! │  - Event materializer (on-demand detail lookups)            │
//! │  - Dashboard series aggregation                             │
//! └─────────────────────────────────────────────────────────────┘
//!              │                                │
//! ┌────────────────────────────┐  ┌──────────────────────────────┐
//! │         Data Layer         │  │       Upstream Client        │
//! │  - SQLite (sqlx)           │  │  - reqwest JSON API          │
//! │  - daily state / profiles  │  │  - cursor-paginated listings │
//! └────────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `service`: reconciliation, event materialization, series
//! - `data`: database and models, date-keyed daily state
//! - `upstream`: platform client trait and HTTP implementation
//! - `pager`: fixed-list ID pager
//! - `ids`: ID set difference helpers
//! - `config`: configuration management
//! - `metrics`: Prometheus instruments
//! - `error`: error types

pub mod config;
pub mod data;
pub mod error;
pub mod ids;
pub mod metrics;
pub mod pager;
pub mod service;
pub mod upstream;

use std::sync::Arc;

/// Application state shared by the worker and query services
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Database connection pool
    pub db: Arc<data::Database>,

    /// Upstream platform client
    pub upstream: Arc<dyn upstream::UpstreamClient>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to SQLite database (runs migrations)
    /// 2. Build the HTTP upstream client
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let db = data::Database::connect(&config.database.path).await?;
        tracing::info!("Database connected");

        let upstream = upstream::HttpUpstream::new(&config.upstream)?;
        tracing::info!(base_url = %config.upstream.base_url, "Upstream client initialized");

        Ok(Self {
            config: Arc::new(config),
            db: Arc::new(db),
            upstream: Arc::new(upstream),
        })
    }

    /// Build the reconciliation service.
    pub fn reconciler(&self) -> service::Reconciler {
        service::Reconciler::new(self.db.clone(), self.upstream.clone())
    }

    /// Build the event materialization service.
    pub fn event_service(&self) -> service::EventService {
        service::EventService::new(
            self.upstream.clone(),
            &self.config.worker,
            &self.config.upstream,
        )
    }
}
