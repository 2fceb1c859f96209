//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Worker Metrics
    pub static ref RECONCILE_RUNS_TOTAL: IntCounter = IntCounter::new(
        "followtrace_reconcile_runs_total",
        "Total number of batch reconciliation runs"
    ).expect("metric can be created");
    pub static ref RECONCILE_USERS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followtrace_reconcile_users_total", "Total number of per-user reconciliations"),
        &["status"]
    ).expect("metric can be created");
    pub static ref TRACKED_USERS_TOTAL: IntGauge = IntGauge::new(
        "followtrace_tracked_users_total",
        "Number of tracked accounts seen by the last run"
    ).expect("metric can be created");

    // Upstream Metrics
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followtrace_upstream_requests_total", "Total number of upstream API requests"),
        &["operation", "status"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("followtrace_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(RECONCILE_RUNS_TOTAL.clone()))
        .expect("RECONCILE_RUNS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(RECONCILE_USERS_TOTAL.clone()))
        .expect("RECONCILE_USERS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(TRACKED_USERS_TOTAL.clone()))
        .expect("TRACKED_USERS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(UPSTREAM_REQUESTS_TOTAL.clone()))
        .expect("UPSTREAM_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
