//! Service layer
//!
//! Business logic: the reconciliation engine, the event materializer,
//! and dashboard series aggregation.

mod events;
mod reconcile;
mod series;

pub use events::{EventPage, EventService, MaterializedEvents};
pub use reconcile::{Reconciler, RunSummary};
pub use series::{DashboardSeries, build_dashboard_series, date_range};
