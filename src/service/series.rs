//! Dashboard trend series
//!
//! Aggregates persisted daily state into per-day chart series: totals,
//! gained/lost counts (lost as negative values), and running averages.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use crate::data::Database;
use crate::error::Result;

/// Per-day chart series keyed by ISO date
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSeries {
    pub all_followers: HashMap<String, i64>,
    pub new_followers: HashMap<String, i64>,
    pub lost_followers: HashMap<String, i64>,
    pub avg_followers: HashMap<String, f32>,
    pub avg_total: HashMap<String, f32>,
    pub new_friends: HashMap<String, i64>,
    pub lost_friends: HashMap<String, i64>,
}

/// Dates from `since` through today (UTC), inclusive.
///
/// A `since` in the future clamps to a single-day range of today.
pub fn date_range(since: NaiveDate) -> Vec<NaiveDate> {
    let today = Utc::now().date_naive();
    let mut current = if since > today { today } else { since };

    let mut range = Vec::new();
    loop {
        range.push(current);
        if current >= today {
            break;
        }
        current = match current.checked_add_days(Days::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    range
}

/// Build the dashboard series for a user over the trailing `days` days.
///
/// Days without a persisted state contribute zero-valued points, so the
/// series always covers the full requested range.
pub async fn build_dashboard_series(
    db: &Arc<Database>,
    username: &str,
    days: u64,
) -> Result<DashboardSeries> {
    let since = Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(days))
        .unwrap_or_else(|| Utc::now().date_naive());

    let mut series = DashboardSeries::default();
    let mut run_sum: f32 = 0.0;
    let mut total_sum: f32 = 0.0;

    for (i, date) in date_range(since).into_iter().enumerate() {
        let day = (i + 1) as f32;
        let state = db.get_or_create_daily_state(username, date).await?;

        series
            .all_followers
            .insert(state.state_on.clone(), state.follower_count);
        series
            .new_followers
            .insert(state.state_on.clone(), state.new_follower_count);
        series
            .lost_followers
            .insert(state.state_on.clone(), -state.new_unfollower_count);
        series
            .new_friends
            .insert(state.state_on.clone(), state.new_friend_count);
        series
            .lost_friends
            .insert(state.state_on.clone(), -state.new_unfriended_count);

        run_sum += (state.new_follower_count - state.new_unfollower_count) as f32;
        series
            .avg_followers
            .insert(state.state_on.clone(), run_sum / day);

        total_sum += state.follower_count as f32;
        series.avg_total.insert(state.state_on, total_sum / day);
    }

    Ok(series)
}
