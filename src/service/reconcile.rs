//! Reconciliation engine
//!
//! Once per run, for each tracked account: refresh the profile, fetch
//! the current follower/friend ID sets, diff them against yesterday's
//! persisted snapshot, and persist today's state with the four deltas.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};

use crate::data::{Database, TrackedUser};
use crate::error::{AppError, Result};
use crate::ids;
use crate::metrics::{RECONCILE_RUNS_TOTAL, RECONCILE_USERS_TOTAL, TRACKED_USERS_TOTAL};
use crate::upstream::UpstreamClient;

/// Outcome of one batch run over all tracked accounts
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    /// Accounts fully reconciled and persisted
    pub processed: usize,
    /// Accounts whose reconciliation failed and was skipped
    pub failed: usize,
}

/// Reconciliation service
pub struct Reconciler {
    db: Arc<Database>,
    upstream: Arc<dyn UpstreamClient>,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(db: Arc<Database>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self { db, upstream }
    }

    /// Reconcile every tracked account, strictly sequentially.
    ///
    /// Per-user failures are logged and counted; the run continues with
    /// the next account rather than aborting. The summary carries the
    /// aggregate failure count.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting reconciliation run...");
        RECONCILE_RUNS_TOTAL.inc();

        let users = self.db.list_tracked_users().await?;
        TRACKED_USERS_TOTAL.set(users.len() as i64);
        tracing::info!(users = users.len(), "Found tracked accounts");

        let mut summary = RunSummary::default();
        for user in &users {
            match self.reconcile_user(user).await {
                Ok(()) => {
                    RECONCILE_USERS_TOTAL.with_label_values(&["success"]).inc();
                    summary.processed += 1;
                }
                Err(error) => {
                    RECONCILE_USERS_TOTAL.with_label_values(&["error"]).inc();
                    crate::metrics::ERRORS_TOTAL
                        .with_label_values(&[error.error_type()])
                        .inc();
                    tracing::error!(
                        username = %user.username,
                        %error,
                        transient = error.is_transient(),
                        "Reconciliation failed for account"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            processed = summary.processed,
            failed = summary.failed,
            "Reconciliation run finished"
        );

        Ok(summary)
    }

    /// Reconcile one account against today's date (UTC).
    pub async fn reconcile_user(&self, user: &TrackedUser) -> Result<()> {
        self.reconcile_user_for_date(user, Utc::now().date_naive())
            .await
    }

    /// Reconcile one account against an explicit "today".
    ///
    /// Steps are strictly ordered: profile, follower IDs, friend IDs,
    /// yesterday's state, today's state, four diffs, a single persist.
    /// All computed fields are buffered and written exactly once at the
    /// end; a same-day rerun therefore overwrites the earlier run's
    /// deltas wholesale.
    pub async fn reconcile_user_for_date(
        &self,
        user: &TrackedUser,
        today: NaiveDate,
    ) -> Result<()> {
        if user.username.trim().is_empty() {
            return Err(AppError::Validation("username required".to_string()));
        }

        tracing::info!(username = %user.username, "Starting account reconciliation...");

        // Profile refresh persists regardless of whether later steps
        // succeed; a half-finished run still leaves a fresh profile.
        let profile = self.upstream.fetch_profile(user).await?;
        self.db.save_profile(&profile).await?;

        let follower_ids = self.upstream.fetch_follower_ids(user).await?;
        tracing::info!(
            username = %user.username,
            profile_count = profile.follower_count,
            fetched = follower_ids.len(),
            "Fetched follower IDs"
        );

        let friend_ids = self.upstream.fetch_friend_ids(user).await?;
        tracing::info!(
            username = %user.username,
            profile_count = profile.friend_count,
            fetched = friend_ids.len(),
            "Fetched friend IDs"
        );

        let yesterday = today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| AppError::Validation(format!("no day precedes {}", today)))?;

        let yesterday_state = self.db.get_or_create_daily_state(&user.username, yesterday).await?;
        let mut today_state = self.db.get_or_create_daily_state(&user.username, today).await?;

        let new_followers = ids::diff(&yesterday_state.followers, &follower_ids);
        let new_unfollowers = ids::diff(&follower_ids, &yesterday_state.followers);
        let new_friends = ids::diff(&yesterday_state.friends, &friend_ids);
        let new_unfriended = ids::diff(&friend_ids, &yesterday_state.friends);

        tracing::info!(
            username = %user.username,
            baseline_followers = yesterday_state.follower_count,
            gained = new_followers.len(),
            lost = new_unfollowers.len(),
            baseline_friends = yesterday_state.friend_count,
            friended = new_friends.len(),
            unfriended = new_unfriended.len(),
            "Computed daily deltas"
        );

        today_state.followers = follower_ids;
        today_state.new_followers = new_followers;
        today_state.new_unfollowers = new_unfollowers;
        today_state.friends = friend_ids;
        today_state.new_friends = new_friends;
        today_state.new_unfriended = new_unfriended;
        today_state.recount();
        today_state.updated_on = Utc::now();

        self.db.save_daily_state(&today_state).await?;
        tracing::info!(username = %user.username, key = %today_state.key, "Saved daily state");

        Ok(())
    }
}
