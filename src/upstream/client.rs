//! Upstream client trait
//!
//! The minimal surface of the social platform consumed by the
//! reconciliation engine and the event materializer. Implemented over
//! HTTP in [`super::http`] and by in-memory mocks in tests.

use async_trait::async_trait;

use crate::data::{Profile, TrackedUser};
use crate::error::Result;

/// Relationship between a source and a target account
#[derive(Debug, Clone, Copy, Default)]
pub struct Relationship {
    /// Source account follows the target
    pub source_following: bool,
    /// Target account follows the source
    pub target_following: bool,
}

/// Operations consumed from the social platform
///
/// Every call authenticates as the tracked user whose credentials are
/// passed in. Transient upstream failures surface as
/// `AppError::Upstream` or `AppError::RateLimited`; a "no matching
/// user" condition on detail lookups is an empty-result success.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch the tracked user's own current profile.
    async fn fetch_profile(&self, user: &TrackedUser) -> Result<Profile>;

    /// Fetch the full follower-ID set, following upstream cursors until
    /// exhausted.
    async fn fetch_follower_ids(&self, user: &TrackedUser) -> Result<Vec<i64>>;

    /// Fetch the full friend-ID set, following upstream cursors until
    /// exhausted.
    async fn fetch_friend_ids(&self, user: &TrackedUser) -> Result<Vec<i64>>;

    /// Look up profiles for a batch of IDs (at most one upstream
    /// lookup-batch per call).
    async fn fetch_user_details(&self, user: &TrackedUser, ids: &[i64]) -> Result<Vec<Profile>>;

    /// Look up the relationship between two account IDs.
    async fn fetch_relationship(
        &self,
        user: &TrackedUser,
        source_id: i64,
        target_id: i64,
    ) -> Result<Relationship>;
}
