//! Shared test helpers
//!
//! A TempDir-backed database and a scripted in-memory upstream client.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use followtrace::data::{Database, Profile, TrackedUser};
use followtrace::error::{AppError, Result};
use followtrace::upstream::{Relationship, UpstreamClient};

/// Create a test database in a temporary directory
pub async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

/// A tracked user with dummy credentials
pub fn tracked_user(username: &str) -> TrackedUser {
    TrackedUser {
        username: username.to_string(),
        access_token: "token".to_string(),
        access_token_secret: "secret".to_string(),
        updated_at: Utc::now(),
    }
}

/// A deterministic profile for a platform ID
pub fn profile_for_id(id: i64) -> Profile {
    Profile {
        id,
        username: format!("user{}", id),
        name: format!("User {}", id),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Default::default()
    }
}

/// Scripted upstream client
///
/// Responses are keyed by normalized username; detail lookups
/// synthesize one profile per requested ID. Every lookup batch is
/// recorded so tests can assert batching behavior, and individual
/// usernames can be scripted to fail with a transient error.
#[derive(Default)]
pub struct MockUpstream {
    pub profiles: Mutex<HashMap<String, Profile>>,
    pub follower_ids: Mutex<HashMap<String, Vec<i64>>>,
    pub friend_ids: Mutex<HashMap<String, Vec<i64>>>,
    pub relationships: Mutex<HashMap<(i64, i64), Relationship>>,
    /// Usernames whose follower-ID fetch fails
    pub fail_follower_fetch: Mutex<HashSet<String>>,
    /// Recorded detail-lookup batches
    pub lookup_batches: Mutex<Vec<Vec<i64>>>,
    /// Recorded relationship-lookup pairs
    pub relationship_calls: Mutex<Vec<(i64, i64)>>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_profile(&self, username: &str, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(username.to_string(), profile);
    }

    pub fn set_follower_ids(&self, username: &str, ids: Vec<i64>) {
        self.follower_ids
            .lock()
            .unwrap()
            .insert(username.to_string(), ids);
    }

    pub fn set_friend_ids(&self, username: &str, ids: Vec<i64>) {
        self.friend_ids
            .lock()
            .unwrap()
            .insert(username.to_string(), ids);
    }

    pub fn set_relationship(&self, source: i64, target: i64, relationship: Relationship) {
        self.relationships
            .lock()
            .unwrap()
            .insert((source, target), relationship);
    }

    pub fn fail_follower_fetch_for(&self, username: &str) {
        self.fail_follower_fetch
            .lock()
            .unwrap()
            .insert(username.to_string());
    }

    pub fn lookup_batch_count(&self) -> usize {
        self.lookup_batches.lock().unwrap().len()
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    async fn fetch_profile(&self, user: &TrackedUser) -> Result<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .get(&user.username)
            .cloned()
            .ok_or_else(|| AppError::Upstream(format!("no profile scripted for {}", user.username)))
    }

    async fn fetch_follower_ids(&self, user: &TrackedUser) -> Result<Vec<i64>> {
        if self
            .fail_follower_fetch
            .lock()
            .unwrap()
            .contains(&user.username)
        {
            return Err(AppError::Upstream("scripted follower fetch failure".to_string()));
        }

        Ok(self
            .follower_ids
            .lock()
            .unwrap()
            .get(&user.username)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_friend_ids(&self, user: &TrackedUser) -> Result<Vec<i64>> {
        Ok(self
            .friend_ids
            .lock()
            .unwrap()
            .get(&user.username)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_user_details(&self, _user: &TrackedUser, ids: &[i64]) -> Result<Vec<Profile>> {
        self.lookup_batches.lock().unwrap().push(ids.to_vec());
        Ok(ids.iter().map(|id| profile_for_id(*id)).collect())
    }

    async fn fetch_relationship(
        &self,
        _user: &TrackedUser,
        source_id: i64,
        target_id: i64,
    ) -> Result<Relationship> {
        self.relationship_calls
            .lock()
            .unwrap()
            .push((source_id, target_id));

        Ok(self
            .relationships
            .lock()
            .unwrap()
            .get(&(source_id, target_id))
            .copied()
            .unwrap_or_default())
    }
}
