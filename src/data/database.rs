//! SQLite database operations
//!
//! All persistence goes through this module. Scalar entities use
//! `query_as` row mapping; daily state rows carry JSON-encoded ID
//! lists and are mapped by hand.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::{AppError, Result};

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

fn decode_ids(raw: &str, column: &str) -> Result<Vec<i64>> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid {} ID list: {}", column, e)))
}

fn encode_ids(ids: &[i64]) -> Result<String> {
    serde_json::to_string(ids)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode ID list: {}", e)))
}

fn row_to_daily_state(row: &SqliteRow) -> Result<DailyState> {
    Ok(DailyState {
        key: row.try_get("key").map_err(AppError::Database)?,
        username: row.try_get("username").map_err(AppError::Database)?,
        state_on: row.try_get("state_on").map_err(AppError::Database)?,
        updated_on: row
            .try_get::<DateTime<Utc>, _>("updated_on")
            .map_err(AppError::Database)?,
        followers: decode_ids(row.try_get("followers").map_err(AppError::Database)?, "followers")?,
        follower_count: row.try_get("follower_count").map_err(AppError::Database)?,
        new_followers: decode_ids(
            row.try_get("new_followers").map_err(AppError::Database)?,
            "new_followers",
        )?,
        new_follower_count: row
            .try_get("new_follower_count")
            .map_err(AppError::Database)?,
        new_unfollowers: decode_ids(
            row.try_get("new_unfollowers").map_err(AppError::Database)?,
            "new_unfollowers",
        )?,
        new_unfollower_count: row
            .try_get("new_unfollower_count")
            .map_err(AppError::Database)?,
        friends: decode_ids(row.try_get("friends").map_err(AppError::Database)?, "friends")?,
        friend_count: row.try_get("friend_count").map_err(AppError::Database)?,
        new_friends: decode_ids(
            row.try_get("new_friends").map_err(AppError::Database)?,
            "new_friends",
        )?,
        new_friend_count: row.try_get("new_friend_count").map_err(AppError::Database)?,
        new_unfriended: decode_ids(
            row.try_get("new_unfriended").map_err(AppError::Database)?,
            "new_unfriended",
        )?,
        new_unfriended_count: row
            .try_get("new_unfriended_count")
            .map_err(AppError::Database)?,
    })
}

impl Database {
    /// Connect to SQLite database.
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            tracing::error!("Migration failed: {}", e);
            AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
        })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Daily state
    // =========================================================================

    /// Get a daily state record by its state key.
    ///
    /// # Returns
    /// The record, or `None` when the key has never been persisted
    pub async fn get_daily_state(&self, key: &str) -> Result<Option<DailyState>> {
        let row = sqlx::query("SELECT * FROM daily_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_daily_state).transpose()
    }

    /// Get the daily state for a (username, date) pair, or construct a
    /// zero-valued record when none has been persisted.
    ///
    /// The constructed record is keyed, named, and dated, but is NOT
    /// written back; persistence only happens when a reconciliation run
    /// calls [`Database::save_daily_state`]. Store failures other than
    /// a missing row propagate.
    pub async fn get_or_create_daily_state(
        &self,
        username: &str,
        date: NaiveDate,
    ) -> Result<DailyState> {
        let key = daily_state_key(username, date);
        match self.get_daily_state(&key).await? {
            Some(state) => Ok(state),
            None => Ok(DailyState::empty(username, date)),
        }
    }

    /// Get-or-create variant for day queries carrying an ISO date.
    ///
    /// The lookup is keyed by the requested day, so historical day
    /// queries see that day's deltas rather than today's.
    pub async fn get_or_create_daily_state_iso(
        &self,
        username: &str,
        iso_date: &str,
    ) -> Result<DailyState> {
        let key = daily_state_key_iso(username, iso_date);
        match self.get_daily_state(&key).await? {
            Some(state) => Ok(state),
            None => Ok(DailyState::empty_iso(username, iso_date)),
        }
    }

    /// Persist a daily state record, overwriting the full row.
    ///
    /// Callers must load-modify-save the complete record; there is no
    /// partial-field update.
    pub async fn save_daily_state(&self, state: &DailyState) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO daily_state (
                key, username, state_on, updated_on,
                followers, follower_count,
                new_followers, new_follower_count,
                new_unfollowers, new_unfollower_count,
                friends, friend_count,
                new_friends, new_friend_count,
                new_unfriended, new_unfriended_count
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&state.key)
        .bind(&state.username)
        .bind(&state.state_on)
        .bind(state.updated_on)
        .bind(encode_ids(&state.followers)?)
        .bind(state.follower_count)
        .bind(encode_ids(&state.new_followers)?)
        .bind(state.new_follower_count)
        .bind(encode_ids(&state.new_unfollowers)?)
        .bind(state.new_unfollower_count)
        .bind(encode_ids(&state.friends)?)
        .bind(state.friend_count)
        .bind(encode_ids(&state.new_friends)?)
        .bind(state.new_friend_count)
        .bind(encode_ids(&state.new_unfriended)?)
        .bind(state.new_unfriended_count)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Get a cached profile by normalized username.
    pub async fn get_profile(&self, username: &str) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE username = ?")
            .bind(normalize_username(username))
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Get a cached profile by platform ID.
    pub async fn get_profile_by_id(&self, id: i64) -> Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(profile)
    }

    /// Persist a profile snapshot, overwriting any prior row wholesale.
    pub async fn save_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO profiles (
                id, username, name, description, profile_image, location, lang,
                post_count, fave_count, friend_count, follower_count, listed_count,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.id)
        .bind(normalize_username(&profile.username))
        .bind(&profile.name)
        .bind(&profile.description)
        .bind(&profile.profile_image)
        .bind(&profile.location)
        .bind(&profile.lang)
        .bind(profile.post_count)
        .bind(profile.fave_count)
        .bind(profile.friend_count)
        .bind(profile.follower_count)
        .bind(profile.listed_count)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Tracked users
    // =========================================================================

    /// List every tracked account.
    pub async fn list_tracked_users(&self) -> Result<Vec<TrackedUser>> {
        let users =
            sqlx::query_as::<_, TrackedUser>("SELECT * FROM tracked_users ORDER BY username")
                .fetch_all(&self.pool)
                .await?;

        Ok(users)
    }

    /// Get a tracked account by normalized username.
    pub async fn get_tracked_user(&self, username: &str) -> Result<Option<TrackedUser>> {
        let user =
            sqlx::query_as::<_, TrackedUser>("SELECT * FROM tracked_users WHERE username = ?")
                .bind(normalize_username(username))
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Create or update a tracked account's credentials.
    pub async fn save_tracked_user(&self, user: &TrackedUser) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO tracked_users (
                username, access_token, access_token_secret, updated_at
            ) VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(normalize_username(&user.username))
        .bind(&user.access_token)
        .bind(&user.access_token_secret)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a tracked account.
    pub async fn delete_tracked_user(&self, username: &str) -> Result<()> {
        sqlx::query("DELETE FROM tracked_users WHERE username = ?")
            .bind(normalize_username(username))
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
