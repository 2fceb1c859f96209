//! Data models
//!
//! Rust structs representing stored entities and derived events.
//! Platform IDs are 64-bit integers; timestamps use chrono.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Make a username comparable regardless of case or whitespace.
pub fn normalize_username(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Daily state key for a (username, date) pair.
///
/// Deterministic and pure: the username is normalized and joined with
/// the ISO date. Two distinct usernames that normalize to the same
/// string collide; this is an accepted limitation.
pub fn daily_state_key(username: &str, date: NaiveDate) -> String {
    format!("{}-{}", normalize_username(username), to_iso_date(date))
}

/// Daily state key for an already-formatted ISO date.
pub fn daily_state_key_iso(username: &str, iso_date: &str) -> String {
    format!("{}-{}", normalize_username(username), iso_date)
}

// =============================================================================
// Daily state
// =============================================================================

/// Snapshot plus deltas for one user on one calendar date
///
/// Counts are always recomputed from the lists via [`DailyState::recount`]
/// before persisting; they are never authoritative on their own.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyState {
    pub key: String,
    pub username: String,
    /// ISO date (`YYYY-MM-DD`) this state describes
    pub state_on: String,
    pub updated_on: DateTime<Utc>,

    /// Full follower-ID snapshot for the day
    pub followers: Vec<i64>,
    pub follower_count: i64,

    pub new_followers: Vec<i64>,
    pub new_follower_count: i64,

    pub new_unfollowers: Vec<i64>,
    pub new_unfollower_count: i64,

    /// Full friend-ID snapshot for the day
    pub friends: Vec<i64>,
    pub friend_count: i64,

    pub new_friends: Vec<i64>,
    pub new_friend_count: i64,

    pub new_unfriended: Vec<i64>,
    pub new_unfriended_count: i64,
}

impl DailyState {
    /// Construct a zero-valued state record for a (username, date) pair.
    ///
    /// The record is keyed and dated but holds empty lists and zero
    /// counts. It is not persisted until a reconciliation run saves it.
    pub fn empty(username: &str, date: NaiveDate) -> Self {
        Self {
            key: daily_state_key(username, date),
            username: normalize_username(username),
            state_on: to_iso_date(date),
            ..Default::default()
        }
    }

    /// Construct a zero-valued state record for an already-formatted
    /// ISO date, as supplied by day queries.
    pub fn empty_iso(username: &str, iso_date: &str) -> Self {
        Self {
            key: daily_state_key_iso(username, iso_date),
            username: normalize_username(username),
            state_on: iso_date.to_string(),
            ..Default::default()
        }
    }

    /// Recompute every count from its authoritative list.
    pub fn recount(&mut self) {
        self.follower_count = self.followers.len() as i64;
        self.new_follower_count = self.new_followers.len() as i64;
        self.new_unfollower_count = self.new_unfollowers.len() as i64;
        self.friend_count = self.friends.len() as i64;
        self.new_friend_count = self.new_friends.len() as i64;
        self.new_unfriended_count = self.new_unfriended.len() as i64;
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Cached snapshot of a platform user's public attributes
///
/// Overwritten wholesale on each fetch; no partial updates. The
/// platform ID is the stable identity, the normalized username is a
/// secondary unique lookup key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub description: String,
    pub profile_image: String,
    pub location: String,
    pub lang: String,
    pub post_count: i64,
    pub fave_count: i64,
    pub friend_count: i64,
    pub follower_count: i64,
    pub listed_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Tracked user
// =============================================================================

/// A tracked account with its upstream access credentials
///
/// One record per account; created on first successful authorization,
/// refreshed whenever the profile is refreshed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrackedUser {
    pub username: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Events
// =============================================================================

/// The four tracked relationship change directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Followed,
    Unfollowed,
    Friended,
    Unfriended,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Followed => "followed",
            Self::Unfollowed => "unfollowed",
            Self::Friended => "friended",
            Self::Unfriended => "unfriended",
        }
    }

    /// Parse a list-type parameter from the query layer.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "followed" => Some(Self::Followed),
            "unfollowed" => Some(Self::Unfollowed),
            "friended" => Some(Self::Friended),
            "unfriended" => Some(Self::Unfriended),
            _ => None,
        }
    }

    /// Human-readable description used by presentation layers.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Followed => "they followed you",
            Self::Unfollowed => "they unfollowed you",
            Self::Friended => "you followed them",
            Self::Unfriended => "you unfollowed them",
        }
    }

    /// Whether this event is about the follower direction (them acting
    /// on the tracked account) rather than the friend direction.
    pub fn is_follower_direction(&self) -> bool {
        matches!(self, Self::Followed | Self::Unfollowed)
    }
}

/// A profile wrapped as a dated relationship change event
///
/// Ephemeral and derived; constructed only to answer a query, never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct UserEvent {
    #[serde(flatten)]
    pub profile: Profile,
    pub event_date: String,
    pub event_type: EventType,
    /// Human-readable description of the change direction
    pub event_description: &'static str,
    pub event_user: String,
    pub is_friend: bool,
    pub is_following: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_username(" Bob "), "bob");
        assert_eq!(normalize_username("alice"), "alice");
    }

    #[test]
    fn state_key_is_deterministic() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        assert_eq!(daily_state_key("alice", date), "alice-2021-03-14");
        assert_eq!(daily_state_key("alice", date), daily_state_key("alice", date));
    }

    #[test]
    fn state_key_differs_by_date() {
        let a = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        let b = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_ne!(daily_state_key("alice", a), daily_state_key("alice", b));
    }

    #[test]
    fn state_key_normalizes_username() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        assert_eq!(daily_state_key("Bob", date), daily_state_key(" bob ", date));
    }

    #[test]
    fn iso_state_key_matches_date_key() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        assert_eq!(
            daily_state_key("alice", date),
            daily_state_key_iso("alice", "2021-03-14")
        );
    }

    #[test]
    fn empty_state_is_zero_valued() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
        let state = DailyState::empty("Alice", date);
        assert_eq!(state.key, "alice-2021-03-14");
        assert_eq!(state.username, "alice");
        assert_eq!(state.state_on, "2021-03-14");
        assert!(state.followers.is_empty());
        assert!(state.new_unfriended.is_empty());
        assert_eq!(state.follower_count, 0);
        assert_eq!(state.new_unfriended_count, 0);
    }

    #[test]
    fn recount_derives_counts_from_lists() {
        let mut state = DailyState::empty("alice", NaiveDate::from_ymd_opt(2021, 3, 14).unwrap());
        state.followers = vec![1, 2, 3];
        state.new_followers = vec![3];
        state.new_unfollowers = vec![4, 5];
        state.friends = vec![10];
        state.recount();

        assert_eq!(state.follower_count, 3);
        assert_eq!(state.new_follower_count, 1);
        assert_eq!(state.new_unfollower_count, 2);
        assert_eq!(state.friend_count, 1);
        assert_eq!(state.new_friend_count, 0);
        assert_eq!(state.new_unfriended_count, 0);
    }

    #[test]
    fn event_type_round_trips_list_params() {
        for value in ["followed", "unfollowed", "friended", "unfriended"] {
            assert_eq!(EventType::parse(value).unwrap().as_str(), value);
        }
        assert!(EventType::parse("bogus").is_none());
    }
}
