//! Database tests

use super::*;
use chrono::{NaiveDate, Utc};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn sample_profile(id: i64, username: &str) -> Profile {
    Profile {
        id,
        username: username.to_string(),
        name: "Test User".to_string(),
        description: "bio".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_get_or_create_returns_zero_state_without_persisting() {
    let (db, _temp_dir) = create_test_db().await;
    let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();

    let state = db.get_or_create_daily_state("Alice", date).await.unwrap();
    assert_eq!(state.key, "alice-2021-03-14");
    assert_eq!(state.username, "alice");
    assert_eq!(state.state_on, "2021-03-14");
    assert!(state.followers.is_empty());
    assert_eq!(state.follower_count, 0);
    assert_eq!(state.new_follower_count, 0);
    assert_eq!(state.new_unfriended_count, 0);

    // The miss must not create a persisted entry as a side effect.
    let persisted = db.get_daily_state(&state.key).await.unwrap();
    assert!(persisted.is_none());
}

#[tokio::test]
async fn day_queries_use_requested_day_key() {
    let (db, _temp_dir) = create_test_db().await;

    // A persisted record for a past day must be found when that day is
    // requested, regardless of what "today" is.
    let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();
    let mut state = DailyState::empty("alice", date);
    state.followers = vec![7, 8];
    state.recount();
    db.save_daily_state(&state).await.unwrap();

    let loaded = db
        .get_or_create_daily_state_iso("alice", "2021-03-14")
        .await
        .unwrap();
    assert_eq!(loaded.key, "alice-2021-03-14");
    assert_eq!(loaded.state_on, "2021-03-14");
    assert_eq!(loaded.followers, vec![7, 8]);

    // A miss yields a zero state keyed to the requested day, not today.
    let missed = db
        .get_or_create_daily_state_iso("alice", "2020-01-01")
        .await
        .unwrap();
    assert_eq!(missed.key, "alice-2020-01-01");
    assert_eq!(missed.state_on, "2020-01-01");
    assert!(missed.followers.is_empty());
}

#[tokio::test]
async fn test_daily_state_save_and_get() {
    let (db, _temp_dir) = create_test_db().await;
    let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();

    let mut state = DailyState::empty("alice", date);
    state.followers = vec![2, 3, 4];
    state.new_followers = vec![4];
    state.new_unfollowers = vec![1];
    state.friends = vec![10, 30];
    state.new_friends = vec![30];
    state.new_unfriended = vec![20];
    state.recount();
    state.updated_on = Utc::now();

    db.save_daily_state(&state).await.unwrap();

    let loaded = db.get_daily_state(&state.key).await.unwrap().unwrap();
    assert_eq!(loaded.followers, vec![2, 3, 4]);
    assert_eq!(loaded.follower_count, 3);
    assert_eq!(loaded.new_followers, vec![4]);
    assert_eq!(loaded.new_follower_count, 1);
    assert_eq!(loaded.new_unfollowers, vec![1]);
    assert_eq!(loaded.friends, vec![10, 30]);
    assert_eq!(loaded.new_unfriended, vec![20]);
    assert_eq!(loaded.new_unfriended_count, 1);

    // A later load through get-or-create finds the persisted record.
    let again = db.get_or_create_daily_state("alice", date).await.unwrap();
    assert_eq!(again.followers, vec![2, 3, 4]);
}

#[tokio::test]
async fn test_daily_state_save_overwrites_full_row() {
    let (db, _temp_dir) = create_test_db().await;
    let date = NaiveDate::from_ymd_opt(2021, 3, 14).unwrap();

    let mut state = DailyState::empty("alice", date);
    state.followers = vec![1, 2, 3];
    state.new_followers = vec![3];
    state.recount();
    db.save_daily_state(&state).await.unwrap();

    let mut rerun = DailyState::empty("alice", date);
    rerun.followers = vec![1, 2];
    rerun.new_unfollowers = vec![3];
    rerun.recount();
    db.save_daily_state(&rerun).await.unwrap();

    let loaded = db.get_daily_state(&state.key).await.unwrap().unwrap();
    assert_eq!(loaded.followers, vec![1, 2]);
    assert!(loaded.new_followers.is_empty());
    assert_eq!(loaded.new_unfollowers, vec![3]);
}

#[tokio::test]
async fn test_profile_save_and_lookup() {
    let (db, _temp_dir) = create_test_db().await;

    let profile = sample_profile(42, "Alice");
    db.save_profile(&profile).await.unwrap();

    // Username lookup is case/whitespace normalized.
    let by_name = db.get_profile(" ALICE ").await.unwrap().unwrap();
    assert_eq!(by_name.id, 42);
    assert_eq!(by_name.username, "alice");

    let by_id = db.get_profile_by_id(42).await.unwrap().unwrap();
    assert_eq!(by_id.name, "Test User");

    assert!(db.get_profile("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_profile_save_overwrites_wholesale() {
    let (db, _temp_dir) = create_test_db().await;

    let mut profile = sample_profile(42, "alice");
    profile.follower_count = 10;
    db.save_profile(&profile).await.unwrap();

    profile.follower_count = 12;
    profile.description = String::new();
    db.save_profile(&profile).await.unwrap();

    let loaded = db.get_profile_by_id(42).await.unwrap().unwrap();
    assert_eq!(loaded.follower_count, 12);
    assert_eq!(loaded.description, "");
}

#[tokio::test]
async fn test_tracked_user_operations() {
    let (db, _temp_dir) = create_test_db().await;

    let user = TrackedUser {
        username: " Alice ".to_string(),
        access_token: "token".to_string(),
        access_token_secret: "secret".to_string(),
        updated_at: Utc::now(),
    };
    db.save_tracked_user(&user).await.unwrap();

    let users = db.list_tracked_users().await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "alice");

    let found = db.get_tracked_user("ALICE").await.unwrap();
    assert!(found.is_some());

    db.delete_tracked_user("alice").await.unwrap();
    assert!(db.list_tracked_users().await.unwrap().is_empty());
}
