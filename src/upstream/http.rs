//! HTTP upstream client
//!
//! Talks to the platform's JSON API with reqwest. Follower/friend ID
//! listings are cursor-paginated by the upstream and fetched to
//! exhaustion here; detail lookups are batched by the caller and sent
//! as one request per batch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::client::{Relationship, UpstreamClient};
use crate::config::UpstreamConfig;
use crate::data::{Profile, TrackedUser, normalize_username};
use crate::error::{AppError, Result};
use crate::metrics::UPSTREAM_REQUESTS_TOTAL;

/// Upstream profile as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
struct WireProfile {
    id: i64,
    screen_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    profile_image_url: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    lang: String,
    #[serde(default)]
    statuses_count: i64,
    #[serde(default)]
    favourites_count: i64,
    #[serde(default)]
    friends_count: i64,
    #[serde(default)]
    followers_count: i64,
    #[serde(default)]
    listed_count: i64,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl WireProfile {
    fn into_profile(self) -> Profile {
        Profile {
            id: self.id,
            username: normalize_username(&self.screen_name),
            name: self.name,
            description: self.description,
            profile_image: self.profile_image_url,
            location: self.location,
            lang: self.lang,
            post_count: self.statuses_count,
            fave_count: self.favourites_count,
            friend_count: self.friends_count,
            follower_count: self.followers_count,
            listed_count: self.listed_count,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            updated_at: Utc::now(),
        }
    }
}

/// One page of a cursor-paginated ID listing
#[derive(Debug, Deserialize)]
struct WireIdPage {
    #[serde(default)]
    ids: Vec<i64>,
    #[serde(default)]
    next_cursor: i64,
}

#[derive(Debug, Deserialize)]
struct WireRelationshipSide {
    #[serde(default)]
    following: bool,
}

#[derive(Debug, Deserialize)]
struct WireRelationship {
    source: WireRelationshipSide,
    target: WireRelationshipSide,
}

#[derive(Debug, Deserialize)]
struct WireRelationshipEnvelope {
    relationship: WireRelationship,
}

/// Reqwest-backed implementation of [`UpstreamClient`]
#[derive(Debug)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
    /// IDs requested per cursor page on follower/friend listings
    cursor_page_size: usize,
}

impl HttpUpstream {
    /// Build an HTTP upstream client from configuration.
    ///
    /// # Errors
    /// Returns `AppError::Config` when the base URL is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        url::Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("invalid upstream.base_url: {}", e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("FollowTrace/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cursor_page_size: config.page_size,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue an authenticated GET and decode the JSON body.
    ///
    /// `empty_on_not_found` maps upstream's "no matching user" 404 to
    /// `None` instead of an error.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        user: &TrackedUser,
        operation: &'static str,
        url: &str,
        query: &[(&str, String)],
        empty_on_not_found: bool,
    ) -> Result<Option<T>> {
        let response = self
            .client
            .get(url)
            .query(query)
            .bearer_auth(&user.access_token)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[operation, "error"])
                    .inc();
                return Err(AppError::HttpClient(e));
            }
        };

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[operation, "rate_limited"])
                    .inc();
                Err(AppError::RateLimited)
            }
            StatusCode::UNAUTHORIZED => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[operation, "unauthorized"])
                    .inc();
                Err(AppError::Unauthorized)
            }
            StatusCode::NOT_FOUND if empty_on_not_found => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[operation, "not_found"])
                    .inc();
                Ok(None)
            }
            status if !status.is_success() => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[operation, "error"])
                    .inc();
                Err(AppError::Upstream(format!(
                    "{} returned {}",
                    operation, status
                )))
            }
            _ => {
                UPSTREAM_REQUESTS_TOTAL
                    .with_label_values(&[operation, "success"])
                    .inc();
                let body = response.json::<T>().await.map_err(|e| {
                    AppError::Upstream(format!("invalid {} response: {}", operation, e))
                })?;
                Ok(Some(body))
            }
        }
    }

    /// Walk a cursor-paginated ID listing until the upstream reports
    /// cursor exhaustion (`next_cursor < 1`).
    async fn fetch_ids(
        &self,
        user: &TrackedUser,
        operation: &'static str,
        path: &str,
    ) -> Result<Vec<i64>> {
        let url = self.endpoint(path);
        let mut ids = Vec::new();
        let mut cursor: i64 = -1;

        loop {
            let page: WireIdPage = self
                .get_json(
                    user,
                    operation,
                    &url,
                    &[
                        ("screen_name", user.username.clone()),
                        ("count", self.cursor_page_size.to_string()),
                        ("cursor", cursor.to_string()),
                    ],
                    false,
                )
                .await?
                .ok_or_else(|| AppError::Upstream(format!("{} returned no body", operation)))?;

            ids.extend(page.ids);

            if page.next_cursor < 1 {
                break;
            }
            cursor = page.next_cursor;
        }

        Ok(ids)
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn fetch_profile(&self, user: &TrackedUser) -> Result<Profile> {
        let url = self.endpoint("/users/show");
        let profile: WireProfile = self
            .get_json(
                user,
                "users_show",
                &url,
                &[("screen_name", user.username.clone())],
                false,
            )
            .await?
            .ok_or_else(|| AppError::Upstream("users_show returned no body".to_string()))?;

        Ok(profile.into_profile())
    }

    async fn fetch_follower_ids(&self, user: &TrackedUser) -> Result<Vec<i64>> {
        self.fetch_ids(user, "followers_ids", "/followers/ids").await
    }

    async fn fetch_friend_ids(&self, user: &TrackedUser) -> Result<Vec<i64>> {
        self.fetch_ids(user, "friends_ids", "/friends/ids").await
    }

    async fn fetch_user_details(&self, user: &TrackedUser, ids: &[i64]) -> Result<Vec<Profile>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let url = self.endpoint("/users/lookup");
        let profiles: Option<Vec<WireProfile>> = self
            .get_json(user, "users_lookup", &url, &[("user_id", id_list)], true)
            .await?;

        // "No user matches" is an empty-result success, not an error.
        Ok(profiles
            .unwrap_or_default()
            .into_iter()
            .map(WireProfile::into_profile)
            .collect())
    }

    async fn fetch_relationship(
        &self,
        user: &TrackedUser,
        source_id: i64,
        target_id: i64,
    ) -> Result<Relationship> {
        let url = self.endpoint("/friendships/show");
        let envelope: WireRelationshipEnvelope = self
            .get_json(
                user,
                "friendships_show",
                &url,
                &[
                    ("source_id", source_id.to_string()),
                    ("target_id", target_id.to_string()),
                ],
                false,
            )
            .await?
            .ok_or_else(|| AppError::Upstream("friendships_show returned no body".to_string()))?;

        Ok(Relationship {
            source_following: envelope.relationship.source.following,
            target_following: envelope.relationship.target.following,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upstream_config(base_url: &str) -> UpstreamConfig {
        UpstreamConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
            page_size: 5000,
            lookup_batch_size: 100,
        }
    }

    #[test]
    fn rejects_invalid_base_url() {
        let err = HttpUpstream::new(&upstream_config("not a url")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let upstream = HttpUpstream::new(&upstream_config("https://api.example.com/")).unwrap();
        assert_eq!(
            upstream.endpoint("/users/show"),
            "https://api.example.com/users/show"
        );
    }

    #[test]
    fn wire_profile_conversion_normalizes_username() {
        let wire: WireProfile = serde_json::from_value(serde_json::json!({
            "id": 7,
            "screen_name": " Alice ",
            "name": "Alice",
            "followers_count": 3,
        }))
        .unwrap();

        let profile = wire.into_profile();
        assert_eq!(profile.id, 7);
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.follower_count, 3);
    }
}
