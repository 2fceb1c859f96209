//! Event materializer
//!
//! Expands stored ID lists into enriched user-event records by paging
//! through upstream detail and relationship lookups. Everything here is
//! derived on demand; nothing is persisted.

use std::sync::Arc;

use crate::config::{UpstreamConfig, WorkerConfig};
use crate::data::{DailyState, EventType, TrackedUser, UserEvent};
use crate::error::Result;
use crate::ids;
use crate::pager::IdPager;
use crate::upstream::UpstreamClient;

/// Materialized events plus whether the source list was capped
#[derive(Debug, Clone, Default)]
pub struct MaterializedEvents {
    pub events: Vec<UserEvent>,
    /// True when the input list exceeded the event limit and only its
    /// most recent suffix was materialized
    pub limited: bool,
}

/// One query-layer page of events with pager navigation
#[derive(Debug, Clone)]
pub struct EventPage {
    pub events: Vec<UserEvent>,
    pub page_prev: usize,
    pub page_next: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

/// Event materialization service
pub struct EventService {
    upstream: Arc<dyn UpstreamClient>,
    /// Events per query-layer page
    page_size: usize,
    /// Cap on IDs materialized per list
    max_event_limit: usize,
    /// IDs per upstream detail-lookup batch
    lookup_batch_size: usize,
}

impl EventService {
    /// Create a new event service.
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        worker: &WorkerConfig,
        upstream_config: &UpstreamConfig,
    ) -> Self {
        Self {
            upstream,
            page_size: worker.page_size,
            max_event_limit: worker.max_event_limit,
            lookup_batch_size: upstream_config.lookup_batch_size,
        }
    }

    /// Expand an ID list into user events.
    ///
    /// An empty list returns an empty result without touching the
    /// upstream. Lists longer than the event limit are capped to their
    /// suffix (the most recently appended IDs). The capped list is
    /// paged through the upstream detail lookup in lookup-size batches;
    /// when `load_relationship` is set, each event additionally carries
    /// the following flag for the (source, target) pair. Output order
    /// follows upstream response order.
    ///
    /// # Errors
    /// Any upstream failure propagates immediately; no partial result
    /// is returned.
    pub async fn materialize(
        &self,
        user: &TrackedUser,
        source_id: i64,
        friends: &[i64],
        id_list: &[i64],
        event_date: &str,
        event_type: EventType,
        load_relationship: bool,
    ) -> Result<MaterializedEvents> {
        if id_list.is_empty() {
            return Ok(MaterializedEvents::default());
        }

        let limited = id_list.len() > self.max_event_limit;
        let capped = if limited {
            &id_list[id_list.len() - self.max_event_limit..]
        } else {
            id_list
        };

        tracing::debug!(
            username = %user.username,
            event_type = event_type.as_str(),
            ids = capped.len(),
            limited,
            "Materializing events"
        );

        let mut pager = IdPager::new(capped.to_vec(), self.lookup_batch_size, 0)?;
        let mut events = Vec::with_capacity(capped.len());

        while let Some(batch) = pager.next() {
            let batch = batch.to_vec();
            let profiles = self.upstream.fetch_user_details(user, &batch).await?;
            for profile in profiles {
                let mut event = UserEvent {
                    is_friend: ids::contains(friends, profile.id),
                    is_following: false,
                    event_date: event_date.to_string(),
                    event_type,
                    event_description: event_type.describe(),
                    event_user: user.username.clone(),
                    profile,
                };

                if load_relationship {
                    event.is_following = self
                        .relationship_flag(user, source_id, event.profile.id, event_type)
                        .await?;
                }

                events.push(event);
            }
        }

        Ok(MaterializedEvents { events, limited })
    }

    /// Materialize one query-layer page of a daily state's event list.
    ///
    /// Resolves the requested list type from the state record, serves
    /// the page at the requested index, and loads the relationship flag
    /// for every event on the page.
    pub async fn materialize_page(
        &self,
        user: &TrackedUser,
        source_id: i64,
        state: &DailyState,
        event_date: &str,
        list_type: EventType,
        page: usize,
    ) -> Result<EventPage> {
        let id_list = match list_type {
            EventType::Followed => &state.new_followers,
            EventType::Unfollowed => &state.new_unfollowers,
            EventType::Friended => &state.new_friends,
            EventType::Unfriended => &state.new_unfriended,
        };

        let mut pager = IdPager::new(id_list.clone(), self.page_size, page)?;
        let mut events = Vec::new();

        if !id_list.is_empty() {
            if let Some(batch) = pager.next() {
                let batch = batch.to_vec();
                let profiles = self.upstream.fetch_user_details(user, &batch).await?;
                for profile in profiles {
                    let is_following = self
                        .relationship_flag(user, source_id, profile.id, list_type)
                        .await?;
                    events.push(UserEvent {
                        is_friend: ids::contains(&state.friends, profile.id),
                        is_following,
                        event_date: event_date.to_string(),
                        event_type: list_type,
                        event_description: list_type.describe(),
                        event_user: user.username.clone(),
                        profile,
                    });
                }
            }
        }

        Ok(EventPage {
            events,
            page_prev: pager.prev_page(),
            page_next: pager.next_page(),
            has_prev: pager.has_prev(),
            has_next: pager.has_next(),
        })
    }

    /// Relationship flag for an event, direction-aware: follower-side
    /// events report whether the other account follows the tracked one,
    /// friend-side events whether the tracked account is still followed
    /// back.
    async fn relationship_flag(
        &self,
        user: &TrackedUser,
        source_id: i64,
        target_id: i64,
        event_type: EventType,
    ) -> Result<bool> {
        let relationship = self
            .upstream
            .fetch_relationship(user, source_id, target_id)
            .await?;

        if event_type.is_follower_direction() {
            Ok(relationship.source_following)
        } else {
            Ok(relationship.target_following)
        }
    }
}
