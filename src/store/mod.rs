//! Persistence for events.
//!
//! Handlers only see the [`EventsStore`] trait. List operations return
//! events ordered by `start_time`, then `id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Event, UpsertEvent};
use crate::utils::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryEventsStore;
pub use postgres::PgEventsStore;

#[async_trait]
pub trait EventsStore: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Event>>;

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Event>>;

    async fn find_by_club(&self, club_id: &str) -> AppResult<Vec<Event>>;

    /// Events whose window contains `now`, bounds inclusive.
    async fn find_ongoing(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>>;

    /// Events that ended strictly before `now`.
    async fn find_past(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>>;

    async fn find_featured(&self) -> AppResult<Vec<Event>>;

    /// Events carrying at least one of `tags`.
    async fn find_by_tags(&self, tags: &[String]) -> AppResult<Vec<Event>>;

    /// Inserts the event, or overwrites the one with the same id while
    /// keeping its `created_at`.
    async fn save(&self, event: UpsertEvent) -> AppResult<Event>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: &str) -> AppResult<bool>;
}

pub(crate) fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.start_time
            .cmp(&b.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
}
