use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{sort_events, EventsStore};
use crate::models::{Event, UpsertEvent};
use crate::utils::error::AppResult;

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct InMemoryEventsStore {
    events: RwLock<HashMap<String, Event>>,
}

impl InMemoryEventsStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn select<F>(&self, predicate: F) -> Vec<Event>
    where
        F: Fn(&Event) -> bool + Send,
    {
        let events = self.events.read().await;
        let mut matched: Vec<Event> = events.values().filter(|e| predicate(e)).cloned().collect();
        sort_events(&mut matched);
        matched
    }
}

#[async_trait]
impl EventsStore for InMemoryEventsStore {
    async fn find_all(&self) -> AppResult<Vec<Event>> {
        Ok(self.select(|_| true).await)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Event>> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn find_by_club(&self, club_id: &str) -> AppResult<Vec<Event>> {
        Ok(self.select(|e| e.club_id == club_id).await)
    }

    async fn find_ongoing(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>> {
        Ok(self.select(|e| e.is_ongoing(now)).await)
    }

    async fn find_past(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>> {
        Ok(self.select(|e| e.is_past(now)).await)
    }

    async fn find_featured(&self) -> AppResult<Vec<Event>> {
        Ok(self.select(|e| e.featured).await)
    }

    async fn find_by_tags(&self, tags: &[String]) -> AppResult<Vec<Event>> {
        Ok(self.select(|e| e.has_any_tag(tags)).await)
    }

    async fn save(&self, event: UpsertEvent) -> AppResult<Event> {
        let now = Utc::now();
        let mut events = self.events.write().await;
        let created_at = events.get(&event.id).map_or(now, |existing| existing.created_at);

        let saved = event.into_event(created_at, now);
        events.insert(saved.id.clone(), saved.clone());
        tracing::debug!(event_id = %saved.id, "Stored event in memory");
        Ok(saved)
    }

    async fn delete_by_id(&self, id: &str) -> AppResult<bool> {
        Ok(self.events.write().await.remove(id).is_some())
    }
}
