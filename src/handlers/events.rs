//! JSON handlers for `/api/events`.
//!
//! Each handler makes a single store call, except update and delete which
//! look the event up first so a missing id yields 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Query;
use chrono::Utc;
use serde::Deserialize;

use crate::extract::ValidatedJson;
use crate::models::{normalize_tags, Event, EventPayload};
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::list_or_no_content;

/// Query string for `/filter-by-tags`. Accepts repeated `tags` keys as
/// well as comma-separated values.
#[derive(Debug, Default, Deserialize)]
pub struct TagFilter {
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TagFilter {
    pub fn normalized(&self) -> Vec<String> {
        normalize_tags(self.tags.iter().flat_map(|value| value.split(',')))
    }
}

/// GET /api/events
pub async fn list_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.events.find_all().await?))
}

/// GET /api/events/club/:club_id
pub async fn list_events_by_club(
    State(state): State<AppState>,
    Path(club_id): Path<String>,
) -> AppResult<Response> {
    let events = state.events.find_by_club(&club_id).await?;
    Ok(list_or_no_content(events))
}

/// GET /api/events/ongoing
pub async fn list_ongoing_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let now = Utc::now();
    Ok(Json(state.events.find_ongoing(now).await?))
}

/// GET /api/events/past
pub async fn list_past_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    let now = Utc::now();
    Ok(Json(state.events.find_past(now).await?))
}

/// GET /api/events/featured
pub async fn list_featured_events(State(state): State<AppState>) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(state.events.find_featured().await?))
}

/// GET /api/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<Response> {
    match state.events.find_by_id(&event_id).await? {
        Some(event) => Ok(Json(event).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// POST /api/events - Create or overwrite an event
pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<EventPayload>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let id = payload.resolve_id();
    let saved = state.events.save(payload.into_upsert(id)).await?;

    tracing::info!(event_id = %saved.id, club_id = %saved.club_id, "Event saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /api/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<EventPayload>,
) -> AppResult<Response> {
    if state.events.find_by_id(&event_id).await?.is_none() {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }

    // The path id wins over whatever the body says.
    let saved = state.events.save(payload.into_upsert(event_id)).await?;

    tracing::info!(event_id = %saved.id, "Event updated");
    Ok(Json(saved).into_response())
}

/// DELETE /api/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<StatusCode> {
    if state.events.find_by_id(&event_id).await?.is_none() {
        return Ok(StatusCode::NOT_FOUND);
    }

    // Someone else may have removed it since the lookup.
    if !state.events.delete_by_id(&event_id).await? {
        return Ok(StatusCode::NOT_FOUND);
    }

    tracing::info!(event_id = %event_id, "Event deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/events/filter-by-tags?tags=a&tags=b
pub async fn filter_events_by_tags(
    State(state): State<AppState>,
    Query(filter): Query<TagFilter>,
) -> AppResult<Response> {
    let tags = filter.normalized();
    if tags.is_empty() {
        return Err(AppError::ValidationError(
            "at least one tag must be supplied".to_string(),
        ));
    }

    let events = state.events.find_by_tags(&tags).await?;
    Ok(list_or_no_content(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration};

    use crate::models::UpsertEvent;
    use crate::store::{EventsStore, InMemoryEventsStore};
    use crate::views::Templates;

    /// Finds events normally but reports every delete as a miss, as if a
    /// concurrent request removed the row first.
    #[derive(Default)]
    struct LostDeleteStore {
        inner: InMemoryEventsStore,
    }

    #[async_trait]
    impl EventsStore for LostDeleteStore {
        async fn find_all(&self) -> AppResult<Vec<Event>> {
            self.inner.find_all().await
        }

        async fn find_by_id(&self, id: &str) -> AppResult<Option<Event>> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_club(&self, club_id: &str) -> AppResult<Vec<Event>> {
            self.inner.find_by_club(club_id).await
        }

        async fn find_ongoing(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>> {
            self.inner.find_ongoing(now).await
        }

        async fn find_past(&self, now: DateTime<Utc>) -> AppResult<Vec<Event>> {
            self.inner.find_past(now).await
        }

        async fn find_featured(&self) -> AppResult<Vec<Event>> {
            self.inner.find_featured().await
        }

        async fn find_by_tags(&self, tags: &[String]) -> AppResult<Vec<Event>> {
            self.inner.find_by_tags(tags).await
        }

        async fn save(&self, event: UpsertEvent) -> AppResult<Event> {
            self.inner.save(event).await
        }

        async fn delete_by_id(&self, _id: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_delete_reports_not_found_when_row_vanished() {
        let store = Arc::new(LostDeleteStore::default());
        let now = Utc::now();
        store
            .save(UpsertEvent {
                id: "E1".to_string(),
                club_id: "c1".to_string(),
                title: "Quiz night".to_string(),
                description: None,
                location: None,
                start_time: now,
                end_time: now + Duration::hours(1),
                tags: vec![],
                featured: false,
            })
            .await
            .unwrap();

        let state = AppState::new(store, Arc::new(Templates::new().unwrap()));
        let status = delete_event(State(state), Path("E1".to_string()))
            .await
            .unwrap();

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_tag_filter_splits_and_dedupes() {
        let filter = TagFilter {
            tags: vec!["music, art".to_string(), "music".to_string(), ",".to_string()],
        };
        assert_eq!(filter.normalized(), vec!["art".to_string(), "music".to_string()]);
    }

    #[test]
    fn test_tag_filter_empty() {
        assert!(TagFilter::default().normalized().is_empty());
    }
}
