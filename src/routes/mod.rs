use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, Config, SecurityHeadersLayer};
use crate::handlers::events::{
    create_event, delete_event, filter_events_by_tags, get_event, list_events,
    list_events_by_club, list_featured_events, list_ongoing_events, list_past_events,
    update_event,
};
use crate::handlers::health_check;
use crate::handlers::pages::events_page;
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(event_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SecurityHeadersLayer::new(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}

// Static segments take priority over `:event_id`.
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/", get(list_events).post(create_event))
        .route("/api/events/club/:club_id", get(list_events_by_club))
        .route("/api/events/ongoing", get(list_ongoing_events))
        .route("/api/events/past", get(list_past_events))
        .route("/api/events/featured", get(list_featured_events))
        .route("/api/events/filter-by-tags", get(filter_events_by_tags))
        .route("/api/events/events", get(events_page))
        .route(
            "/api/events/:event_id",
            get(get_event).put(update_event).delete(delete_event),
        )
}
