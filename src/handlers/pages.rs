use axum::{extract::State, response::Html};

use crate::state::AppState;
use crate::utils::error::AppResult;

/// GET /api/events/events - HTML listing of every event
pub async fn events_page(State(state): State<AppState>) -> AppResult<Html<String>> {
    let events = state.events.find_all().await?;
    Ok(Html(state.templates.render_events(&events)?))
}
