//! Server-rendered pages.

use minijinja::{context, Environment};
use serde::Serialize;

use crate::models::Event;
use crate::utils::error::{AppError, AppResult};

const EVENTS_TEMPLATE_NAME: &str = "events.html";
const EVENTS_TEMPLATE: &str = include_str!("../../templates/events.html");
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Compiled page templates. Names ending in `.html` are auto-escaped.
pub struct Templates {
    env: Environment<'static>,
}

#[derive(Serialize)]
struct EventRow<'a> {
    id: &'a str,
    title: &'a str,
    club_id: &'a str,
    starts: String,
    ends: String,
    location: Option<&'a str>,
    tags: &'a [String],
    featured: bool,
}

impl<'a> From<&'a Event> for EventRow<'a> {
    fn from(event: &'a Event) -> Self {
        Self {
            id: &event.id,
            title: &event.title,
            club_id: &event.club_id,
            starts: event.start_time.format(TIME_FORMAT).to_string(),
            ends: event.end_time.format(TIME_FORMAT).to_string(),
            location: event.location.as_deref(),
            tags: &event.tags,
            featured: event.featured,
        }
    }
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template(EVENTS_TEMPLATE_NAME, EVENTS_TEMPLATE)?;
        Ok(Self { env })
    }

    pub fn render_events(&self, events: &[Event]) -> AppResult<String> {
        let rows: Vec<EventRow<'_>> = events.iter().map(EventRow::from).collect();

        self.env
            .get_template(EVENTS_TEMPLATE_NAME)
            .and_then(|template| template.render(context! { events => rows }))
            .map_err(|e| AppError::InternalServerError(format!("Failed to render events page: {}", e)))
    }
}
