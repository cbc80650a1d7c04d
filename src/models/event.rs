use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use validator::{Validate, ValidationError};

/// A persisted club event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: String,
    pub club_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_ongoing(&self, now: DateTime<Utc>) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }

    pub fn has_any_tag(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// Segments under `/api/events` that are routed before `:event_id`; an event
/// stored under one of these ids could never be fetched again.
pub const RESERVED_EVENT_IDS: &[&str] = &["ongoing", "past", "featured", "events", "filter-by-tags"];

/// Client-supplied event body for create and update requests.
///
/// Server-managed timestamps are not part of the payload; unknown fields
/// are ignored.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_event_window"))]
pub struct EventPayload {
    #[validate(custom(function = "validate_event_id"))]
    pub id: Option<String>,
    #[validate(
        length(min = 1, message = "club_id is required"),
        custom(function = "validate_not_blank", message = "club_id must not be blank")
    )]
    pub club_id: String,
    #[validate(
        length(min = 1, max = 200, message = "title must be between 1-200 characters"),
        custom(function = "validate_not_blank", message = "title must not be blank")
    )]
    pub title: String,
    #[validate(length(max = 5000, message = "description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

// An empty id asks the server to assign one; anything else is kept verbatim.
fn validate_event_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Ok(());
    }
    if id.trim() != id {
        return Err(ValidationError::new("whitespace")
            .with_message("id must not have leading or trailing whitespace".into()));
    }
    if id.contains('/') {
        return Err(ValidationError::new("slash").with_message("id must not contain '/'".into()));
    }
    if RESERVED_EVENT_IDS.contains(&id) {
        return Err(ValidationError::new("reserved")
            .with_message(format!("id '{}' is reserved", id).into()));
    }
    Ok(())
}

fn validate_event_window(payload: &EventPayload) -> Result<(), ValidationError> {
    if payload.end_time < payload.start_time {
        return Err(ValidationError::new("window")
            .with_message("end_time must not be before start_time".into()));
    }
    Ok(())
}

impl EventPayload {
    /// The id carried by the payload, or a fresh UUID when it is absent or empty.
    pub fn resolve_id(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        }
    }

    /// Binds the payload to `id`, discarding whatever id the body carried.
    pub fn into_upsert(self, id: String) -> UpsertEvent {
        UpsertEvent {
            id,
            club_id: self.club_id,
            title: self.title,
            description: self.description,
            location: self.location,
            start_time: self.start_time,
            end_time: self.end_time,
            tags: normalize_tags(self.tags),
            featured: self.featured,
        }
    }
}

/// An event ready to be written by a store, keyed by a settled id.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertEvent {
    pub id: String,
    pub club_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub tags: Vec<String>,
    pub featured: bool,
}

impl UpsertEvent {
    pub fn into_event(self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Event {
        Event {
            id: self.id,
            club_id: self.club_id,
            title: self.title,
            description: self.description,
            location: self.location,
            start_time: self.start_time,
            end_time: self.end_time,
            tags: self.tags,
            featured: self.featured,
            created_at,
            updated_at,
        }
    }
}

/// Trims, drops blanks, dedupes and sorts a list of tags.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payload() -> EventPayload {
        let start = Utc::now();
        EventPayload {
            id: None,
            club_id: "chess".to_string(),
            title: "Blitz night".to_string(),
            description: None,
            location: Some("Room 101".to_string()),
            start_time: start,
            end_time: start + Duration::hours(2),
            tags: vec![],
            featured: false,
        }
    }

    #[test]
    fn test_resolve_id_keeps_supplied_id() {
        let mut p = payload();
        p.id = Some("evt-1".to_string());
        assert_eq!(p.resolve_id(), "evt-1");
    }

    #[test]
    fn test_resolve_id_generates_for_missing_or_empty() {
        let mut p = payload();
        assert!(Uuid::parse_str(&p.resolve_id()).is_ok());

        p.id = Some(String::new());
        assert!(Uuid::parse_str(&p.resolve_id()).is_ok());
    }

    #[test]
    fn test_into_upsert_overrides_body_id() {
        let mut p = payload();
        p.id = Some("E2".to_string());
        let upsert = p.into_upsert("E1".to_string());
        assert_eq!(upsert.id, "E1");
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![" music", "sports", "", "music", "  "]);
        assert_eq!(tags, vec!["music".to_string(), "sports".to_string()]);
    }

    #[test]
    fn test_validate_accepts_well_formed_payload() {
        assert!(payload().validate().is_ok());

        let mut p = payload();
        p.id = Some("spring-fair".to_string());
        assert!(p.validate().is_ok());

        p.id = Some(String::new());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut p = payload();
        p.title = "  ".to_string();
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("title"));

        let mut p = payload();
        p.club_id = String::new();
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("club_id"));
    }

    #[test]
    fn test_validate_rejects_inverted_window() {
        let mut p = payload();
        p.end_time = p.start_time - Duration::minutes(1);
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("__all__"));
    }

    #[test]
    fn test_validate_rejects_long_text() {
        let mut p = payload();
        p.title = "x".repeat(201);
        assert!(p.validate().is_err());

        let mut p = payload();
        p.description = Some("x".repeat(5001));
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_route_segment_ids() {
        for reserved in RESERVED_EVENT_IDS {
            let mut p = payload();
            p.id = Some(reserved.to_string());
            let errors = p.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("id"), "{} should be rejected", reserved);
        }
    }

    #[test]
    fn test_validate_rejects_padded_or_nested_ids() {
        let mut p = payload();
        p.id = Some(" E1 ".to_string());
        assert!(p.validate().is_err());

        p.id = Some("   ".to_string());
        assert!(p.validate().is_err());

        p.id = Some("a/b".to_string());
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_time_window_classification() {
        let now = Utc::now();
        let mut p = payload();
        p.start_time = now - Duration::hours(1);
        p.end_time = now + Duration::hours(1);
        let ongoing = p.clone().into_upsert("a".into()).into_event(now, now);
        assert!(ongoing.is_ongoing(now));
        assert!(!ongoing.is_past(now));

        p.start_time = now - Duration::hours(3);
        p.end_time = now - Duration::hours(2);
        let past = p.into_upsert("b".into()).into_event(now, now);
        assert!(past.is_past(now));
        assert!(!past.is_ongoing(now));
    }

    #[test]
    fn test_payload_deserializes_with_defaults() {
        let json = r#"{
            "club_id": "c1",
            "title": "Open mic",
            "start_time": "2024-05-01T18:00:00Z",
            "end_time": "2024-05-01T20:00:00Z",
            "created_at": "ignored"
        }"#;
        let p: EventPayload = serde_json::from_str(json).unwrap();
        assert!(p.id.is_none());
        assert!(p.tags.is_empty());
        assert!(!p.featured);
    }
}
