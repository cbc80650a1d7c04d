pub mod event;

pub use event::{normalize_tags, Event, EventPayload, UpsertEvent};
