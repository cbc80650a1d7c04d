use std::sync::Arc;

use crate::store::EventsStore;
use crate::views::Templates;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventsStore>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(events: Arc<dyn EventsStore>, templates: Arc<Templates>) -> Self {
        Self { events, templates }
    }
}
