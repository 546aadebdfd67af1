//! Event Catalog Client.
//!
//! Reads never fail outward: a backend fault is logged and surfaces as an
//! empty list or `None` so the caller always has something to render.

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::EventsTable;
use crate::models::{Event, NewEvent, UserRole};
use crate::session::{Session, SessionStore};
use crate::utils::error::AppError;

pub const FEATURED_COUNT: usize = 3;

#[derive(Clone)]
pub struct EventCatalog {
    events: Arc<dyn EventsTable>,
    default_image: String,
}

impl EventCatalog {
    pub fn new(events: Arc<dyn EventsTable>, default_image: impl Into<String>) -> Self {
        Self {
            events,
            default_image: default_image.into(),
        }
    }

    /// All events, soonest first.
    pub async fn list_events(&self) -> Vec<Event> {
        match self.events.select_ordered().await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list events");
                Vec::new()
            }
        }
    }

    pub async fn get_event(&self, id: Uuid) -> Option<Event> {
        match self.events.select_by_id(id).await {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, event_id = %id, "Failed to load event");
                None
            }
        }
    }

    pub async fn search(&self, query: &str) -> Vec<Event> {
        filter_events(self.list_events().await, query)
    }

    pub async fn featured(&self) -> Vec<Event> {
        let mut events = self.list_events().await;
        events.truncate(FEATURED_COUNT);
        events
    }

    /// Creates an event on behalf of an administrator.
    pub async fn create_event(
        &self,
        sessions: &SessionStore,
        session: &Session,
        form: NewEvent,
    ) -> Result<Event, AppError> {
        let organizer = session.require_user()?;
        if sessions.role(session).await? != Some(UserRole::Admin) {
            return Err(AppError::Forbidden(
                "Access denied. Admin privileges required.".to_string(),
            ));
        }

        form.validate()?;

        let image_url = form.image_or(&self.default_image);
        let event = self.events.insert(&form, organizer.id, image_url).await?;
        tracing::info!(event_id = %event.id, organizer_id = %organizer.id, "Event created");

        Ok(event)
    }
}

/// Keeps events whose title, description or location contains `query`,
/// ignoring case. A blank query keeps everything.
pub fn filter_events(events: Vec<Event>, query: &str) -> Vec<Event> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return events;
    }

    events.into_iter().filter(|e| e.matches(&needle)).collect()
}
