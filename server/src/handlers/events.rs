use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::NewEvent;
use crate::session::Session;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let query = params.q.unwrap_or_default();
    let events = state.catalog.search(&query).await;
    let message = format!("{} event(s) found", events.len());
    success(events, message)
}

pub async fn featured_events(State(state): State<AppState>) -> Response {
    success(state.catalog.featured().await, "Featured events")
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state.catalog.get_event(event_id).await.ok_or_else(|| {
        AppError::NotFound(
            "The event you're looking for does not exist or has been removed.".to_string(),
        )
    })?;

    Ok(success(event, "Event loaded"))
}

pub async fn create_event(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<NewEvent>,
) -> Result<Response, AppError> {
    let event = state
        .catalog
        .create_event(&state.sessions, &session, form)
        .await?;

    Ok(created(event, "Event created successfully!"))
}
