use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;
use uuid::Uuid;

use crate::session::Session;
use crate::state::AppState;
use crate::tickets::{partition_by_date, ListingNotice};
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

fn idempotency_key(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(raw) = headers.get(IDEMPOTENCY_KEY) else {
        return Ok(None);
    };

    raw.to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::invalid("Idempotency-Key", "Idempotency-Key must be a UUID"))
}

pub async fn purchase_ticket(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let key = idempotency_key(&headers)?;

    // Anonymous callers go straight to the orchestrator, which rejects them
    // without touching the backend.
    let _guard = match session.current_user() {
        Some(user) => Some(state.pending.claim(user.id, event_id).ok_or_else(|| {
            AppError::Conflict("A purchase for this event is already in progress".to_string())
        })?),
        None => None,
    };

    let ticket = state
        .orchestrator
        .purchase(event_id, session.current_user(), key)
        .await?;

    let event = state.catalog.get_event(ticket.event_id).await;
    Ok(created(ticket.with_event(event), "Ticket purchased successfully"))
}

pub async fn my_tickets(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let listing = state.tickets.list_tickets_for_current_user(&session).await;

    let message = match listing.notice {
        Some(ListingNotice::NotAuthenticated) => {
            return Err(AppError::AuthError(
                "Please log in to view your tickets".to_string(),
            ));
        }
        Some(ListingNotice::Unavailable) => "Your tickets could not be loaded right now",
        None if listing.tickets.is_empty() => "You haven't purchased any tickets yet.",
        None => "Tickets loaded",
    };

    let today = Utc::now().date_naive();
    Ok(success(partition_by_date(listing.tickets, today), message))
}
