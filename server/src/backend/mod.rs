//! Contracts of the managed backend the storefront delegates to.
//!
//! Persistence, identity and the seat-decrementing purchase all live behind
//! these traits. [`postgres::PgBackend`] is the production adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Event, NewEvent, Ticket, User, UserRole};

pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use postgres::PgBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolves a session token to its user, `None` when unknown or expired.
    async fn user_for_token(&self, token: &str) -> BackendResult<Option<User>>;

    async fn role_of(&self, user_id: Uuid) -> BackendResult<Option<UserRole>>;

    /// Invalidates a session token. Unknown tokens are not an error.
    async fn revoke(&self, token: &str) -> BackendResult<()>;
}

#[async_trait]
pub trait EventsTable: Send + Sync {
    /// All events ordered by date, then start time, ascending.
    async fn select_ordered(&self) -> BackendResult<Vec<Event>>;

    async fn select_by_id(&self, id: Uuid) -> BackendResult<Option<Event>>;

    async fn insert(
        &self,
        event: &NewEvent,
        organizer_id: Uuid,
        image_url: &str,
    ) -> BackendResult<Event>;
}

/// Raw reply of the atomic `purchase_ticket` procedure.
#[derive(Debug, Clone, Default, FromRow)]
pub struct PurchaseReceipt {
    pub success: bool,
    /// Machine-readable failure code, see [`reason`].
    pub reason: Option<String>,
    pub ticket_id: Option<Uuid>,
    /// Event the issued ticket belongs to.
    pub event_id: Option<Uuid>,
    pub qr_code: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

pub mod reason {
    pub const EVENT_NOT_FOUND: &str = "event_not_found";
    pub const SOLD_OUT: &str = "sold_out";
}

#[async_trait]
pub trait PurchaseProcedure: Send + Sync {
    /// Checks seats, decrements the counter and inserts the ticket as one
    /// server-side transaction. With an `idempotency_key` the same user already
    /// used for this event the previously issued ticket is returned instead; the
    /// key is scoped to the event, so reusing it elsewhere buys normally.
    async fn purchase_ticket(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        idempotency_key: Option<Uuid>,
    ) -> BackendResult<PurchaseReceipt>;
}

#[async_trait]
pub trait TicketsTable: Send + Sync {
    /// The user's tickets with their event joined, newest purchase first.
    async fn select_for_user(&self, user_id: Uuid) -> BackendResult<Vec<Ticket>>;
}

/// A backend serving every collaborator contract.
pub trait Backend: IdentityService + EventsTable + PurchaseProcedure + TicketsTable {}

impl<T> Backend for T where T: IdentityService + EventsTable + PurchaseProcedure + TicketsTable {}
