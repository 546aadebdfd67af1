use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Event;

/// An issued ticket. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub purchased_at: DateTime<Utc>,
    pub qr_code_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Event>,
}

impl Ticket {
    pub fn with_event(mut self, event: Option<Event>) -> Self {
        self.event = event;
        self
    }
}

/// Scannable entry payload encoded into the ticket's QR code.
pub struct QrPayload;

impl QrPayload {
    /// `TICKET-{ticket}-EVENT-{event}-USER-{user}-{unix millis}`; the migration's
    /// `purchase_ticket` procedure emits the same shape.
    pub fn compose(
        ticket_id: Uuid,
        event_id: Uuid,
        user_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> String {
        format!(
            "TICKET-{}-EVENT-{}-USER-{}-{}",
            ticket_id,
            event_id,
            user_id,
            issued_at.timestamp_millis()
        )
    }
}
