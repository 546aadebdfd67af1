//! Purchase Orchestrator.
//!
//! A purchase is exactly one call to the backend's atomic `purchase_ticket`
//! procedure. Seat check, decrement and ticket insert happen together on the
//! server, which serializes competing buyers of the same event; nothing here
//! reads the seat counter before writing.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::backend::{reason, PurchaseProcedure, PurchaseReceipt};
use crate::models::{Ticket, User};

const NOT_AUTHENTICATED: &str = "Please log in to purchase tickets";
const EVENT_NOT_FOUND: &str = "Event not found";
const SOLD_OUT: &str = "This event is sold out";
const UNAVAILABLE: &str = "Failed to purchase ticket. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseFailure {
    #[error("Please log in to purchase tickets")]
    NotAuthenticated,

    #[error("{0}")]
    EventNotFound(String),

    #[error("{0}")]
    SoldOut(String),

    #[error("{0}")]
    TransientServiceError(String),
}

impl PurchaseFailure {
    /// Human-readable message, the server's own wording when it sent one.
    pub fn message(&self) -> &str {
        match self {
            PurchaseFailure::NotAuthenticated => NOT_AUTHENTICATED,
            PurchaseFailure::EventNotFound(msg)
            | PurchaseFailure::SoldOut(msg)
            | PurchaseFailure::TransientServiceError(msg) => msg,
        }
    }
}

#[derive(Clone)]
pub struct PurchaseOrchestrator {
    procedure: Arc<dyn PurchaseProcedure>,
    timeout: Duration,
}

impl PurchaseOrchestrator {
    pub fn new(procedure: Arc<dyn PurchaseProcedure>, timeout: Duration) -> Self {
        Self { procedure, timeout }
    }

    /// Buys one ticket for `event_id` as `current_user`.
    ///
    /// Without an `idempotency_key` every successful call issues a new ticket.
    /// The returned ticket carries no event; callers join it via the catalog.
    pub async fn purchase(
        &self,
        event_id: Uuid,
        current_user: Option<&User>,
        idempotency_key: Option<Uuid>,
    ) -> Result<Ticket, PurchaseFailure> {
        let Some(user) = current_user else {
            debug!(event_id = %event_id, "Purchase attempted without a session");
            return Err(PurchaseFailure::NotAuthenticated);
        };

        let call = self
            .procedure
            .purchase_ticket(event_id, user.id, idempotency_key);

        let receipt = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                error!(error = %e, event_id = %event_id, user_id = %user.id, "Purchase call failed");
                return Err(PurchaseFailure::TransientServiceError(UNAVAILABLE.to_string()));
            }
            Err(_) => {
                error!(
                    event_id = %event_id,
                    user_id = %user.id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Purchase call timed out"
                );
                return Err(PurchaseFailure::TransientServiceError(
                    "The ticketing service took too long to respond. Please try again."
                        .to_string(),
                ));
            }
        };

        let outcome = interpret(receipt, event_id, user.id);
        match &outcome {
            Ok(ticket) => {
                info!(ticket_id = %ticket.id, event_id = %event_id, user_id = %user.id, "Ticket purchased")
            }
            Err(PurchaseFailure::SoldOut(_)) => {
                info!(event_id = %event_id, user_id = %user.id, "Purchase rejected: sold out")
            }
            Err(PurchaseFailure::EventNotFound(_)) => {
                info!(event_id = %event_id, "Purchase rejected: unknown event")
            }
            Err(failure) => {
                error!(event_id = %event_id, message = failure.message(), "Purchase failed")
            }
        }
        outcome
    }
}

fn interpret(
    receipt: PurchaseReceipt,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Ticket, PurchaseFailure> {
    let message = receipt.message.filter(|m| !m.trim().is_empty());

    if !receipt.success {
        return Err(match receipt.reason.as_deref() {
            Some(reason::SOLD_OUT) => {
                PurchaseFailure::SoldOut(message.unwrap_or_else(|| SOLD_OUT.to_string()))
            }
            Some(reason::EVENT_NOT_FOUND) => {
                PurchaseFailure::EventNotFound(message.unwrap_or_else(|| EVENT_NOT_FOUND.to_string()))
            }
            _ => PurchaseFailure::TransientServiceError(
                message.unwrap_or_else(|| UNAVAILABLE.to_string()),
            ),
        });
    }

    match (
        receipt.ticket_id,
        receipt.event_id,
        receipt.qr_code,
        receipt.issued_at,
    ) {
        (Some(id), Some(issued_for), Some(qr_code_data), Some(purchased_at))
            if issued_for == event_id =>
        {
            Ok(Ticket {
                id,
                event_id: issued_for,
                user_id,
                purchased_at,
                qr_code_data,
                event: None,
            })
        }
        (_, Some(issued_for), _, _) if issued_for != event_id => {
            error!(requested = %event_id, issued_for = %issued_for, "Receipt names another event");
            Err(PurchaseFailure::TransientServiceError(UNAVAILABLE.to_string()))
        }
        _ => Err(PurchaseFailure::TransientServiceError(
            "The ticketing service returned an incomplete ticket".to_string(),
        )),
    }
}
