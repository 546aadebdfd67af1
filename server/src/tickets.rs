//! Ticket Collection Client.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::backend::TicketsTable;
use crate::models::Ticket;
use crate::session::Session;

/// Why a listing came back empty without an error being raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingNotice {
    NotAuthenticated,
    Unavailable,
}

#[derive(Debug, Default)]
pub struct TicketListing {
    pub tickets: Vec<Ticket>,
    pub notice: Option<ListingNotice>,
}

#[derive(Debug, Default, Serialize)]
pub struct PartitionedTickets {
    pub upcoming: Vec<Ticket>,
    pub past: Vec<Ticket>,
}

#[derive(Clone)]
pub struct TicketCollection {
    tickets: Arc<dyn TicketsTable>,
}

impl TicketCollection {
    pub fn new(tickets: Arc<dyn TicketsTable>) -> Self {
        Self { tickets }
    }

    /// Tickets of the session's user, newest purchase first.
    pub async fn list_tickets_for_current_user(&self, session: &Session) -> TicketListing {
        let Some(user) = session.current_user() else {
            tracing::info!("Ticket listing requested without a session");
            return TicketListing {
                tickets: Vec::new(),
                notice: Some(ListingNotice::NotAuthenticated),
            };
        };

        match self.tickets.select_for_user(user.id).await {
            Ok(tickets) => TicketListing {
                tickets,
                notice: None,
            },
            Err(e) => {
                tracing::error!(error = %e, user_id = %user.id, "Failed to list tickets");
                TicketListing {
                    tickets: Vec::new(),
                    notice: Some(ListingNotice::Unavailable),
                }
            }
        }
    }
}

/// Splits tickets by event date: strictly before `today` is past, anything
/// else upcoming. Tickets without an embedded event land in neither.
pub fn partition_by_date(tickets: Vec<Ticket>, today: NaiveDate) -> PartitionedTickets {
    let mut partitioned = PartitionedTickets::default();
    for ticket in tickets {
        let Some(date) = ticket.event.as_ref().map(|e| e.date) else {
            continue;
        };
        if date < today {
            partitioned.past.push(ticket);
        } else {
            partitioned.upcoming.push(ticket);
        }
    }
    partitioned
}
