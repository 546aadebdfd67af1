//! In-process backend for tests. The purchase procedure runs under a single
//! lock so it has the same all-or-nothing semantics as the SQL function.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    reason, BackendError, BackendResult, EventsTable, IdentityService, PurchaseProcedure,
    PurchaseReceipt, TicketsTable,
};
use crate::models::{Event, NewEvent, QrPayload, Ticket, User, UserRole};

struct StoredTicket {
    ticket: Ticket,
    idempotency_key: Option<Uuid>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    roles: HashMap<Uuid, UserRole>,
    sessions: HashMap<String, Uuid>,
    events: Vec<Event>,
    tickets: Vec<StoredTicket>,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
    purchase_delay: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with an active session token.
    pub fn add_user(&self, name: &str, token: &str, role: Option<UserRole>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@campus.test", name.to_lowercase()),
        };
        let mut tables = self.tables.lock().unwrap();
        tables.users.insert(user.id, user.clone());
        tables.sessions.insert(token.to_string(), user.id);
        if let Some(role) = role {
            tables.roles.insert(user.id, role);
        }
        user
    }

    pub fn add_event(&self, event: Event) -> Event {
        self.tables.lock().unwrap().events.push(event.clone());
        event
    }

    pub fn seats(&self, event_id: Uuid) -> Option<i32> {
        self.tables
            .lock()
            .unwrap()
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.available_seats)
    }

    pub fn ticket_count(&self) -> usize {
        self.tables.lock().unwrap().tickets.len()
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.tables.lock().unwrap().sessions.contains_key(token)
    }

    /// Number of collaborator calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_purchase_delay(&self, delay: Duration) {
        *self.purchase_delay.lock().unwrap() = Some(delay);
    }

    fn enter(&self) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

fn failure(code: &str, message: &str) -> PurchaseReceipt {
    PurchaseReceipt {
        success: false,
        reason: Some(code.to_string()),
        message: Some(message.to_string()),
        ..PurchaseReceipt::default()
    }
}

fn issued(ticket: &Ticket, message: &str) -> PurchaseReceipt {
    PurchaseReceipt {
        success: true,
        reason: None,
        ticket_id: Some(ticket.id),
        event_id: Some(ticket.event_id),
        qr_code: Some(ticket.qr_code_data.clone()),
        issued_at: Some(ticket.purchased_at),
        message: Some(message.to_string()),
    }
}

#[async_trait]
impl IdentityService for MemoryBackend {
    async fn user_for_token(&self, token: &str) -> BackendResult<Option<User>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .sessions
            .get(token)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn role_of(&self, user_id: Uuid) -> BackendResult<Option<UserRole>> {
        self.enter()?;
        Ok(self.tables.lock().unwrap().roles.get(&user_id).copied())
    }

    async fn revoke(&self, token: &str) -> BackendResult<()> {
        self.enter()?;
        self.tables.lock().unwrap().sessions.remove(token);
        Ok(())
    }
}

#[async_trait]
impl EventsTable for MemoryBackend {
    async fn select_ordered(&self) -> BackendResult<Vec<Event>> {
        self.enter()?;
        let mut events = self.tables.lock().unwrap().events.clone();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
        Ok(events)
    }

    async fn select_by_id(&self, id: Uuid) -> BackendResult<Option<Event>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn insert(
        &self,
        event: &NewEvent,
        organizer_id: Uuid,
        image_url: &str,
    ) -> BackendResult<Event> {
        self.enter()?;
        let created = Event {
            id: Uuid::new_v4(),
            title: event.title.trim().to_string(),
            description: event.description.trim().to_string(),
            date: event.date,
            time: event.time.trim().to_string(),
            location: event.location.trim().to_string(),
            price: event.price,
            image_url: image_url.to_string(),
            available_seats: event.available_seats,
            organizer_id,
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().events.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl PurchaseProcedure for MemoryBackend {
    async fn purchase_ticket(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        idempotency_key: Option<Uuid>,
    ) -> BackendResult<PurchaseReceipt> {
        self.enter()?;
        let delay = *self.purchase_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut tables = self.tables.lock().unwrap();
        let Tables {
            events, tickets, ..
        } = &mut *tables;

        let Some(event) = events.iter_mut().find(|e| e.id == event_id) else {
            return Ok(failure(reason::EVENT_NOT_FOUND, "Event not found"));
        };

        if let Some(key) = idempotency_key {
            let previous = tickets.iter().find(|t| {
                t.ticket.user_id == user_id
                    && t.ticket.event_id == event_id
                    && t.idempotency_key == Some(key)
            });
            if let Some(previous) = previous {
                return Ok(issued(
                    &previous.ticket,
                    "Ticket already issued for this request",
                ));
            }
        }

        if event.available_seats <= 0 {
            return Ok(failure(reason::SOLD_OUT, "This event is sold out"));
        }

        event.available_seats -= 1;
        let ticket_id = Uuid::new_v4();
        let now = Utc::now();
        let ticket = Ticket {
            id: ticket_id,
            event_id,
            user_id,
            purchased_at: now,
            qr_code_data: QrPayload::compose(ticket_id, event_id, user_id, now),
            event: None,
        };
        let receipt = issued(&ticket, "Ticket purchased successfully");
        tickets.push(StoredTicket {
            ticket,
            idempotency_key,
        });

        Ok(receipt)
    }
}

#[async_trait]
impl TicketsTable for MemoryBackend {
    async fn select_for_user(&self, user_id: Uuid) -> BackendResult<Vec<Ticket>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        let mut owned: Vec<Ticket> = tables
            .tickets
            .iter()
            .filter(|t| t.ticket.user_id == user_id)
            .map(|t| {
                let event = tables.events.iter().find(|e| e.id == t.ticket.event_id).cloned();
                t.ticket.clone().with_event(event)
            })
            .collect();
        owned.sort_by(|a, b| b.purchased_at.cmp(&a.purchased_at));
        Ok(owned)
    }
}
