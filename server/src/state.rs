use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::FromRef;
use uuid::Uuid;

use crate::backend::Backend;
use crate::catalog::EventCatalog;
use crate::config::Config;
use crate::purchase::PurchaseOrchestrator;
use crate::session::SessionStore;
use crate::tickets::TicketCollection;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub catalog: EventCatalog,
    pub orchestrator: PurchaseOrchestrator,
    pub tickets: TicketCollection,
    pub pending: PendingPurchases,
}

impl AppState {
    pub fn new<B>(backend: Arc<B>, config: &Config) -> Self
    where
        B: Backend + 'static,
    {
        Self {
            sessions: SessionStore::new(backend.clone()),
            catalog: EventCatalog::new(backend.clone(), config.default_event_image.clone()),
            orchestrator: PurchaseOrchestrator::new(
                backend.clone(),
                Duration::from_millis(config.purchase_timeout_ms),
            ),
            tickets: TicketCollection::new(backend),
            pending: PendingPurchases::default(),
        }
    }
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

/// Purchases currently in flight, keyed by (user, event).
#[derive(Clone, Default)]
pub struct PendingPurchases {
    inner: Arc<Mutex<HashSet<(Uuid, Uuid)>>>,
}

impl PendingPurchases {
    /// Claims the slot for `user_id` buying `event_id`; `None` while another
    /// request for the same pair is still running.
    pub fn claim(&self, user_id: Uuid, event_id: Uuid) -> Option<PendingGuard> {
        let mut pending = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !pending.insert((user_id, event_id)) {
            return None;
        }
        Some(PendingGuard {
            inner: self.inner.clone(),
            key: (user_id, event_id),
        })
    }
}

/// Releases its slot on drop, including when the request is abandoned.
pub struct PendingGuard {
    inner: Arc<Mutex<HashSet<(Uuid, Uuid)>>>,
    key: (Uuid, Uuid),
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let mut pending = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        pending.remove(&self.key);
    }
}
