use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, security_headers};
use crate::handlers::{account, events, health_check, tickets};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/featured", get(events::featured_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/purchase", post(tickets::purchase_ticket))
        .route("/me", get(account::me))
        .route("/me/tickets", get(tickets::my_tickets))
        .route("/auth/logout", post(account::logout))
        .with_state(state);

    security_headers()
        .apply(api)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}
