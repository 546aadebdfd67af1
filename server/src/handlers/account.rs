use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::models::{User, UserRole};
use crate::session::Session;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

#[derive(Serialize)]
struct Profile {
    user: User,
    role: Option<UserRole>,
}

pub async fn me(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let user = session.require_user()?.clone();
    let role = state.sessions.role(&session).await?;

    Ok(success(Profile { user, role }, "Session active"))
}

pub async fn logout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    state.sessions.close(session).await?;
    Ok(empty_success("Logged out successfully"))
}
