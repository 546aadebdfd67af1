//! Session Store: the authenticated identity for one request.
//!
//! A [`Session`] is opened from the bearer token on every request and passed
//! explicitly to the components that need identity. Nothing is held globally;
//! logout is the teardown that revokes the token upstream.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::backend::IdentityService;
use crate::models::{User, UserRole};
use crate::utils::error::AppError;

#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&User, AppError> {
        self.current_user()
            .ok_or_else(|| AppError::AuthError("Please log in to continue".to_string()))
    }
}

#[derive(Clone)]
pub struct SessionStore {
    identity: Arc<dyn IdentityService>,
}

impl SessionStore {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Resolves `token` through the identity service. A missing or unknown
    /// token yields an anonymous session.
    pub async fn open(&self, token: Option<&str>) -> Result<Session, AppError> {
        let Some(token) = token else {
            return Ok(Session::anonymous());
        };

        match self.identity.user_for_token(token).await? {
            Some(user) => {
                tracing::debug!(user_id = %user.id, "Session resolved");
                Ok(Session {
                    token: Some(token.to_string()),
                    user: Some(user),
                })
            }
            None => {
                tracing::debug!("Unknown or expired session token");
                Ok(Session::anonymous())
            }
        }
    }

    /// Ends the session upstream. Anonymous sessions are a no-op.
    pub async fn close(&self, session: Session) -> Result<(), AppError> {
        if let Some(token) = session.token.as_deref() {
            self.identity.revoke(token).await?;
            if let Some(user) = session.current_user() {
                tracing::info!(user_id = %user.id, "Session closed");
            }
        }
        Ok(())
    }

    pub async fn role(&self, session: &Session) -> Result<Option<UserRole>, AppError> {
        match session.current_user() {
            Some(user) => Ok(self.identity.role_of(user.id).await?),
            None => Ok(None),
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);
        store.open(bearer_token(&parts.headers)).await
    }
}
