//! Sign Out Use Case
//!
//! Deletes persisted refresh sessions. Access tokens already handed out
//! stay valid until they expire; deleting the session only stops new ones
//! from being minted.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Sign out the session behind one refresh token
    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<()> {
        let refresh_token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let session = self
            .session_repo
            .find_session(refresh_token)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        self.session_repo.delete_session(refresh_token).await?;

        tracing::info!(user_id = %session.user_id, "User signed out");
        Ok(())
    }

    /// Sign out every session of the authenticated user
    pub async fn execute_all(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = self.session_repo.delete_all_sessions(user_id).await?;

        tracing::info!(
            user_id = %user_id,
            deleted = deleted,
            "User signed out from all sessions"
        );

        Ok(deleted)
    }
}
