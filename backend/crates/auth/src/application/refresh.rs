//! Refresh Use Case
//!
//! Mints a new access token from a refresh token. Both checks are required:
//! the signature (refresh secret) and a persisted session row with the same
//! token. The refresh token is not rotated.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::{AuthConfig, RoleSource};
use crate::application::token::{IssuedAccess, TokenService};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

pub struct RefreshUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    tokens: Arc<TokenService>,
    config: Arc<AuthConfig>,
}

impl<U, S> RefreshUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        tokens: Arc<TokenService>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<IssuedAccess> {
        let refresh_token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingRefreshToken)?;

        let claims = self.tokens.validate_refresh(refresh_token)?;

        // Signed but unknown: logged out, revoked, or never persisted
        let session = self
            .session_repo
            .find_session(refresh_token)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.user_id != claims.user_id {
            tracing::warn!(
                claims_user_id = %claims.user_id,
                session_user_id = %session.user_id,
                "Refresh token claims do not match the stored session"
            );
            return Err(AuthError::InvalidToken);
        }

        if session.is_expired_at(Utc::now()) {
            return Err(AuthError::SessionExpired);
        }

        let role = match self.config.refresh_role_source {
            RoleSource::Claims => claims.role,
            RoleSource::Store => {
                self.user_repo
                    .find_by_id(&claims.user_id)
                    .await?
                    .ok_or(AuthError::InvalidToken)?
                    .role
            }
        };

        let access = self.tokens.issue_access(&claims.user_id, role)?;

        tracing::debug!(user_id = %claims.user_id, "Access token refreshed");

        Ok(access)
    }
}
