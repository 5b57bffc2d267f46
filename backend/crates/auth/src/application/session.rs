//! Session Establishment
//!
//! The tail shared by every successful login path: issue an access token,
//! issue a refresh token, persist the refresh token. There is no transaction
//! around these steps. A refresh token that was signed but never stored is
//! rejected by the refresh flow's lookup, so a failure in between fails
//! closed.

use platform::client::ClientMetadata;

use crate::application::token::{IssuedAccess, IssuedRefresh, TokenService};
use crate::domain::entity::{session::RefreshSession, user::User};
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

/// Tokens handed to the client after a successful login
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub access: IssuedAccess,
    pub refresh: IssuedRefresh,
}

/// Successful login: the user plus their new session
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub user: User,
    pub session: EstablishedSession,
}

pub async fn establish_session<S>(
    sessions: &S,
    tokens: &TokenService,
    user: &User,
    client: &ClientMetadata,
) -> AuthResult<EstablishedSession>
where
    S: SessionRepository,
{
    let access = tokens.issue_access(&user.user_id, user.role)?;
    let refresh = tokens.issue_refresh(&user.user_id, user.role)?;

    let record = RefreshSession::new(
        refresh.token.clone(),
        user.user_id,
        refresh.issued_at,
        refresh.expires_at,
        client.ip_string(),
        client.user_agent.clone(),
    );

    sessions.create_session(&record).await.map_err(|e| {
        tracing::error!(user_id = %user.user_id, error = %e, "Failed to persist refresh session");
        AuthError::SessionCreateFailed(e.to_string())
    })?;

    Ok(EstablishedSession { access, refresh })
}
