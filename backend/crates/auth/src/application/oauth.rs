//! OAuth Use Cases
//!
//! Initiation hands back the provider consent URL together with a fresh
//! `state` the caller must keep (the presentation layer puts it in a
//! short-lived cookie). The callback checks that state, resolves the
//! federated profile and either logs an existing account in or hands back
//! a temporary registration token. The callback never writes a user row.

use std::sync::Arc;

use platform::client::ClientMetadata;
use platform::crypto::{constant_time_eq, random_token};

use crate::application::session::{LoginOutput, establish_session};
use crate::application::token::TokenService;
use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::domain::federation::FederationResolver;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::oauth_provider::OAuthProvider;
use crate::error::{AuthError, AuthResult};

/// Bytes of entropy in the anti-CSRF state
const STATE_BYTES: usize = 32;

/// Where to send the browser, and the state to remember
#[derive(Debug, Clone)]
pub struct OAuthInitiation {
    pub provider: OAuthProvider,
    pub authorization_url: String,
    pub state: String,
}

/// Callback query plus the state remembered at initiation
pub struct OAuthCallbackInput {
    pub provider: String,
    pub code: Option<String>,
    pub state: Option<String>,
    pub expected_state: Option<String>,
}

#[derive(Debug)]
pub enum OAuthCallbackOutcome {
    /// The federated identity already has an account
    Authenticated(LoginOutput),
    /// No account yet; finish with complete-registration
    RegistrationRequired {
        temp_token: String,
        profile: OAuthProfile,
    },
}

/// OAuth use case
pub struct OAuthUseCase<U, S, F>
where
    U: UserRepository,
    S: SessionRepository,
    F: FederationResolver,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    federation: Arc<F>,
    tokens: Arc<TokenService>,
}

impl<U, S, F> OAuthUseCase<U, S, F>
where
    U: UserRepository,
    S: SessionRepository,
    F: FederationResolver,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        federation: Arc<F>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            federation,
            tokens,
        }
    }

    pub fn initiate(&self, provider: &str) -> AuthResult<OAuthInitiation> {
        let provider: OAuthProvider = provider.parse()?;
        let state = random_token(STATE_BYTES);
        let authorization_url = self.federation.authorization_url(provider, &state)?;

        Ok(OAuthInitiation {
            provider,
            authorization_url,
            state,
        })
    }

    pub async fn callback(
        &self,
        input: OAuthCallbackInput,
        client: &ClientMetadata,
    ) -> AuthResult<OAuthCallbackOutcome> {
        let provider: OAuthProvider = input.provider.parse()?;

        let state = input
            .state
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingOAuthState)?;
        let state_matches = input
            .expected_state
            .is_some_and(|expected| constant_time_eq(expected.as_bytes(), state.as_bytes()));
        if !state_matches {
            return Err(AuthError::InvalidOAuthState);
        }

        let code = input
            .code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AuthError::BadRequest("Missing code parameter".to_string()))?;

        let profile = self
            .federation
            .exchange_and_fetch_profile(provider, &code)
            .await?;

        let identity = profile.identity();
        match self.user_repo.find_by_identity(&identity).await? {
            Some(user) => {
                let session =
                    establish_session(self.session_repo.as_ref(), &self.tokens, &user, client)
                        .await?;
                tracing::info!(user_id = %user.user_id, provider = %provider, "User signed in via OAuth");
                Ok(OAuthCallbackOutcome::Authenticated(LoginOutput { user, session }))
            }
            None => {
                let temp_token = self.tokens.issue_temporary(&profile)?;
                tracing::info!(provider = %provider, "OAuth identity has no account; registration required");
                Ok(OAuthCallbackOutcome::RegistrationRequired {
                    temp_token,
                    profile,
                })
            }
        }
    }
}
