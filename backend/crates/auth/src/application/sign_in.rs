//! Sign In Use Case
//!
//! Authenticates a user by email and password and establishes a session.
//! Unknown email, password-less account and wrong password all end in the
//! same `InvalidCredentials`, each after one Argon2 verification.

use std::sync::Arc;

use platform::client::ClientMetadata;
use platform::password::PasswordHasher;

use crate::application::session::{LoginOutput, establish_session};
use crate::application::token::TokenService;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            hasher,
            tokens,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        client: &ClientMetadata,
    ) -> AuthResult<LoginOutput> {
        let mut errors = Vec::new();
        if input.email.trim().is_empty() {
            errors.push("email is required".to_string());
        }
        if input.password.is_empty() {
            errors.push("password is required".to_string());
        }
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        // Login never applies the registration policy
        let raw_password = RawPassword::for_login(input.password);

        let user = match Email::new(input.email) {
            Ok(email) => self.user_repo.find_by_email(&email).await?,
            Err(_) => None,
        };

        let verified = match user.as_ref().and_then(|u| u.password_hash.as_ref()) {
            Some(hash) => hash.verify(&raw_password, &self.hasher),
            None => self.hasher.verify_dummy(raw_password.inner()),
        };

        let user = match user {
            Some(user) if verified => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let session =
            establish_session(self.session_repo.as_ref(), &self.tokens, &user, client).await?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(LoginOutput { user, session })
    }
}
