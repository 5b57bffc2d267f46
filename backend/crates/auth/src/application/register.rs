//! Register Use Case
//!
//! Creates a credential account. The account starts not onboarded and with
//! an unverified email; a verification token goes to the notifier.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::token::TokenService;
use crate::domain::entity::user::User;
use crate::domain::notifier::VerificationNotifier;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenService>,
    notifier: Arc<dyn VerificationNotifier>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenService>,
        notifier: Arc<dyn VerificationNotifier>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            tokens,
            notifier,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let (email, raw_password) = validate(input)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::UserExists);
        }

        let password_hash = UserPassword::from_raw(&raw_password, &self.hasher)?;
        let user = User::with_credentials(email, password_hash);

        // A concurrent registration can still win the race; the repository
        // maps the unique violation to UserExists.
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, "User registered");

        self.send_verification(&user);

        Ok(user)
    }

    fn send_verification(&self, user: &User) {
        let Some(email) = &user.email else {
            return;
        };

        let token = match self.tokens.issue_verification(&user.user_id, email) {
            Ok(token) => token,
            Err(error) => {
                tracing::error!(
                    user_id = %user.user_id,
                    error = %error,
                    "Verification token not issued"
                );
                return;
            }
        };

        if let Err(error) = self.notifier.notify(email, &token) {
            tracing::warn!(
                user_id = %user.user_id,
                error = %error,
                "Verification notice not sent"
            );
        }
    }
}

/// Collects every field error rather than stopping at the first
fn validate(input: RegisterInput) -> AuthResult<(Email, RawPassword)> {
    let mut errors = Vec::new();

    let email = Email::new(input.email)
        .map_err(|e| errors.push(e.to_string()))
        .ok();

    let password = if input.password.is_empty() {
        errors.push("password is required".to_string());
        None
    } else {
        RawPassword::new(input.password)
            .map_err(|e| errors.push(e.to_string()))
            .ok()
    };

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok((email, password)),
        _ => Err(AuthError::Validation(errors)),
    }
}
