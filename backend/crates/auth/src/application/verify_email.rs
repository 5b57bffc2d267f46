//! Verify Email Use Case

use std::sync::Arc;

use crate::application::token::TokenService;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct VerifyEmailUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> VerifyEmailUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    /// Marks the address in the token as verified. A token for an address
    /// the user no longer has is rejected.
    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        let claims = self.tokens.validate_verification(token)?;

        let mut user = self
            .user_repo
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if user.email.as_ref() != Some(&claims.email) {
            return Err(AuthError::InvalidToken);
        }

        if !user.email_verified {
            user.verify_email();
            self.user_repo.update(&user).await?;
            tracing::info!(user_id = %user.user_id, "Email verified");
        }

        Ok(())
    }
}
