//! Complete Registration Use Case
//!
//! Second half of the OAuth-without-account path. The temporary token
//! carries the federated profile; the request adds the member fields. This
//! is the only place a federated user row is created.

use std::sync::Arc;

use chrono::NaiveDate;
use platform::client::ClientMetadata;

use crate::application::session::{LoginOutput, establish_session};
use crate::application::token::TokenService;
use crate::domain::entity::{user::User, user_profile::UserProfile};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    membership::{Branch, Position},
};
use crate::error::{AuthError, AuthResult};

pub struct CompleteRegistrationInput {
    pub temp_token: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<Position>,
    pub branch: Option<Branch>,
    pub graduation_date: Option<NaiveDate>,
}

/// Member fields after validation
#[derive(Debug)]
struct MemberFields {
    first_name: String,
    last_name: String,
    position: Position,
    branch: Branch,
    graduation_date: NaiveDate,
}

pub struct CompleteRegistrationUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    tokens: Arc<TokenService>,
}

impl<U, S> CompleteRegistrationUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, tokens: Arc<TokenService>) -> Self {
        Self {
            user_repo,
            session_repo,
            tokens,
        }
    }

    pub async fn execute(
        &self,
        input: CompleteRegistrationInput,
        client: &ClientMetadata,
    ) -> AuthResult<LoginOutput> {
        if input.temp_token.is_empty() {
            return Err(AuthError::Validation(vec![
                "temp_token is required".to_string(),
            ]));
        }
        let profile = self.tokens.validate_temporary(&input.temp_token)?;
        let fields = validate(&input)?;

        let identity = profile.identity();
        if self.user_repo.exists_by_identity(&identity).await? {
            return Err(AuthError::ProviderAccountExists);
        }

        // Providers are not trusted to send a well-formed address
        let email = profile.email.as_deref().and_then(|e| Email::new(e).ok());

        let mut user_profile = UserProfile::from_display_name(&profile.name, profile.avatar_url);
        user_profile.set_name(Some(fields.first_name), Some(fields.last_name));
        user_profile.position = Some(fields.position);
        user_profile.branch = Some(fields.branch);
        user_profile.graduation_date = Some(fields.graduation_date);

        let mut user = User::from_federation(identity, email, user_profile);
        user.mark_onboarded();

        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            provider = %profile.provider,
            "Federated registration completed"
        );

        let session =
            establish_session(self.session_repo.as_ref(), &self.tokens, &user, client).await?;

        Ok(LoginOutput { user, session })
    }
}

fn validate(input: &CompleteRegistrationInput) -> AuthResult<MemberFields> {
    let mut errors = Vec::new();

    let first_name = required_text(&input.first_name, "first_name", &mut errors);
    let last_name = required_text(&input.last_name, "last_name", &mut errors);
    if input.position.is_none() {
        errors.push("position is required".to_string());
    }
    if input.branch.is_none() {
        errors.push("branch is required".to_string());
    }
    if input.graduation_date.is_none() {
        errors.push("graduation_date is required".to_string());
    }

    match (
        first_name,
        last_name,
        input.position,
        input.branch,
        input.graduation_date,
    ) {
        (Some(first_name), Some(last_name), Some(position), Some(branch), Some(graduation_date))
            if errors.is_empty() =>
        {
            Ok(MemberFields {
                first_name,
                last_name,
                position,
                branch,
                graduation_date,
            })
        }
        _ => Err(AuthError::Validation(errors)),
    }
}

fn required_text(value: &Option<String>, field: &str, errors: &mut Vec<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(format!("{field} is required"));
            None
        }
    }
}
