//! Manage User Use Case
//!
//! Self-service reads and writes on the caller's own account. Authorization
//! is identity equality only: the access-token subject must be the target
//! id. There is no admin override.

use std::sync::Arc;

use crate::domain::entity::{user::User, user_profile::ProfileChanges};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

const MAX_NAME_LENGTH: usize = 100;
const MAX_URL_LENGTH: usize = 2048;
const MAX_BIO_LENGTH: usize = 1000;

pub struct ManageUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ManageUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn get_me(&self, actor: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(actor)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(
        &self,
        actor: &UserId,
        target: &str,
        changes: ProfileChanges,
    ) -> AuthResult<User> {
        let target = authorize(actor, target)?;
        let changes = validate(changes)?;

        let mut user = self
            .user_repo
            .find_by_id(&target)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !changes.is_empty() {
            user.update_profile(changes);
            self.user_repo.update(&user).await?;
            tracing::info!(user_id = %user.user_id, "User profile updated");
        }

        Ok(user)
    }

    /// Deletes the account and every session it owns
    pub async fn delete(&self, actor: &UserId, target: &str) -> AuthResult<()> {
        let target = authorize(actor, target)?;

        if !self.user_repo.delete(&target).await? {
            return Err(AuthError::UserNotFound);
        }

        tracing::info!(user_id = %target, "User deleted");
        Ok(())
    }
}

fn authorize(actor: &UserId, target: &str) -> AuthResult<UserId> {
    match UserId::parse_str(target) {
        Ok(target) if target == *actor => Ok(target),
        _ => {
            tracing::warn!(actor = %actor, "Attempt to modify another user");
            Err(AuthError::Forbidden)
        }
    }
}

fn validate(mut changes: ProfileChanges) -> AuthResult<ProfileChanges> {
    let mut errors = Vec::new();

    for (field, value, max) in [
        ("first_name", &mut changes.first_name, MAX_NAME_LENGTH),
        ("last_name", &mut changes.last_name, MAX_NAME_LENGTH),
        ("image", &mut changes.image, MAX_URL_LENGTH),
        ("github", &mut changes.github, MAX_URL_LENGTH),
        ("linkedin", &mut changes.linkedin, MAX_URL_LENGTH),
        ("website", &mut changes.website, MAX_URL_LENGTH),
        ("bio", &mut changes.bio, MAX_BIO_LENGTH),
    ] {
        if let Some(v) = value.as_mut() {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                errors.push(format!("{field} must not be empty"));
            } else if trimmed.chars().count() > max {
                errors.push(format!("{field} must be at most {max} characters"));
            } else if trimmed.len() != v.len() {
                *v = trimmed.to_string();
            }
        }
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(AuthError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_identity_equality() {
        let actor = UserId::new();
        assert_eq!(authorize(&actor, &actor.to_string()).unwrap(), actor);
        assert!(matches!(
            authorize(&actor, &UserId::new().to_string()),
            Err(AuthError::Forbidden)
        ));
        assert!(matches!(authorize(&actor, "me"), Err(AuthError::Forbidden)));
    }

    #[test]
    fn test_validate_trims_and_rejects_blank() {
        let ok = validate(ProfileChanges {
            github: Some("  https://github.com/ada ".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ok.github.as_deref(), Some("https://github.com/ada"));

        let err = validate(ProfileChanges {
            first_name: Some(" ".into()),
            bio: Some("x".repeat(MAX_BIO_LENGTH + 1)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref e) if e.len() == 2));
    }
}
