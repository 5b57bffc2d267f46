//! In-Memory Repository
//!
//! Process-local stand-in for [`PgAuthRepository`](super::postgres::PgAuthRepository)
//! with the same uniqueness rules and delete cascade. Used by tests and by
//! local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::{session::RefreshSession, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, oauth_provider::FederatedIdentity, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    sessions: HashMap<String, RefreshSession>,
}

/// Cloning shares the underlying store
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.store.read().await.users.len()
    }

    pub async fn session_count(&self) -> usize {
        self.store.read().await.sessions.len()
    }

    /// Sessions currently stored for one user
    pub async fn sessions_for(&self, user_id: &UserId) -> Vec<RefreshSession> {
        self.store
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect()
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut store = self.store.write().await;

        let email_taken = user
            .email
            .as_ref()
            .is_some_and(|email| store.users.values().any(|u| u.email.as_ref() == Some(email)));
        if email_taken {
            return Err(AuthError::UserExists);
        }

        let identity_taken = user.identity.as_ref().is_some_and(|identity| {
            store
                .users
                .values()
                .any(|u| u.identity.as_ref() == Some(identity))
        });
        if identity_taken {
            return Err(AuthError::ProviderAccountExists);
        }

        store.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.store.read().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .store
            .read()
            .await
            .users
            .values()
            .find(|u| u.email.as_ref() == Some(email))
            .cloned())
    }

    async fn find_by_identity(&self, identity: &FederatedIdentity) -> AuthResult<Option<User>> {
        Ok(self
            .store
            .read()
            .await
            .users
            .values()
            .find(|u| u.identity.as_ref() == Some(identity))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn exists_by_identity(&self, identity: &FederatedIdentity) -> AuthResult<bool> {
        Ok(self.find_by_identity(identity).await?.is_some())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut store = self.store.write().await;
        match store.users.get_mut(&user.user_id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AuthError::UserNotFound),
        }
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        let mut store = self.store.write().await;
        let removed = store.users.remove(user_id).is_some();
        if removed {
            store.sessions.retain(|_, s| s.user_id != *user_id);
        }
        Ok(removed)
    }
}

impl SessionRepository for InMemoryAuthRepository {
    async fn create_session(&self, session: &RefreshSession) -> AuthResult<()> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&session.user_id) {
            return Err(AuthError::Internal("session owner does not exist".to_string()));
        }
        if store.sessions.contains_key(&session.token) {
            return Err(AuthError::Internal("duplicate refresh token".to_string()));
        }
        store.sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, token: &str) -> AuthResult<Option<RefreshSession>> {
        Ok(self.store.read().await.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> AuthResult<u64> {
        let removed = self.store.write().await.sessions.remove(token);
        Ok(u64::from(removed.is_some()))
    }

    async fn delete_all_sessions(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut store = self.store.write().await;
        let before = store.sessions.len();
        store.sessions.retain(|_, s| s.user_id != *user_id);
        Ok((before - store.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user_profile::UserProfile;
    use crate::domain::value_object::{
        oauth_provider::OAuthProvider, user_password::UserPassword,
    };
    use chrono::{Duration, Utc};

    fn credential_user(email: &str) -> User {
        User::with_credentials(Email::new(email).unwrap(), UserPassword::from_db("$argon2id$x"))
    }

    fn session(user_id: UserId, token: &str) -> RefreshSession {
        let now = Utc::now();
        RefreshSession::new(token.into(), user_id, now, now + Duration::days(7), None, None)
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let repo = InMemoryAuthRepository::new();
        repo.create(&credential_user("a@x.edu")).await.unwrap();
        assert!(matches!(
            repo.create(&credential_user("a@x.edu")).await,
            Err(AuthError::UserExists)
        ));
    }

    #[tokio::test]
    async fn test_identity_uniqueness() {
        let repo = InMemoryAuthRepository::new();
        let identity = FederatedIdentity::new(OAuthProvider::Google, "g-1");
        let user = User::from_federation(identity.clone(), None, UserProfile::default());
        repo.create(&user).await.unwrap();

        let twin = User::from_federation(identity.clone(), None, UserProfile::default());
        assert!(matches!(
            repo.create(&twin).await,
            Err(AuthError::ProviderAccountExists)
        ));
        assert!(repo.exists_by_identity(&identity).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_session_is_idempotent() {
        let repo = InMemoryAuthRepository::new();
        let user = credential_user("a@x.edu");
        repo.create(&user).await.unwrap();
        repo.create_session(&session(user.user_id, "t1")).await.unwrap();

        assert_eq!(repo.delete_session("t1").await.unwrap(), 1);
        assert_eq!(repo.delete_session("t1").await.unwrap(), 0);
        assert!(repo.find_session("t1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all_only_touches_one_user() {
        let repo = InMemoryAuthRepository::new();
        let a = credential_user("a@x.edu");
        let b = credential_user("b@x.edu");
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();
        repo.create_session(&session(a.user_id, "a1")).await.unwrap();
        repo.create_session(&session(a.user_id, "a2")).await.unwrap();
        repo.create_session(&session(b.user_id, "b1")).await.unwrap();

        assert_eq!(repo.delete_all_sessions(&a.user_id).await.unwrap(), 2);
        assert!(repo.find_session("b1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_user_delete_cascades_sessions() {
        let repo = InMemoryAuthRepository::new();
        let user = credential_user("a@x.edu");
        repo.create(&user).await.unwrap();
        repo.create_session(&session(user.user_id, "t1")).await.unwrap();

        assert!(repo.delete(&user.user_id).await.unwrap());
        assert_eq!(repo.session_count().await, 0);
        assert!(!repo.delete(&user.user_id).await.unwrap());
    }
}
