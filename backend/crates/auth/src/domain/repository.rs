//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use crate::domain::entity::{session::RefreshSession, user::User};
use crate::domain::value_object::{
    email::Email, oauth_provider::FederatedIdentity, user_id::UserId,
};
use crate::error::AuthResult;

/// Credential store
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. A duplicate email or federated identity fails
    /// with `UserExists` / `ProviderAccountExists`.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_identity(&self, identity: &FederatedIdentity) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_identity(&self, identity: &FederatedIdentity) -> AuthResult<bool>;

    /// Persist mutable columns (profile, onboarding, verification)
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Delete a user and, with it, every session they own.
    /// Returns false when no row matched.
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;
}

/// Session store (persisted refresh tokens)
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn create_session(&self, session: &RefreshSession) -> AuthResult<()>;

    async fn find_session(&self, token: &str) -> AuthResult<Option<RefreshSession>>;

    /// Idempotent; returns the number of rows removed
    async fn delete_session(&self, token: &str) -> AuthResult<u64>;

    /// Bulk revoke for logout-all
    async fn delete_all_sessions(&self, user_id: &UserId) -> AuthResult<u64>;
}
