//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and federation traits
//! - `application/` - Use cases, token service, configuration
//! - `infra/` - PostgreSQL, in-memory store, OAuth providers, notifier
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Email + password registration and login
//! - GitHub and Google sign-in, with a registration step for new identities
//! - Short-lived access tokens (Bearer) and persisted refresh tokens (cookie)
//! - Logout of one session or every session of a user
//! - Email verification and self-service profile management
//!
//! ## Security Model
//! - Passwords hashed with Argon2id; unknown emails still pay for one verify
//! - Access, refresh and registration tokens are HS256 with separate secrets
//! - A refresh token is only honoured while its row exists in `refresh_tokens`
//! - OAuth `state` is bound to the browser with a short-lived cookie

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{AuthConfig, OAuthClientCredentials, OAuthSettings, RoleSource};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, OAuthFederation, PgAuthRepository, TracingNotifier};
pub use presentation::router::{auth_router, auth_router_generic};
pub use presentation::{AuthAppState, AuthContext};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
