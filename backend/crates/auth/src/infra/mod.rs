//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod memory;
pub mod notifier;
pub mod oauth;
pub mod postgres;

pub use memory::InMemoryAuthRepository;
pub use notifier::TracingNotifier;
pub use oauth::{FederationSetupError, OAuthFederation};
pub use postgres::PgAuthRepository;
