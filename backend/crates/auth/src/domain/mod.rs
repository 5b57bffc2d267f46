//! Domain Layer
//!
//! Contains entities, value objects, and the traits the application layer
//! depends on (storage, federation, notification).

pub mod entity;
pub mod federation;
pub mod notifier;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    oauth_profile::OAuthProfile, session::RefreshSession, user::User, user_profile::UserProfile,
};
pub use federation::FederationResolver;
pub use notifier::{NotifyError, VerificationNotifier};
pub use repository::{SessionRepository, UserRepository};
