//! Application Layer
//!
//! Use cases and application services.

pub mod complete_registration;
pub mod config;
pub mod manage_user;
pub mod oauth;
pub mod refresh;
pub mod register;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod token;
pub mod verify_email;

// Re-exports
pub use complete_registration::{CompleteRegistrationInput, CompleteRegistrationUseCase};
pub use config::{AuthConfig, OAuthClientCredentials, OAuthSettings, RoleSource};
pub use manage_user::ManageUserUseCase;
pub use oauth::{OAuthCallbackInput, OAuthCallbackOutcome, OAuthInitiation, OAuthUseCase};
pub use refresh::RefreshUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use session::{EstablishedSession, LoginOutput};
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use token::{IssuedAccess, IssuedRefresh, TokenClaims, TokenService};
pub use verify_email::VerifyEmailUseCase;
