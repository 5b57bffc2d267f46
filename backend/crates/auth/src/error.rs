//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! `Display` is for logs. Clients only ever see [`AuthError::public_message`],
//! which is deliberately coarse for every authentication failure.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

const INVALID_TOKEN: &str = "Invalid or expired token";
const PROVIDER_AUTH_FAILED: &str = "Failed to authenticate with provider";
const INTERNAL: &str = "Internal server error";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Field-level input errors
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Missing OAuth state parameter")]
    MissingOAuthState,

    #[error("Email already registered")]
    UserExists,

    #[error("Federated account already registered")]
    ProviderAccountExists,

    /// Unknown email, no password, or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad signature, shape, or expiry
    #[error("Invalid token")]
    InvalidToken,

    #[error("Refresh token cookie missing")]
    MissingRefreshToken,

    /// Refresh token signed correctly but has no persisted row
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid registration token")]
    InvalidRegistrationToken,

    #[error("OAuth state mismatch")]
    InvalidOAuthState,

    #[error("Code exchange with {0} failed")]
    ExchangeFailed(String),

    #[error("Profile fetch from {0} failed")]
    ProfileFetchFailed(String),

    /// Acting principal is not the target user
    #[error("Forbidden")]
    Forbidden,

    #[error("User not found")]
    UserNotFound,

    #[error("Provider {0} is not configured")]
    ProviderNotInitialized(String),

    #[error("Failed to issue access token: {0}")]
    AccessTokenIssueFailed(String),

    #[error("Failed to issue refresh token: {0}")]
    RefreshTokenIssueFailed(String),

    #[error("Failed to issue registration token: {0}")]
    TemporaryTokenIssueFailed(String),

    #[error("Failed to persist session: {0}")]
    SessionCreateFailed(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::BadRequest(_)
            | AuthError::UnsupportedProvider(_)
            | AuthError::MissingOAuthState => ErrorKind::BadRequest,
            AuthError::UserExists | AuthError::ProviderAccountExists => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::MissingRefreshToken
            | AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidRegistrationToken
            | AuthError::InvalidOAuthState
            | AuthError::ExchangeFailed(_)
            | AuthError::ProfileFetchFailed(_) => ErrorKind::Unauthorized,
            AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::ProviderNotInitialized(_) => ErrorKind::ServiceUnavailable,
            AuthError::AccessTokenIssueFailed(_)
            | AuthError::RefreshTokenIssueFailed(_)
            | AuthError::TemporaryTokenIssueFailed(_)
            | AuthError::SessionCreateFailed(_)
            | AuthError::PasswordHash(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Message sent to the client
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(_) => "Validation failed".to_string(),
            AuthError::BadRequest(msg) => msg.clone(),
            AuthError::UnsupportedProvider(_) => "Unsupported provider".to_string(),
            AuthError::MissingOAuthState => "Missing state parameter".to_string(),
            AuthError::UserExists => "Email already registered".to_string(),
            AuthError::ProviderAccountExists => "Account already registered".to_string(),
            AuthError::InvalidCredentials => "Invalid credentials".to_string(),
            AuthError::InvalidToken | AuthError::SessionNotFound | AuthError::SessionExpired => {
                INVALID_TOKEN.to_string()
            }
            AuthError::MissingRefreshToken => "Refresh token is required".to_string(),
            AuthError::InvalidRegistrationToken => {
                "Invalid or expired registration token".to_string()
            }
            AuthError::InvalidOAuthState => "Invalid OAuth state".to_string(),
            AuthError::ExchangeFailed(_) | AuthError::ProfileFetchFailed(_) => {
                PROVIDER_AUTH_FAILED.to_string()
            }
            AuthError::Forbidden => "Not allowed to modify this user".to_string(),
            AuthError::UserNotFound => "User not found".to_string(),
            AuthError::ProviderNotInitialized(_) => "Provider is not configured".to_string(),
            AuthError::AccessTokenIssueFailed(_) => "Failed to generate access token".to_string(),
            AuthError::RefreshTokenIssueFailed(_) => {
                "Failed to generate refresh token".to_string()
            }
            AuthError::TemporaryTokenIssueFailed(_) => {
                "Failed to generate registration token".to_string()
            }
            AuthError::SessionCreateFailed(_) => "Failed to create session".to_string(),
            AuthError::PasswordHash(_) | AuthError::Database(_) | AuthError::Internal(_) => {
                INTERNAL.to_string()
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let app = AppError::new(self.kind(), self.public_message());
        match self {
            AuthError::Validation(details) => app.with_details(details.clone()),
            _ => app,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::AccessTokenIssueFailed(_)
            | AuthError::RefreshTokenIssueFailed(_)
            | AuthError::TemporaryTokenIssueFailed(_)
            | AuthError::SessionCreateFailed(_)
            | AuthError::PasswordHash(_)
            | AuthError::Internal(_) => {
                tracing::error!(error = %self, "Auth internal error");
            }
            AuthError::ExchangeFailed(_) | AuthError::ProfileFetchFailed(_) => {
                tracing::warn!(error = %self, "OAuth provider rejected the request");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::InvalidOAuthState => {
                tracing::warn!("OAuth state mismatch on callback");
            }
            AuthError::ProviderNotInitialized(provider) => {
                tracing::warn!(provider = %provider, "OAuth provider used but not configured");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::PasswordHash(err.to_string())
    }
}

impl From<crate::domain::value_object::oauth_provider::UnknownProvider> for AuthError {
    fn from(err: crate::domain::value_object::oauth_provider::UnknownProvider) -> Self {
        AuthError::UnsupportedProvider(err.0)
    }
}
