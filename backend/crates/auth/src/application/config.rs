//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared behind an `Arc`; nothing here is read lazily from the environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Where the role of a refreshed access token comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoleSource {
    /// Reuse the role signed into the refresh token. A revoked admin keeps
    /// minting admin access tokens until that refresh token is gone.
    #[default]
    Claims,
    /// Re-read the role from the credential store on every refresh
    Store,
}

impl FromStr for RoleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "claims" => Ok(RoleSource::Claims),
            "store" => Ok(RoleSource::Store),
            other => Err(format!("unknown role source: {other}")),
        }
    }
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HS256 secret for access tokens
    pub access_secret: Vec<u8>,
    /// HS256 secret for refresh tokens; must differ from the access secret
    pub refresh_secret: Vec<u8>,
    /// Secret for registration and verification tokens; `None` reuses the
    /// access secret
    pub registration_secret: Option<Vec<u8>>,
    /// Access token TTL (15 minutes)
    pub access_ttl: Duration,
    /// Refresh token TTL (7 days)
    pub refresh_ttl: Duration,
    /// Temporary registration token TTL (15 minutes)
    pub temporary_ttl: Duration,
    /// Email verification token TTL (2 hours)
    pub verification_ttl: Duration,
    /// Refresh cookie name
    pub refresh_cookie_name: String,
    /// OAuth state cookie name
    pub oauth_state_cookie_name: String,
    /// OAuth state cookie lifetime (10 minutes)
    pub oauth_state_ttl: Duration,
    /// Whether to set the Secure cookie attribute
    pub cookie_secure: bool,
    /// SameSite policy for the refresh cookie
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    pub refresh_role_source: RoleSource,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: Vec::new(),
            refresh_secret: Vec::new(),
            registration_secret: None,
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            temporary_ttl: Duration::from_secs(15 * 60),
            verification_ttl: Duration::from_secs(2 * 3600),
            refresh_cookie_name: "refresh_token".to_string(),
            oauth_state_cookie_name: "oauth_state".to_string(),
            oauth_state_ttl: Duration::from_secs(10 * 60),
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            password_pepper: None,
            refresh_role_source: RoleSource::Claims,
        }
    }
}

impl AuthConfig {
    /// Create config with random signing secrets (tests, local runs)
    pub fn with_random_secrets() -> Self {
        use rand::RngCore;
        let mut access = vec![0u8; 32];
        let mut refresh = vec![0u8; 32];
        rand::rng().fill_bytes(&mut access);
        rand::rng().fill_bytes(&mut refresh);
        Self {
            access_secret: access,
            refresh_secret: refresh,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secrets()
        }
    }

    /// Secret used for registration and verification tokens
    pub fn registration_secret(&self) -> &[u8] {
        self.registration_secret
            .as_deref()
            .unwrap_or(&self.access_secret)
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("temporary_ttl", &self.temporary_ttl)
            .field("verification_ttl", &self.verification_ttl)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("has_pepper", &self.password_pepper.is_some())
            .field("refresh_role_source", &self.refresh_role_source)
            .finish_non_exhaustive()
    }
}

/// Client id and secret for one OAuth provider
#[derive(Clone)]
pub struct OAuthClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for OAuthClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// OAuth federation settings. A provider without credentials stays
/// uninitialized and its routes answer 503.
#[derive(Debug, Clone, Default)]
pub struct OAuthSettings {
    /// Base URL the provider redirects back to, e.g. `https://api.example.org`
    pub redirect_base_url: String,
    pub github: Option<OAuthClientCredentials>,
    pub google: Option<OAuthClientCredentials>,
}
