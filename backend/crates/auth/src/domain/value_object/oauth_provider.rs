//! OAuth Provider Value Objects
//!
//! Supported identity providers and the fixed endpoint metadata for each.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Supported OAuth2 identity provider
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum OAuthProvider {
    #[display("github")]
    Github = 1,
    #[display("google")]
    Google = 2,
}

/// Path segment did not name a supported provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported provider: {0}")]
pub struct UnknownProvider(pub String);

impl OAuthProvider {
    pub const ALL: [OAuthProvider; 2] = [OAuthProvider::Github, OAuthProvider::Google];

    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(OAuthProvider::Github),
            2 => Some(OAuthProvider::Google),
            _ => None,
        }
    }

    pub const fn auth_url(&self) -> &'static str {
        match self {
            OAuthProvider::Github => "https://github.com/login/oauth/authorize",
            OAuthProvider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
        }
    }

    pub const fn token_url(&self) -> &'static str {
        match self {
            OAuthProvider::Github => "https://github.com/login/oauth/access_token",
            OAuthProvider::Google => "https://oauth2.googleapis.com/token",
        }
    }

    /// "Who am I" endpoint queried with the provider access token
    pub const fn userinfo_url(&self) -> &'static str {
        match self {
            OAuthProvider::Github => "https://api.github.com/user",
            OAuthProvider::Google => "https://www.googleapis.com/oauth2/v2/userinfo",
        }
    }

    pub const fn scopes(&self) -> &'static [&'static str] {
        match self {
            OAuthProvider::Github => &["user:email"],
            OAuthProvider::Google => &["email", "profile"],
        }
    }
}

impl FromStr for OAuthProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "github" => Ok(OAuthProvider::Github),
            "google" => Ok(OAuthProvider::Google),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// A (provider, provider_user_id) pair that identifies a federated account
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FederatedIdentity {
    pub provider: OAuthProvider,
    pub provider_user_id: String,
}

impl FederatedIdentity {
    pub fn new(provider: OAuthProvider, provider_user_id: impl Into<String>) -> Self {
        Self {
            provider,
            provider_user_id: provider_user_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!("github".parse(), Ok(OAuthProvider::Github));
        assert_eq!("google".parse(), Ok(OAuthProvider::Google));
        assert_eq!(
            "gitlab".parse::<OAuthProvider>(),
            Err(UnknownProvider("gitlab".into()))
        );
        // path segments are case sensitive
        let err = "GitHub".parse::<OAuthProvider>().unwrap_err();
        assert_eq!(err.to_string(), "unsupported provider: GitHub");
    }

    #[test]
    fn test_provider_display_and_serde_agree() {
        for provider in OAuthProvider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider));
            assert_eq!(provider.to_string().parse(), Ok(provider));
        }
    }

    #[test]
    fn test_provider_id_roundtrip() {
        for provider in OAuthProvider::ALL {
            assert_eq!(OAuthProvider::from_id(provider.id()), Some(provider));
        }
        assert_eq!(OAuthProvider::from_id(0), None);
    }

    #[test]
    fn test_provider_scopes() {
        assert_eq!(OAuthProvider::Github.scopes(), &["user:email"]);
        assert_eq!(OAuthProvider::Google.scopes(), &["email", "profile"]);
    }
}
