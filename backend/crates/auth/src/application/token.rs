//! Token Service
//!
//! Issues and validates the four HS256 token kinds:
//!
//! | kind         | secret        | claims                                    |
//! |--------------|---------------|-------------------------------------------|
//! | access       | access        | `user_id`, `role`, `iat`, `exp`           |
//! | refresh      | refresh       | `user_id`, `role`, `iat`, `exp`, `jti`    |
//! | temporary    | registration  | `oauth_data`, `iat`, `exp`, `nbf`         |
//! | verification | registration  | `user_id`, `email`, `purpose`, `iat`, `exp` |
//!
//! Nothing is persisted here. Every validation failure collapses into one
//! opaque error so callers cannot tell a bad signature from an expired token.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::domain::value_object::{email::Email, user_id::UserId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

const VERIFICATION_PURPOSE: &str = "email_verification";

// ============================================================================
// Wire claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    user_id: String,
    role: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    user_id: String,
    role: String,
    iat: i64,
    exp: i64,
    /// Keeps two refresh tokens minted in the same second distinct
    jti: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TemporaryClaims {
    oauth_data: OAuthProfile,
    iat: i64,
    exp: i64,
    nbf: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct VerificationClaims {
    user_id: String,
    email: String,
    purpose: String,
    iat: i64,
    exp: i64,
}

// ============================================================================
// Public outputs
// ============================================================================

/// Identity recovered from a valid access or refresh token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenClaims {
    pub user_id: UserId,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
pub struct IssuedAccess {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct IssuedRefresh {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Identity recovered from a valid verification token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationClaimsView {
    pub user_id: UserId,
    pub email: Email,
}

// ============================================================================
// Token Service
// ============================================================================

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Keys are derived once from [`AuthConfig`]
pub struct TokenService {
    access: KeyPair,
    refresh: KeyPair,
    registration: KeyPair,
    access_ttl: Duration,
    refresh_ttl: Duration,
    temporary_ttl: Duration,
    verification_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: KeyPair::new(&config.access_secret),
            refresh: KeyPair::new(&config.refresh_secret),
            registration: KeyPair::new(config.registration_secret()),
            access_ttl: to_chrono(config.access_ttl),
            refresh_ttl: to_chrono(config.refresh_ttl),
            temporary_ttl: to_chrono(config.temporary_ttl),
            verification_ttl: to_chrono(config.verification_ttl),
        }
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    pub fn issue_access(&self, user_id: &UserId, role: UserRole) -> AuthResult<IssuedAccess> {
        self.issue_access_at(user_id, role, Utc::now())
    }

    pub(crate) fn issue_access_at(
        &self,
        user_id: &UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedAccess> {
        let expires_at = now + self.access_ttl;
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            role: role.code().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.access.encoding)
            .map_err(|e| AuthError::AccessTokenIssueFailed(e.to_string()))?;
        Ok(IssuedAccess { token, expires_at })
    }

    pub fn validate_access(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims: AccessClaims =
            decode_claims(token, &self.access.decoding, false).ok_or(AuthError::InvalidToken)?;
        subject(&claims.user_id, &claims.role).ok_or(AuthError::InvalidToken)
    }

    // ------------------------------------------------------------------------
    // Refresh
    // ------------------------------------------------------------------------

    /// Signs a refresh token. Persisting it is the caller's job.
    pub fn issue_refresh(&self, user_id: &UserId, role: UserRole) -> AuthResult<IssuedRefresh> {
        self.issue_refresh_at(user_id, role, Utc::now())
    }

    pub(crate) fn issue_refresh_at(
        &self,
        user_id: &UserId,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedRefresh> {
        let expires_at = now + self.refresh_ttl;
        let claims = RefreshClaims {
            user_id: user_id.to_string(),
            role: role.code().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.refresh.encoding)
            .map_err(|e| AuthError::RefreshTokenIssueFailed(e.to_string()))?;
        Ok(IssuedRefresh {
            token,
            issued_at: now,
            expires_at,
        })
    }

    pub fn validate_refresh(&self, token: &str) -> AuthResult<TokenClaims> {
        let claims: RefreshClaims =
            decode_claims(token, &self.refresh.decoding, false).ok_or(AuthError::InvalidToken)?;
        subject(&claims.user_id, &claims.role).ok_or(AuthError::InvalidToken)
    }

    // ------------------------------------------------------------------------
    // Temporary registration
    // ------------------------------------------------------------------------

    pub fn issue_temporary(&self, profile: &OAuthProfile) -> AuthResult<String> {
        self.issue_temporary_at(profile, Utc::now())
    }

    pub(crate) fn issue_temporary_at(
        &self,
        profile: &OAuthProfile,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = TemporaryClaims {
            oauth_data: profile.clone(),
            iat: now.timestamp(),
            exp: (now + self.temporary_ttl).timestamp(),
            nbf: now.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.registration.encoding,
        )
        .map_err(|e| AuthError::TemporaryTokenIssueFailed(e.to_string()))
    }

    pub fn validate_temporary(&self, token: &str) -> AuthResult<OAuthProfile> {
        decode_claims::<TemporaryClaims>(token, &self.registration.decoding, true)
            .map(|claims| claims.oauth_data)
            .ok_or(AuthError::InvalidRegistrationToken)
    }

    // ------------------------------------------------------------------------
    // Email verification
    // ------------------------------------------------------------------------

    pub fn issue_verification(&self, user_id: &UserId, email: &Email) -> AuthResult<String> {
        self.issue_verification_at(user_id, email, Utc::now())
    }

    pub(crate) fn issue_verification_at(
        &self,
        user_id: &UserId,
        email: &Email,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let claims = VerificationClaims {
            user_id: user_id.to_string(),
            email: email.as_str().to_string(),
            purpose: VERIFICATION_PURPOSE.to_string(),
            iat: now.timestamp(),
            exp: (now + self.verification_ttl).timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.registration.encoding,
        )
        .map_err(|e| AuthError::Internal(format!("verification token: {e}")))
    }

    pub fn validate_verification(&self, token: &str) -> AuthResult<VerificationClaimsView> {
        let claims: VerificationClaims = decode_claims(token, &self.registration.decoding, false)
            .filter(|c: &VerificationClaims| c.purpose == VERIFICATION_PURPOSE)
            .ok_or(AuthError::InvalidToken)?;
        let user_id = UserId::parse_str(&claims.user_id).map_err(|_| AuthError::InvalidToken)?;
        let email = Email::new(claims.email).map_err(|_| AuthError::InvalidToken)?;
        Ok(VerificationClaimsView { user_id, email })
    }
}

/// HS256 only, zero leeway, `exp` required. The reason only reaches debug logs.
fn decode_claims<T: serde::de::DeserializeOwned>(
    token: &str,
    key: &DecodingKey,
    check_nbf: bool,
) -> Option<T> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = check_nbf;
    validation.set_required_spec_claims(&["exp"]);

    match decode::<T>(token, key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!(reason = ?e.kind(), "Token rejected");
            None
        }
    }
}

fn subject(user_id: &str, role: &str) -> Option<TokenClaims> {
    Some(TokenClaims {
        user_id: UserId::parse_str(user_id).ok()?,
        role: UserRole::from_code(role)?,
    })
}

fn to_chrono(ttl: std::time::Duration) -> Duration {
    Duration::from_std(ttl).unwrap_or(Duration::days(365))
}
