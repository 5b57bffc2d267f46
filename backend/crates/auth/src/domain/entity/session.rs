//! Refresh Session Entity
//!
//! A persisted refresh token. The row is the revocation point: a refresh
//! token whose row is gone is rejected even while its signature is valid.
//! Rows are never mutated; expiry is checked when the token is presented.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::value_object::user_id::UserId;

/// Persisted refresh-token record
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshSession {
    /// The signed refresh token itself; primary lookup key
    pub token: String,
    /// Owning user
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Advisory client metadata, never enforced
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RefreshSession {
    pub fn new(
        token: String,
        user_id: UserId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            token,
            user_id,
            issued_at,
            expires_at,
            ip_address,
            user_agent,
        }
    }

    /// Expired strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

impl fmt::Debug for RefreshSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshSession")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("ip_address", &self.ip_address)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
