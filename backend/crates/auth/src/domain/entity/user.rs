//! User Entity
//!
//! A user is reachable through email + password, through a federated
//! identity, or both. The constructors are the only way to build a new
//! user, so an account with neither cannot be created.

use chrono::{DateTime, Utc};

use crate::domain::entity::user_profile::{ProfileChanges, UserProfile};
use crate::domain::value_object::{
    email::Email, oauth_provider::FederatedIdentity, user_id::UserId,
    user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    /// Generated at creation, immutable
    pub user_id: UserId,
    /// Unique when present; federated users may lack one
    pub email: Option<Email>,
    pub email_verified: bool,
    /// Present only for credential accounts
    pub password_hash: Option<UserPassword>,
    /// Present only for federated accounts
    pub identity: Option<FederatedIdentity>,
    pub role: UserRole,
    /// False until the profile-completion step finishes
    pub is_onboarded: bool,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Credential account. Starts not onboarded and unverified.
    pub fn with_credentials(email: Email, password_hash: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email: Some(email),
            email_verified: false,
            password_hash: Some(password_hash),
            identity: None,
            role: UserRole::default(),
            is_onboarded: false,
            profile: UserProfile::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Federated account created by completing registration
    pub fn from_federation(
        identity: FederatedIdentity,
        email: Option<Email>,
        profile: UserProfile,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            email_verified: false,
            password_hash: None,
            identity: Some(identity),
            role: UserRole::default(),
            is_onboarded: false,
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_login_method(&self) -> bool {
        (self.email.is_some() && self.password_hash.is_some()) || self.identity.is_some()
    }

    pub fn mark_onboarded(&mut self) {
        self.is_onboarded = true;
        self.updated_at = Utc::now();
    }

    /// No-op without an email
    pub fn verify_email(&mut self) {
        if self.email.is_some() && !self.email_verified {
            self.email_verified = true;
            self.updated_at = Utc::now();
        }
    }

    pub fn update_profile(&mut self, changes: ProfileChanges) {
        self.profile.apply(changes);
        self.updated_at = Utc::now();
    }
}
