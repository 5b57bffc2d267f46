//! API DTOs (Data Transfer Objects)
//!
//! Field names follow the public API: snake_case throughout, except the
//! `accessToken` key that front-end clients already read.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::domain::entity::user::User;
use crate::domain::entity::user_profile::ProfileChanges;
use crate::domain::value_object::membership::{Branch, Position};
use crate::domain::value_object::oauth_provider::OAuthProvider;
use crate::domain::value_object::user_id::UserId;
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Credentials
// ============================================================================

/// Register request
/// Absent keys deserialize empty so they surface as field errors
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request
/// Absent keys deserialize empty so they surface as field errors
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: access token in the body, refresh token in a cookie
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub user: PublicUser,
}

/// Refresh response
#[derive(Debug, Clone, Serialize)]
pub struct AccessTokenResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub const fn new(message: &'static str) -> Self {
        Self { message }
    }
}

// ============================================================================
// OAuth
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

/// Callback outcome for an identity with no local account
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequiredResponse {
    /// Always `registration_required`
    pub status: &'static str,
    pub temp_token: String,
    pub user_data: OAuthUserData,
    pub message: &'static str,
}

impl RegistrationRequiredResponse {
    pub fn new(temp_token: String, profile: OAuthProfile) -> Self {
        Self {
            status: "registration_required",
            temp_token,
            user_data: OAuthUserData::from(profile),
            message: "Additional information required to complete registration",
        }
    }
}

/// Profile snapshot shown to the client before registration completes
#[derive(Debug, Clone, Serialize)]
pub struct OAuthUserData {
    pub email: Option<String>,
    pub name: String,
    pub avatar_url: Option<String>,
    pub provider: OAuthProvider,
}

impl From<OAuthProfile> for OAuthUserData {
    fn from(profile: OAuthProfile) -> Self {
        Self {
            email: profile.email,
            name: profile.name,
            avatar_url: profile.avatar_url,
            provider: profile.provider,
        }
    }
}

/// Complete registration request
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteRegistrationRequest {
    #[serde(default)]
    pub temp_token: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub position: Option<Position>,
    pub branch: Option<Branch>,
    pub graduation_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyEmailQuery {
    pub token: Option<String>,
}

// ============================================================================
// Users
// ============================================================================

/// Partial profile update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub position: Option<Position>,
    pub branch: Option<Branch>,
    pub graduation_date: Option<NaiveDate>,
    pub github: Option<String>,
    pub linkedin: Option<String>,
    pub bio: Option<String>,
    pub website: Option<String>,
}

impl From<UpdateUserRequest> for ProfileChanges {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            image: req.image,
            position: req.position,
            branch: req.branch,
            graduation_date: req.graduation_date,
            github: req.github,
            linkedin: req.linkedin,
            bio: req.bio,
            website: req.website,
        }
    }
}

/// User as returned by the API. No password hash, no provider user id.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub email: Option<String>,
    pub email_verified: bool,
    pub role: UserRole,
    pub provider: Option<OAuthProvider>,
    pub is_onboarded: bool,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub position: Option<Position>,
    pub branch: Option<Branch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        let profile = user.profile.clone();
        Self {
            id: user.user_id,
            email: user.email.as_ref().map(|e| e.as_str().to_string()),
            email_verified: user.email_verified,
            role: user.role,
            provider: user.identity.as_ref().map(|i| i.provider),
            is_onboarded: user.is_onboarded,
            full_name: profile.full_name,
            first_name: profile.first_name,
            last_name: profile.last_name,
            image: profile.image,
            position: profile.position,
            branch: profile.branch,
            graduation_date: profile.graduation_date,
            github: profile.github,
            linkedin: profile.linkedin,
            bio: profile.bio,
            website: profile.website,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user_profile::UserProfile;
    use crate::domain::value_object::{
        email::Email, oauth_provider::FederatedIdentity, user_password::UserPassword,
    };

    #[test]
    fn test_public_user_hides_secrets() {
        let user = User::with_credentials(
            Email::new("ada@campus.edu").unwrap(),
            UserPassword::from_db("$argon2id$v=19$secret"),
        );
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();

        assert_eq!(json["email"], "ada@campus.edu");
        assert_eq!(json["role"], "USER");
        assert_eq!(json["is_onboarded"], false);
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2id"));
    }

    #[test]
    fn test_public_user_federated() {
        let identity = FederatedIdentity::new(OAuthProvider::Github, "583231");
        let user = User::from_federation(identity, None, UserProfile::default());
        let json = serde_json::to_value(PublicUser::from(&user)).unwrap();

        assert_eq!(json["provider"], "github");
        assert!(json["email"].is_null());
        assert!(!json.to_string().contains("583231"));
    }

    #[test]
    fn test_access_token_key() {
        let json = serde_json::to_value(AccessTokenResponse {
            access_token: "abc".into(),
        })
        .unwrap();
        assert_eq!(json["accessToken"], "abc");
    }

    #[test]
    fn test_update_request_parses_enums() {
        let req: UpdateUserRequest = serde_json::from_str(
            r#"{"position":"mentor","branch":"projects","graduation_date":"2027-05-20"}"#,
        )
        .unwrap();
        let changes = ProfileChanges::from(req);
        assert_eq!(changes.position, Some(Position::Mentor));
        assert_eq!(changes.branch, Some(Branch::Projects));
        assert!(changes.first_name.is_none());
    }
}
