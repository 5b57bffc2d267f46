//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::error::conversions::is_unique_violation;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{session::RefreshSession, user::User, user_profile::UserProfile};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    membership::{Branch, Position},
    oauth_provider::{FederatedIdentity, OAuthProvider},
    user_id::UserId,
    user_password::UserPassword,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Unique constraint on `(provider, provider_user_id)`
const PROVIDER_IDENTITY_CONSTRAINT: &str = "users_provider_identity_key";

const USER_COLUMNS: &str = r#"
    id,
    email,
    email_verified,
    password_hash,
    provider,
    provider_user_id,
    role,
    is_onboarded,
    full_name,
    first_name,
    last_name,
    image,
    position,
    branch,
    graduation_date,
    github,
    linkedin,
    bio,
    website,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map an insert failure on `users` to the matching conflict
fn user_insert_error(err: sqlx::Error) -> AuthError {
    if !is_unique_violation(&err) {
        return AuthError::Database(err);
    }
    let constraint = match &err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    };
    match constraint.as_deref() {
        Some(PROVIDER_IDENTITY_CONSTRAINT) => AuthError::ProviderAccountExists,
        _ => AuthError::UserExists,
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let (provider, provider_user_id) = identity_columns(user.identity.as_ref());
        let p = &user.profile;

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                email_verified,
                password_hash,
                provider,
                provider_user_id,
                role,
                is_onboarded,
                full_name,
                first_name,
                last_name,
                image,
                position,
                branch,
                graduation_date,
                github,
                linkedin,
                bio,
                website,
                created_at,
                updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                $12, $13, $14, $15, $16, $17, $18, $19, $20, $21
            )
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_ref().map(Email::as_str))
        .bind(user.email_verified)
        .bind(user.password_hash.as_ref().map(UserPassword::as_phc_string))
        .bind(provider)
        .bind(provider_user_id)
        .bind(user.role.id())
        .bind(user.is_onboarded)
        .bind(p.full_name.as_deref())
        .bind(p.first_name.as_deref())
        .bind(p.last_name.as_deref())
        .bind(p.image.as_deref())
        .bind(p.position.map(|v| v.id()))
        .bind(p.branch.map(|v| v.id()))
        .bind(p.graduation_date)
        .bind(p.github.as_deref())
        .bind(p.linkedin.as_deref())
        .bind(p.bio.as_deref())
        .bind(p.website.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(user_insert_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_identity(&self, identity: &FederatedIdentity) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider = $1 AND provider_user_id = $2"
        ))
        .bind(identity.provider.id())
        .bind(&identity.provider_user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_identity(&self, identity: &FederatedIdentity) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE provider = $1 AND provider_user_id = $2)",
        )
        .bind(identity.provider.id())
        .bind(&identity.provider_user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let p = &user.profile;

        let result = sqlx::query(
            r#"
            UPDATE users SET
                email_verified = $2,
                role = $3,
                is_onboarded = $4,
                full_name = $5,
                first_name = $6,
                last_name = $7,
                image = $8,
                position = $9,
                branch = $10,
                graduation_date = $11,
                github = $12,
                linkedin = $13,
                bio = $14,
                website = $15,
                updated_at = $16
            WHERE id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email_verified)
        .bind(user.role.id())
        .bind(user.is_onboarded)
        .bind(p.full_name.as_deref())
        .bind(p.first_name.as_deref())
        .bind(p.last_name.as_deref())
        .bind(p.image.as_deref())
        .bind(p.position.map(|v| v.id()))
        .bind(p.branch.map(|v| v.id()))
        .bind(p.graduation_date)
        .bind(p.github.as_deref())
        .bind(p.linkedin.as_deref())
        .bind(p.bio.as_deref())
        .bind(p.website.as_deref())
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        // refresh_tokens rows go with the user (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn create_session(&self, session: &RefreshSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (
                token,
                user_id,
                issued_at,
                expires_at,
                ip_address,
                user_agent
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&session.token)
        .bind(session.user_id.as_uuid())
        .bind(session.issued_at)
        .bind(session.expires_at)
        .bind(session.ip_address.as_deref())
        .bind(session.user_agent.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, token: &str) -> AuthResult<Option<RefreshSession>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT
                token,
                user_id,
                issued_at,
                expires_at,
                ip_address,
                user_agent
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshTokenRow::into_session))
    }

    async fn delete_session(&self, token: &str) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_all_sessions(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

fn identity_columns(identity: Option<&FederatedIdentity>) -> (Option<i16>, Option<&str>) {
    match identity {
        Some(identity) => (
            Some(identity.provider.id()),
            Some(identity.provider_user_id.as_str()),
        ),
        None => (None, None),
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: Option<String>,
    email_verified: bool,
    password_hash: Option<String>,
    provider: Option<i16>,
    provider_user_id: Option<String>,
    role: i16,
    is_onboarded: bool,
    full_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    image: Option<String>,
    position: Option<i16>,
    branch: Option<i16>,
    graduation_date: Option<NaiveDate>,
    github: Option<String>,
    linkedin: Option<String>,
    bio: Option<String>,
    website: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;

        let identity = match (self.provider, self.provider_user_id) {
            (Some(provider), Some(provider_user_id)) => {
                let provider = OAuthProvider::from_id(provider).ok_or_else(|| {
                    AuthError::Internal(format!("Invalid provider id: {provider}"))
                })?;
                Some(FederatedIdentity::new(provider, provider_user_id))
            }
            _ => None,
        };

        Ok(User {
            user_id: UserId::from_uuid(self.id),
            email: self.email.map(Email::from_db),
            email_verified: self.email_verified,
            password_hash: self.password_hash.map(UserPassword::from_db),
            identity,
            role,
            is_onboarded: self.is_onboarded,
            profile: UserProfile {
                full_name: self.full_name,
                first_name: self.first_name,
                last_name: self.last_name,
                image: self.image,
                position: self.position.and_then(Position::from_id),
                branch: self.branch.and_then(Branch::from_id),
                graduation_date: self.graduation_date,
                github: self.github,
                linkedin: self.linkedin,
                bio: self.bio,
                website: self.website,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl RefreshTokenRow {
    fn into_session(self) -> RefreshSession {
        RefreshSession {
            token: self.token,
            user_id: UserId::from_uuid(self.user_id),
            issued_at: self.issued_at,
            expires_at: self.expires_at,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
        }
    }
}
