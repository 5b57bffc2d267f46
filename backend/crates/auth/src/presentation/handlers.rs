//! HTTP Handlers

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde::de::DeserializeOwned;

use platform::client::ClientMetadata;
use platform::cookie::{CookieConfig, SameSite, extract_cookie};
use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::session::LoginOutput;
use crate::application::token::TokenService;
use crate::application::{
    CompleteRegistrationInput, CompleteRegistrationUseCase, ManageUserUseCase,
    OAuthCallbackInput, OAuthCallbackOutcome, OAuthUseCase, RefreshUseCase, RegisterInput,
    RegisterUseCase, SignInInput, SignInUseCase, SignOutUseCase, VerifyEmailUseCase,
};
use crate::domain::federation::FederationResolver;
use crate::domain::notifier::VerificationNotifier;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::infra::notifier::TracingNotifier;
use crate::presentation::dto::{
    AccessTokenResponse, AuthResponse, CompleteRegistrationRequest, LoginRequest,
    MessageResponse, OAuthCallbackQuery, PublicUser, RegisterRequest,
    RegistrationRequiredResponse, UpdateUserRequest, VerifyEmailQuery,
};
use crate::presentation::middleware::AuthContext;

/// Shared state for auth handlers
pub struct AuthAppState<R, F>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub federation: Arc<F>,
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
    pub notifier: Arc<dyn VerificationNotifier>,
    pub config: Arc<AuthConfig>,
}

impl<R, F> AuthAppState<R, F>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    /// Token service and hasher are derived from `config`; verification
    /// notices go to the log until [`Self::with_notifier`] replaces it.
    pub fn new(repo: R, federation: F, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            federation: Arc::new(federation),
            tokens: Arc::new(TokenService::new(&config)),
            hasher: Arc::new(PasswordHasher::new(config.pepper())),
            notifier: Arc::new(TracingNotifier),
            config: Arc::new(config),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn VerificationNotifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

// Manual impl: only the Arcs are cloned, R and F need not be Clone
impl<R, F> Clone for AuthAppState<R, F>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            federation: self.federation.clone(),
            tokens: self.tokens.clone(),
            hasher: self.hasher.clone(),
            notifier: self.notifier.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// IP and User-Agent of the caller. The socket address is only available
/// when the server runs with `into_make_service_with_connect_info`.
pub struct ClientInfo(pub ClientMetadata);

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let direct_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.ip());
        Ok(Self(ClientMetadata::from_headers(&parts.headers, direct_ip)))
    }
}

/// JSON body whose rejection is the API's uniform 400
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                Err(AuthError::BadRequest("Invalid request format".to_string()))
            }
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// POST /auth/register
pub async fn register<R, F>(
    State(state): State<AuthAppState<R, F>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
        state.notifier.clone(),
    );

    let user = use_case
        .execute(RegisterInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

/// POST /auth/login
pub async fn login<R, F>(
    State(state): State<AuthAppState<R, F>>,
    ClientInfo(client): ClientInfo,
    JsonBody(req): JsonBody<LoginRequest>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(
            SignInInput {
                email: req.email,
                password: req.password,
            },
            &client,
        )
        .await?;

    let (cookie, body) = login_parts(&state.config, output);
    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)).into_response())
}

/// PATCH /auth/refresh
pub async fn refresh<R, F>(
    State(state): State<AuthAppState<R, F>>,
    headers: HeaderMap,
) -> AuthResult<Json<AccessTokenResponse>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = RefreshUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let access = use_case.execute(token.as_deref()).await?;

    Ok(Json(AccessTokenResponse {
        access_token: access.token,
    }))
}

/// POST /auth/logout
pub async fn logout<R, F>(
    State(state): State<AuthAppState<R, F>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    SignOutUseCase::new(state.repo.clone())
        .execute(token.as_deref())
        .await?;

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            refresh_cookie(&state.config).build_delete_cookie(),
        )]),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// POST /auth/logoutAll (access token required)
pub async fn logout_all<R, F>(
    State(state): State<AuthAppState<R, F>>,
    auth: AuthContext,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    SignOutUseCase::new(state.repo.clone())
        .execute_all(&auth.user_id)
        .await?;

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            refresh_cookie(&state.config).build_delete_cookie(),
        )]),
        Json(MessageResponse::new(
            "All sessions have been logged out successfully",
        )),
    ))
}

/// GET /auth/verify-email?token=
pub async fn verify_email<R, F>(
    State(state): State<AuthAppState<R, F>>,
    Query(query): Query<VerifyEmailQuery>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::BadRequest("Missing token parameter".to_string()))?;

    VerifyEmailUseCase::new(state.repo.clone(), state.tokens.clone())
        .execute(&token)
        .await?;

    Ok(Json(MessageResponse::new("Email verified successfully")))
}

// ============================================================================
// OAuth
// ============================================================================

/// GET /auth/{provider}/login
pub async fn oauth_login<R, F>(
    State(state): State<AuthAppState<R, F>>,
    Path(provider): Path<String>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let initiation = oauth_use_case(&state).initiate(&provider)?;

    let max_age = i64::try_from(state.config.oauth_state_ttl.as_secs()).unwrap_or(i64::MAX);
    let cookie = oauth_state_cookie(&state.config).build_set_cookie(
        &initiation.state,
        None,
        Some(max_age),
    );

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::temporary(&initiation.authorization_url),
    ))
}

/// GET /auth/{provider}/callback?code=&state=
///
/// The state cookie is single-use and is cleared whatever the outcome.
pub async fn oauth_callback<R, F>(
    State(state): State<AuthAppState<R, F>>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
    ClientInfo(client): ClientInfo,
    headers: HeaderMap,
) -> Response
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let clear_state = oauth_state_cookie(&state.config).build_delete_cookie();

    let input = OAuthCallbackInput {
        provider,
        code: query.code,
        state: query.state,
        expected_state: extract_cookie(&headers, &state.config.oauth_state_cookie_name),
    };

    match oauth_use_case(&state).callback(input, &client).await {
        Ok(OAuthCallbackOutcome::Authenticated(output)) => {
            let (cookie, body) = login_parts(&state.config, output);
            (
                AppendHeaders([
                    (header::SET_COOKIE, cookie),
                    (header::SET_COOKIE, clear_state),
                ]),
                Json(body),
            )
                .into_response()
        }
        Ok(OAuthCallbackOutcome::RegistrationRequired {
            temp_token,
            profile,
        }) => (
            AppendHeaders([(header::SET_COOKIE, clear_state)]),
            Json(RegistrationRequiredResponse::new(temp_token, profile)),
        )
            .into_response(),
        Err(e) => (AppendHeaders([(header::SET_COOKIE, clear_state)]), e).into_response(),
    }
}

/// POST /auth/complete-registration
pub async fn complete_registration<R, F>(
    State(state): State<AuthAppState<R, F>>,
    ClientInfo(client): ClientInfo,
    JsonBody(req): JsonBody<CompleteRegistrationRequest>,
) -> AuthResult<Response>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let use_case = CompleteRegistrationUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.tokens.clone(),
    );

    let output = use_case
        .execute(
            CompleteRegistrationInput {
                temp_token: req.temp_token,
                first_name: req.first_name,
                last_name: req.last_name,
                position: req.position,
                branch: req.branch,
                graduation_date: req.graduation_date,
            },
            &client,
        )
        .await?;

    let (cookie, body) = login_parts(&state.config, output);
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(body),
    )
        .into_response())
}

// ============================================================================
// Users (access token required)
// ============================================================================

/// GET /users/me
pub async fn get_me<R, F>(
    State(state): State<AuthAppState<R, F>>,
    auth: AuthContext,
) -> AuthResult<Json<PublicUser>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let user = ManageUserUseCase::new(state.repo.clone())
        .get_me(&auth.user_id)
        .await?;

    Ok(Json(PublicUser::from(&user)))
}

/// PATCH /users/{id}
pub async fn update_user<R, F>(
    State(state): State<AuthAppState<R, F>>,
    auth: AuthContext,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> AuthResult<Json<PublicUser>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let user = ManageUserUseCase::new(state.repo.clone())
        .update(&auth.user_id, &id, req.into())
        .await?;

    Ok(Json(PublicUser::from(&user)))
}

/// DELETE /users/{id}
pub async fn delete_user<R, F>(
    State(state): State<AuthAppState<R, F>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    ManageUserUseCase::new(state.repo.clone())
        .delete(&auth.user_id, &id)
        .await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn oauth_use_case<R, F>(state: &AuthAppState<R, F>) -> OAuthUseCase<R, R, F>
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    OAuthUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.federation.clone(),
        state.tokens.clone(),
    )
}

fn refresh_cookie(config: &AuthConfig) -> CookieConfig {
    CookieConfig::new(
        &config.refresh_cookie_name,
        config.cookie_secure,
        config.cookie_same_site,
    )
}

/// Lax so the cookie survives the top-level redirect back from the provider
fn oauth_state_cookie(config: &AuthConfig) -> CookieConfig {
    CookieConfig::new(
        &config.oauth_state_cookie_name,
        config.cookie_secure,
        SameSite::Lax,
    )
}

/// Refresh cookie (expiring with the session) and the response body
fn login_parts(config: &AuthConfig, output: LoginOutput) -> (String, AuthResponse) {
    let refresh = &output.session.refresh;
    let cookie =
        refresh_cookie(config).build_set_cookie(&refresh.token, Some(refresh.expires_at), None);

    let body = AuthResponse {
        access_token: output.session.access.token,
        user: PublicUser::from(&output.user),
    };

    (cookie, body)
}
