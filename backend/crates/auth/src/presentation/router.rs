//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::application::config::AuthConfig;
use crate::domain::federation::FederationResolver;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::infra::oauth::OAuthFederation;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_access_token;

/// Create the Auth router with PostgreSQL repository and HTTP federation
pub fn auth_router(
    repo: PgAuthRepository,
    federation: OAuthFederation,
    config: AuthConfig,
) -> Router {
    auth_router_generic(AuthAppState::new(repo, federation, config))
}

/// Create the `/auth` and `/users` routes for any repository and resolver
pub fn auth_router_generic<R, F>(state: AuthAppState<R, F>) -> Router
where
    R: UserRepository + SessionRepository + Send + Sync + 'static,
    F: FederationResolver + Send + Sync + 'static,
{
    let require_access =
        middleware::from_fn_with_state(state.tokens.clone(), require_access_token);

    let public = Router::new()
        .route("/auth/register", post(handlers::register::<R, F>))
        .route("/auth/login", post(handlers::login::<R, F>))
        .route("/auth/refresh", patch(handlers::refresh::<R, F>))
        .route("/auth/logout", post(handlers::logout::<R, F>))
        .route(
            "/auth/complete-registration",
            post(handlers::complete_registration::<R, F>),
        )
        .route("/auth/verify-email", get(handlers::verify_email::<R, F>))
        .route("/auth/{provider}/login", get(handlers::oauth_login::<R, F>))
        .route(
            "/auth/{provider}/callback",
            get(handlers::oauth_callback::<R, F>),
        );

    let protected = Router::new()
        .route("/auth/logoutAll", post(handlers::logout_all::<R, F>))
        .route("/users/me", get(handlers::get_me::<R, F>))
        .route(
            "/users/{id}",
            patch(handlers::update_user::<R, F>).delete(handlers::delete_user::<R, F>),
        )
        .route_layer(require_access);

    public.merge(protected).with_state(state)
}
