//! OAuth Federation (GitHub, Google)
//!
//! Provider clients are built once from [`OAuthSettings`] at startup. A
//! provider without credentials stays `None` and reports
//! `ProviderNotInitialized`.
//!
//! Upstream JSON shapes differ; [`normalize_profile`] turns both into one
//! [`OAuthProfile`] so nothing downstream branches on the provider again.

use std::time::Duration;

use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde_json::Value;
use thiserror::Error;

use crate::application::config::{OAuthClientCredentials, OAuthSettings};
use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::domain::federation::FederationResolver;
use crate::domain::value_object::oauth_provider::OAuthProvider;
use crate::error::{AuthError, AuthResult};

/// Upper bound on each call to a provider
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// GitHub rejects API calls without a User-Agent
const USER_AGENT: &str = concat!("campus-api/", env!("CARGO_PKG_VERSION"));

/// OAuth client type with auth URL, token URL and redirect URL set.
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

#[derive(Debug, Error)]
pub enum FederationSetupError {
    #[error("invalid OAuth URL: {0}")]
    InvalidUrl(#[from] oauth2::url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// HTTP-backed federation resolver
pub struct OAuthFederation {
    github: Option<ConfiguredClient>,
    google: Option<ConfiguredClient>,
    http: reqwest::Client,
}

impl OAuthFederation {
    pub fn new(settings: &OAuthSettings) -> Result<Self, FederationSetupError> {
        let base = settings.redirect_base_url.trim_end_matches('/');

        let github = settings
            .github
            .as_ref()
            .map(|creds| build_client(OAuthProvider::Github, creds, base))
            .transpose()?;
        let google = settings
            .google
            .as_ref()
            .map(|creds| build_client(OAuthProvider::Google, creds, base))
            .transpose()?;

        // Following redirects during the token exchange would leak the code
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(PROVIDER_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        tracing::info!(
            github = github.is_some(),
            google = google.is_some(),
            "OAuth providers initialized"
        );

        Ok(Self {
            github,
            google,
            http,
        })
    }

    fn client(&self, provider: OAuthProvider) -> AuthResult<&ConfiguredClient> {
        let client = match provider {
            OAuthProvider::Github => self.github.as_ref(),
            OAuthProvider::Google => self.google.as_ref(),
        };
        client.ok_or_else(|| AuthError::ProviderNotInitialized(provider.to_string()))
    }

    async fn fetch_profile_json(
        &self,
        provider: OAuthProvider,
        access_token: &str,
    ) -> Result<Value, reqwest::Error> {
        self.http
            .get(provider.userinfo_url())
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
}

fn build_client(
    provider: OAuthProvider,
    creds: &OAuthClientCredentials,
    redirect_base: &str,
) -> Result<ConfiguredClient, FederationSetupError> {
    let redirect = format!("{redirect_base}/auth/{provider}/callback");

    Ok(BasicClient::new(ClientId::new(creds.client_id.clone()))
        .set_client_secret(ClientSecret::new(creds.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(provider.auth_url().to_string())?)
        .set_token_uri(TokenUrl::new(provider.token_url().to_string())?)
        .set_redirect_uri(RedirectUrl::new(redirect)?))
}

impl FederationResolver for OAuthFederation {
    fn authorization_url(&self, provider: OAuthProvider, state: &str) -> AuthResult<String> {
        let client = self.client(provider)?;

        let mut request = client.authorize_url(|| CsrfToken::new(state.to_string()));
        for scope in provider.scopes() {
            request = request.add_scope(Scope::new((*scope).to_string()));
        }
        let (url, _state) = request.url();

        Ok(url.to_string())
    }

    async fn exchange_and_fetch_profile(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> AuthResult<OAuthProfile> {
        let client = self.client(provider)?;

        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| {
                tracing::warn!(provider = %provider, error = %e, "OAuth code exchange failed");
                AuthError::ExchangeFailed(provider.to_string())
            })?;

        let json = self
            .fetch_profile_json(provider, token.access_token().secret())
            .await
            .map_err(|e| {
                tracing::warn!(provider = %provider, error = %e, "OAuth profile fetch failed");
                AuthError::ProfileFetchFailed(provider.to_string())
            })?;

        normalize_profile(provider, &json).map_err(|reason| {
            tracing::warn!(provider = %provider, reason, "OAuth profile unusable");
            AuthError::ProfileFetchFailed(provider.to_string())
        })
    }
}

/// Map a provider's "who am I" payload to the canonical profile.
///
/// The provider user id is mandatory; everything else degrades to absent.
pub fn normalize_profile(
    provider: OAuthProvider,
    json: &Value,
) -> Result<OAuthProfile, &'static str> {
    let provider_user_id = match provider {
        // GitHub ids are numbers
        OAuthProvider::Github => match json.get("id") {
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err("missing numeric id"),
        },
        OAuthProvider::Google => match json.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err("missing id"),
        },
    };

    let name = match provider {
        OAuthProvider::Github => non_empty(json, "name").or_else(|| non_empty(json, "login")),
        OAuthProvider::Google => non_empty(json, "name"),
    }
    .unwrap_or_default();

    let avatar_url = match provider {
        OAuthProvider::Github => non_empty(json, "avatar_url"),
        OAuthProvider::Google => non_empty(json, "picture"),
    };

    Ok(OAuthProfile {
        provider_user_id,
        name,
        email: non_empty(json, "email"),
        avatar_url,
        provider,
    })
}

fn non_empty(json: &Value, key: &str) -> Option<String> {
    json.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
