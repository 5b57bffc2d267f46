//! Server Settings
//!
//! Everything the server reads from its environment, resolved once at
//! startup. Missing signing secrets are startup errors.

use std::net::SocketAddr;

use anyhow::{Context, bail};
use auth::{AuthConfig, OAuthClientCredentials, OAuthSettings, RoleSource};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
const DEFAULT_REDIRECT_BASE: &str = "http://localhost:31113";

#[derive(Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub oauth: OAuthSettings,
}

impl Settings {
    /// Read from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).with_context(|| format!("{key} must be set"));

        let database_url = require("DATABASE_URL")?;

        let access_secret = require("JWT_ACCESS_SECRET")?;
        let refresh_secret = require("JWT_REFRESH_SECRET")?;
        if access_secret == refresh_secret {
            bail!("JWT_ACCESS_SECRET and JWT_REFRESH_SECRET must differ");
        }

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = get("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(value) => parse_bool(&value).context("COOKIE_SECURE must be true or false")?,
            None => true,
        };

        let refresh_role_source = match get("REFRESH_ROLE_SOURCE") {
            Some(value) => value
                .parse::<RoleSource>()
                .map_err(anyhow::Error::msg)
                .context("REFRESH_ROLE_SOURCE")?,
            None => RoleSource::default(),
        };

        let auth = AuthConfig {
            access_secret: access_secret.into_bytes(),
            refresh_secret: refresh_secret.into_bytes(),
            registration_secret: get("JWT_REGISTRATION_SECRET").map(String::into_bytes),
            cookie_secure,
            password_pepper: get("PASSWORD_PEPPER").map(String::into_bytes),
            refresh_role_source,
            ..AuthConfig::default()
        };

        let oauth = OAuthSettings {
            redirect_base_url: get("OAUTH_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_REDIRECT_BASE.to_string()),
            github: client_credentials(&get, "GITHUB")?,
            google: client_credentials(&get, "GOOGLE")?,
        };

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth,
            oauth,
        })
    }
}

/// `{PREFIX}_CLIENT_ID` and `{PREFIX}_CLIENT_SECRET`: both or neither
fn client_credentials<G>(get: &G, prefix: &str) -> anyhow::Result<Option<OAuthClientCredentials>>
where
    G: Fn(&str) -> Option<String>,
{
    let id_key = format!("{prefix}_CLIENT_ID");
    let secret_key = format!("{prefix}_CLIENT_SECRET");

    match (get(&id_key), get(&secret_key)) {
        (Some(client_id), Some(client_secret)) => Ok(Some(OAuthClientCredentials {
            client_id,
            client_secret,
        })),
        (None, None) => Ok(None),
        _ => bail!("{id_key} and {secret_key} must be set together"),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
