//! Cookie Management
//!
//! Set-Cookie construction and Cookie header parsing. Values are written
//! verbatim, so callers only pass URL-safe tokens.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl std::str::FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite policy: {other}")),
        }
    }
}

/// Cookie attributes shared by every Set-Cookie built for one cookie name
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl CookieConfig {
    /// HttpOnly cookie on `/` with the given name
    pub fn new(name: impl Into<String>, secure: bool, same_site: SameSite) -> Self {
        Self {
            name: name.into(),
            secure,
            http_only: true,
            same_site,
            path: "/".to_string(),
        }
    }

    /// Build a Set-Cookie value.
    ///
    /// `expires_at` becomes an `Expires` attribute, `max_age_secs` a `Max-Age`
    /// attribute. With neither the cookie lives for the browser session.
    pub fn build_set_cookie(
        &self,
        value: &str,
        expires_at: Option<DateTime<Utc>>,
        max_age_secs: Option<i64>,
    ) -> String {
        let mut cookie = format!("{}={}", self.name, value);
        cookie.push_str(&format!("; Path={}", self.path));

        if let Some(expires_at) = expires_at {
            cookie.push_str(&format!("; Expires={}", http_date(expires_at)));
        }
        if let Some(max_age) = max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        self.push_flags(&mut cookie);

        cookie
    }

    /// Build a Set-Cookie value that makes the browser drop the cookie now
    pub fn build_delete_cookie(&self) -> String {
        let mut cookie = format!(
            "{}=; Path={}; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0",
            self.name, self.path
        );
        self.push_flags(&mut cookie);
        cookie
    }

    fn push_flags(&self, cookie: &mut String) {
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
    }
}

/// IMF-fixdate as required by the `Expires` attribute
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Extract a cookie value from headers
///
/// Looks through every `Cookie` header, not only the first one.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
