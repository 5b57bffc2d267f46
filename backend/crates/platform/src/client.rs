//! Client identification utilities
//!
//! Advisory request metadata recorded alongside sessions. Nothing here is
//! used for access decisions.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

/// Longest User-Agent we keep
pub const MAX_USER_AGENT_LENGTH: usize = 512;

/// Client metadata derived from request headers and the socket address
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    /// From X-Forwarded-For or the direct connection
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl ClientMetadata {
    pub fn from_headers(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Self {
        Self {
            ip: extract_client_ip(headers, direct_ip),
            user_agent: extract_user_agent(headers),
        }
    }

    /// IP as string (for database storage)
    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

/// User-Agent header, truncated to [`MAX_USER_AGENT_LENGTH`] characters
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LENGTH).collect())
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For first (first hop), then falls back to the direct
/// connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}
