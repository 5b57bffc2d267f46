//! OAuth Profile
//!
//! Canonical shape of a federated identity after provider-specific JSON has
//! been normalized. Only ever held in memory or inside a signed registration
//! token; never persisted as-is.

use serde::{Deserialize, Serialize};

use crate::domain::value_object::oauth_provider::{FederatedIdentity, OAuthProvider};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthProfile {
    pub provider_user_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub provider: OAuthProvider,
}

impl OAuthProfile {
    pub fn identity(&self) -> FederatedIdentity {
        FederatedIdentity::new(self.provider, self.provider_user_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let profile = OAuthProfile {
            provider_user_id: "12345".into(),
            name: "octocat".into(),
            email: None,
            avatar_url: None,
            provider: OAuthProvider::Github,
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "provider_user_id": "12345",
                "name": "octocat",
                "provider": "github"
            })
        );
        assert_eq!(profile.identity().provider_user_id, "12345");
    }
}
