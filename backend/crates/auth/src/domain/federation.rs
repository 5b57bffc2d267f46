//! Federation Resolver Trait
//!
//! Turns a provider authorization code into a normalized [`OAuthProfile`].
//! The HTTP implementation lives in `infra::oauth`.

use crate::domain::entity::oauth_profile::OAuthProfile;
use crate::domain::value_object::oauth_provider::OAuthProvider;
use crate::error::AuthResult;

#[trait_variant::make(FederationResolver: Send)]
pub trait LocalFederationResolver {
    /// Consent-screen URL carrying the caller's anti-CSRF `state`.
    /// Fails with `ProviderNotInitialized` when the provider has no client.
    fn authorization_url(&self, provider: OAuthProvider, state: &str) -> AuthResult<String>;

    /// Exchange the code for a provider access token, then fetch and
    /// normalize the provider's profile.
    async fn exchange_and_fetch_profile(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> AuthResult<OAuthProfile>;
}
