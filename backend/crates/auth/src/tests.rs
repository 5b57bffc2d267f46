//! Crate-level tests for the auth flows
//!
//! HTTP tests drive the full router over the in-memory repository with a
//! stub federation resolver, so nothing touches Postgres or the network.

#[cfg(test)]
mod support {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, Method, Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::config::AuthConfig;
    use crate::application::token::TokenService;
    use crate::domain::entity::oauth_profile::OAuthProfile;
    use crate::domain::federation::FederationResolver;
    use crate::domain::notifier::{NotifyError, VerificationNotifier};
    use crate::domain::value_object::email::Email;
    use crate::domain::value_object::oauth_provider::OAuthProvider;
    use crate::error::{AuthError, AuthResult};
    use crate::infra::memory::InMemoryAuthRepository;
    use crate::presentation::{AuthAppState, auth_router_generic};

    pub const VALID_CODE: &str = "valid-code";
    pub const PASSWORD: &str = "Secret123!";

    /// Accepts exactly one code and answers with a fixed profile
    pub struct StubFederation {
        pub profile: OAuthProfile,
    }

    impl FederationResolver for StubFederation {
        fn authorization_url(&self, provider: OAuthProvider, state: &str) -> AuthResult<String> {
            Ok(format!("https://{provider}.provider.test/authorize?state={state}"))
        }

        async fn exchange_and_fetch_profile(
            &self,
            provider: OAuthProvider,
            code: &str,
        ) -> AuthResult<OAuthProfile> {
            if code != VALID_CODE {
                return Err(AuthError::ExchangeFailed(provider.to_string()));
            }
            Ok(OAuthProfile {
                provider,
                ..self.profile.clone()
            })
        }
    }

    /// Remembers every (recipient, token) handed to it; fails on demand
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String)>>,
        pub unreachable: AtomicBool,
    }

    impl VerificationNotifier for RecordingNotifier {
        fn notify(&self, recipient: &Email, token: &str) -> Result<(), NotifyError> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(NotifyError("mail relay unreachable".to_string()));
            }
            self.sent
                .lock()
                .map_err(|e| NotifyError(e.to_string()))?
                .push((recipient.as_str().to_string(), token.to_string()));
            Ok(())
        }
    }

    pub fn github_profile() -> OAuthProfile {
        OAuthProfile {
            provider_user_id: "583231".to_string(),
            name: "Octo Cat".to_string(),
            email: Some("octo@campus.edu".to_string()),
            avatar_url: Some("https://avatars.test/583231".to_string()),
            provider: OAuthProvider::Github,
        }
    }

    pub struct TestApp {
        pub router: Router,
        pub repo: InMemoryAuthRepository,
        pub tokens: TokenService,
        pub notifier: Arc<RecordingNotifier>,
    }

    impl TestApp {
        pub fn new() -> Self {
            let config = AuthConfig::development();
            let repo = InMemoryAuthRepository::new();
            let tokens = TokenService::new(&config);
            let notifier = Arc::new(RecordingNotifier::default());

            let federation = StubFederation {
                profile: github_profile(),
            };
            let state = AuthAppState::new(repo.clone(), federation, config)
                .with_notifier(notifier.clone());

            Self {
                router: auth_router_generic(state),
                repo,
                tokens,
                notifier,
            }
        }

        pub async fn send(&self, req: Request<Body>) -> TestResponse {
            let response = self.router.clone().oneshot(req).await.unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            TestResponse {
                status,
                headers,
                body,
                raw: String::from_utf8_lossy(&bytes).into_owned(),
            }
        }

        pub async fn register(&self, email: &str) -> TestResponse {
            self.send(json_request(
                Method::POST,
                "/auth/register",
                &serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await
        }

        pub async fn login(&self, email: &str) -> TestResponse {
            self.send(json_request(
                Method::POST,
                "/auth/login",
                &serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await
        }

        /// Register then log in; returns (access token, refresh token)
        pub async fn signed_in(&self, email: &str) -> (String, String) {
            assert_eq!(self.register(email).await.status, StatusCode::CREATED);
            let login = self.login(email).await;
            assert_eq!(login.status, StatusCode::OK);
            let access = login.body["accessToken"].as_str().unwrap().to_string();
            let refresh = login.cookie("refresh_token").unwrap();
            (access, refresh)
        }

        pub async fn refresh(&self, refresh_token: &str) -> TestResponse {
            self.send(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/auth/refresh")
                    .header(header::COOKIE, format!("refresh_token={refresh_token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
        }
    }

    pub struct TestResponse {
        pub status: StatusCode,
        pub headers: HeaderMap,
        pub body: Value,
        pub raw: String,
    }

    impl TestResponse {
        /// Full Set-Cookie line for `name`
        pub fn set_cookie(&self, name: &str) -> Option<String> {
            let prefix = format!("{name}=");
            self.headers
                .get_all(header::SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find(|v| v.starts_with(&prefix))
                .map(str::to_string)
        }

        /// Value of a non-empty Set-Cookie for `name`
        pub fn cookie(&self, name: &str) -> Option<String> {
            let line = self.set_cookie(name)?;
            let (_, value) = line.split(';').next()?.split_once('=')?;
            (!value.is_empty()).then(|| value.to_string())
        }

        pub fn error(&self) -> &str {
            self.body["error"].as_str().unwrap_or_default()
        }
    }

    pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::USER_AGENT, "auth-tests/1.0")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn bearer_request(
        method: Method,
        uri: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub fn oauth_callback(code: &str, state: &str, cookie_state: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(format!("/auth/github/callback?code={code}&state={state}"));
        if let Some(cookie_state) = cookie_state {
            builder = builder.header(header::COOKIE, format!("oauth_state={cookie_state}"));
        }
        builder.body(Body::empty()).unwrap()
    }
}

#[cfg(test)]
mod password_tests {
    use platform::password::{ClearTextPassword, PasswordHasher};

    #[test]
    fn test_hash_verify_round_trip() {
        let hasher = PasswordHasher::default();

        for raw in ["Secret123!", "correct horse battery staple", "pässwörd-ünïcode-9"] {
            let hash = hasher
                .hash(&ClearTextPassword::for_verification(raw.to_string()))
                .unwrap();

            assert!(hasher.verify(&hash, &ClearTextPassword::for_verification(raw.to_string())));
            assert!(!hasher.verify(
                &hash,
                &ClearTextPassword::for_verification(format!("{raw}x"))
            ));
        }
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = PasswordHasher::default();
        let password = ClearTextPassword::for_verification("Secret123!".to_string());
        let a = hasher.hash(&password).unwrap();
        let b = hasher.hash(&password).unwrap();
        assert_ne!(a.as_phc_string(), b.as_phc_string());
    }
}

#[cfg(test)]
mod token_tests {
    use crate::application::config::AuthConfig;
    use crate::application::token::TokenService;
    use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

    #[test]
    fn test_tokens_validate_only_with_matching_secret() {
        let tokens = TokenService::new(&AuthConfig::with_random_secrets());
        let user_id = UserId::new();

        let access = tokens.issue_access(&user_id, UserRole::Admin).unwrap();
        let claims = tokens.validate_access(&access.token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, UserRole::Admin);
        assert!(tokens.validate_refresh(&access.token).is_err());

        let refresh = tokens.issue_refresh(&user_id, UserRole::User).unwrap();
        let claims = tokens.validate_refresh(&refresh.token).unwrap();
        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.role, UserRole::User);
        assert!(tokens.validate_access(&refresh.token).is_err());
    }

    #[test]
    fn test_tokens_from_another_deployment_rejected() {
        let ours = TokenService::new(&AuthConfig::with_random_secrets());
        let theirs = TokenService::new(&AuthConfig::with_random_secrets());

        let access = theirs.issue_access(&UserId::new(), UserRole::User).unwrap();
        assert!(ours.validate_access(&access.token).is_err());
    }
}

#[cfg(test)]
mod register_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::support::*;

    #[tokio::test]
    async fn test_register_conflict_and_uniform_login_failure() {
        let app = TestApp::new();

        let created = app.register("a@x.edu").await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body["email"], "a@x.edu");
        assert!(!created.raw.contains(PASSWORD));
        assert!(!created.raw.contains("password"));
        assert!(!created.raw.contains("argon2"));

        let duplicate = app.register("a@x.edu").await;
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
        assert_eq!(duplicate.error(), "Email already registered");

        let wrong_password = app
            .send(json_request(
                Method::POST,
                "/auth/login",
                &json!({ "email": "a@x.edu", "password": "Wrong123!" }),
            ))
            .await;
        let unknown_email = app
            .send(json_request(
                Method::POST,
                "/auth/login",
                &json!({ "email": "nobody@x.edu", "password": PASSWORD }),
            ))
            .await;

        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.body, unknown_email.body);
        assert_eq!(wrong_password.error(), "Invalid credentials");
        assert!(wrong_password.set_cookie("refresh_token").is_none());
    }

    #[tokio::test]
    async fn test_register_field_errors() {
        let app = TestApp::new();

        let response = app
            .send(json_request(
                Method::POST,
                "/auth/register",
                &json!({ "email": "not-an-email", "password": "short" }),
            ))
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let errors = response.body["errors"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(app.repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_keys_are_field_errors() {
        let app = TestApp::new();

        let register = app
            .send(json_request(
                Method::POST,
                "/auth/register",
                &json!({ "email": "a@x.edu" }),
            ))
            .await;
        assert_eq!(register.status, StatusCode::BAD_REQUEST);
        assert_eq!(register.body["errors"], json!(["password is required"]));
        assert_eq!(app.repo.user_count().await, 0);

        let login = app
            .send(json_request(
                Method::POST,
                "/auth/login",
                &json!({ "password": PASSWORD }),
            ))
            .await;
        assert_eq!(login.status, StatusCode::BAD_REQUEST);
        assert_eq!(login.body["errors"], json!(["email is required"]));

        let empty = app
            .send(json_request(Method::POST, "/auth/login", &json!({})))
            .await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            empty.body["errors"],
            json!(["email is required", "password is required"])
        );
    }

    #[tokio::test]
    async fn test_registration_survives_notifier_failure() {
        let app = TestApp::new();
        app.notifier
            .unreachable
            .store(true, std::sync::atomic::Ordering::SeqCst);

        let created = app.register("a@x.edu").await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert_eq!(created.body["email_verified"], false);
        assert_eq!(app.repo.user_count().await, 1);
        assert!(app.notifier.sent.lock().unwrap().is_empty());

        assert_eq!(app.login("a@x.edu").await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let app = TestApp::new();

        let response = app
            .send(
                axum::http::Request::builder()
                    .method(Method::POST)
                    .uri("/auth/register")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from("{\"email\":"))
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), "Invalid request format");
    }

    #[tokio::test]
    async fn test_login_sets_refresh_cookie() {
        let app = TestApp::new();
        app.register("a@x.edu").await;

        let login = app.login("A@X.edu").await;
        assert_eq!(login.status, StatusCode::OK);
        assert!(login.body["accessToken"].is_string());
        assert_eq!(login.body["user"]["email"], "a@x.edu");

        let cookie = login.set_cookie("refresh_token").unwrap();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Expires="));

        let sessions = app.repo.session_count().await;
        assert_eq!(sessions, 1);
    }

    #[tokio::test]
    async fn test_email_verification() {
        let app = TestApp::new();
        let (access, _) = app.signed_in("a@x.edu").await;

        let (recipient, token) = app.notifier.sent.lock().unwrap()[0].clone();
        assert_eq!(recipient, "a@x.edu");

        let me = app
            .send(bearer_request(Method::GET, "/users/me", &access, None))
            .await;
        assert_eq!(me.body["email_verified"], false);

        let verified = app
            .send(
                axum::http::Request::builder()
                    .uri(format!("/auth/verify-email?token={token}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(verified.status, StatusCode::OK);
        assert_eq!(verified.body["message"], "Email verified successfully");

        let me = app
            .send(bearer_request(Method::GET, "/users/me", &access, None))
            .await;
        assert_eq!(me.body["email_verified"], true);

        // An access token is not a verification token
        let bogus = app
            .send(
                axum::http::Request::builder()
                    .uri(format!("/auth/verify-email?token={access}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
    }
}

#[cfg(test)]
mod session_tests {
    use axum::http::{Method, StatusCode};

    use super::support::*;
    use crate::domain::value_object::email::Email;
    use crate::domain::repository::UserRepository;

    #[tokio::test]
    async fn test_unpersisted_refresh_token_rejected() {
        let app = TestApp::new();
        app.signed_in("a@x.edu").await;

        let user = app
            .repo
            .find_by_email(&Email::new("a@x.edu").unwrap())
            .await
            .unwrap()
            .unwrap();

        // Correctly signed and unexpired, but never stored
        let orphan = app.tokens.issue_refresh(&user.user_id, user.role).unwrap();
        let response = app.refresh(&orphan.token).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_refresh_without_cookie() {
        let app = TestApp::new();

        let response = app
            .send(
                axum::http::Request::builder()
                    .method(Method::PATCH)
                    .uri("/auth/refresh")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error(), "Refresh token is required");
    }

    #[tokio::test]
    async fn test_refresh_is_repeatable() {
        let app = TestApp::new();
        let (_, refresh) = app.signed_in("a@x.edu").await;

        let first = app.refresh(&refresh).await;
        let second = app.refresh(&refresh).await;
        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(second.status, StatusCode::OK);

        // No rotation: the refresh cookie is left alone
        assert!(first.set_cookie("refresh_token").is_none());

        let a = app
            .tokens
            .validate_access(first.body["accessToken"].as_str().unwrap())
            .unwrap();
        let b = app
            .tokens
            .validate_access(second.body["accessToken"].as_str().unwrap())
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_logout_revokes_only_that_session() {
        let app = TestApp::new();
        let (_, laptop) = app.signed_in("a@x.edu").await;
        let phone = app.login("a@x.edu").await.cookie("refresh_token").unwrap();
        assert_ne!(laptop, phone);

        let logout = app
            .send(
                axum::http::Request::builder()
                    .method(Method::POST)
                    .uri("/auth/logout")
                    .header("cookie", format!("refresh_token={laptop}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(logout.status, StatusCode::OK);
        assert_eq!(logout.body["message"], "Logged out successfully");
        let cleared = logout.set_cookie("refresh_token").unwrap();
        assert!(cleared.contains("Max-Age=0"));

        assert_eq!(app.refresh(&laptop).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.refresh(&phone).await.status, StatusCode::OK);

        let user = app
            .repo
            .find_by_email(&Email::new("a@x.edu").unwrap())
            .await
            .unwrap()
            .unwrap();
        let remaining = app.repo.sessions_for(&user.user_id).await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token, phone);

        // Second logout with the same token finds nothing
        let again = app
            .send(
                axum::http::Request::builder()
                    .method(Method::POST)
                    .uri("/auth/logout")
                    .header("cookie", format!("refresh_token={laptop}"))
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(again.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_all_then_login_again() {
        let app = TestApp::new();
        let (access, laptop) = app.signed_in("a@x.edu").await;
        let phone = app.login("a@x.edu").await.cookie("refresh_token").unwrap();
        let (_, other_user) = app.signed_in("b@x.edu").await;

        let response = app
            .send(bearer_request(Method::POST, "/auth/logoutAll", &access, None))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.body["message"],
            "All sessions have been logged out successfully"
        );

        assert_eq!(app.refresh(&laptop).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.refresh(&phone).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.refresh(&other_user).await.status, StatusCode::OK);

        let fresh = app.login("a@x.edu").await.cookie("refresh_token").unwrap();
        assert_eq!(app.refresh(&fresh).await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_logout_all_requires_access_token() {
        let app = TestApp::new();
        let (_, refresh) = app.signed_in("a@x.edu").await;

        // A refresh token is not an access token
        let response = app
            .send(bearer_request(Method::POST, "/auth/logoutAll", &refresh, None))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.refresh(&refresh).await.status, StatusCode::OK);
    }
}

#[cfg(test)]
mod oauth_tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::json;

    use super::support::*;

    #[tokio::test]
    async fn test_login_redirects_with_state_cookie() {
        let app = TestApp::new();

        let response = app
            .send(
                Request::builder()
                    .uri("/auth/github/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
        let location = response.headers[header::LOCATION].to_str().unwrap();
        assert!(location.starts_with("https://github.provider.test/authorize"));

        let cookie = response.set_cookie("oauth_state").unwrap();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=600"));

        let state = response.cookie("oauth_state").unwrap();
        assert!(location.ends_with(&format!("state={state}")));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let app = TestApp::new();

        let response = app
            .send(
                Request::builder()
                    .uri("/auth/myspace/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), "Unsupported provider");
    }

    #[tokio::test]
    async fn test_callback_requires_matching_state() {
        let app = TestApp::new();

        let missing = app.send(oauth_callback(VALID_CODE, "", Some("s1"))).await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing.error(), "Missing state parameter");

        let no_cookie = app.send(oauth_callback(VALID_CODE, "s1", None)).await;
        assert_eq!(no_cookie.status, StatusCode::UNAUTHORIZED);
        assert_eq!(no_cookie.error(), "Invalid OAuth state");

        let mismatch = app.send(oauth_callback(VALID_CODE, "s1", Some("s2"))).await;
        assert_eq!(mismatch.status, StatusCode::UNAUTHORIZED);
        assert!(mismatch.set_cookie("oauth_state").unwrap().contains("Max-Age=0"));

        assert_eq!(app.repo.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_callback_with_bad_code() {
        let app = TestApp::new();

        let response = app.send(oauth_callback("expired-code", "s1", Some("s1"))).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error(), "Failed to authenticate with provider");
        assert!(response.body.get("temp_token").is_none());
        assert!(response.cookie("refresh_token").is_none());
        assert_eq!(app.repo.user_count().await, 0);
        assert_eq!(app.repo.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_new_identity_registers_through_completion() {
        let app = TestApp::new();

        let callback = app.send(oauth_callback(VALID_CODE, "s1", Some("s1"))).await;
        assert_eq!(callback.status, StatusCode::OK);
        assert_eq!(callback.body["status"], "registration_required");
        assert_eq!(callback.body["user_data"]["name"], "Octo Cat");
        assert_eq!(callback.body["user_data"]["provider"], "github");
        assert!(callback.cookie("refresh_token").is_none());
        assert_eq!(app.repo.user_count().await, 0);
        assert_eq!(app.repo.session_count().await, 0);

        let temp_token = callback.body["temp_token"].as_str().unwrap().to_string();

        // A registration token is not an access token
        let me = app
            .send(bearer_request(Method::GET, "/users/me", &temp_token, None))
            .await;
        assert_eq!(me.status, StatusCode::UNAUTHORIZED);

        let body = json!({
            "temp_token": temp_token,
            "first_name": "Octo",
            "last_name": "Cat",
            "position": "student",
            "branch": "projects",
            "graduation_date": "2027-05-20"
        });
        let completed = app
            .send(json_request(Method::POST, "/auth/complete-registration", &body))
            .await;
        assert_eq!(completed.status, StatusCode::CREATED);
        assert_eq!(completed.body["user"]["is_onboarded"], true);
        assert_eq!(completed.body["user"]["full_name"], "Octo Cat");
        assert_eq!(completed.body["user"]["provider"], "github");
        assert!(completed.cookie("refresh_token").is_some());
        assert_eq!(app.repo.user_count().await, 1);

        // Replaying the same registration token
        let replay = app
            .send(json_request(Method::POST, "/auth/complete-registration", &body))
            .await;
        assert_eq!(replay.status, StatusCode::CONFLICT);
        assert_eq!(replay.error(), "Account already registered");

        // The identity now has an account and logs straight in
        let callback = app.send(oauth_callback(VALID_CODE, "s2", Some("s2"))).await;
        assert_eq!(callback.status, StatusCode::OK);
        assert!(callback.body["accessToken"].is_string());
        assert!(callback.cookie("refresh_token").is_some());
        assert!(callback.set_cookie("oauth_state").unwrap().contains("Max-Age=0"));
        assert_eq!(app.repo.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_complete_registration_validation() {
        let app = TestApp::new();

        let response = app
            .send(json_request(
                Method::POST,
                "/auth/complete-registration",
                &json!({ "temp_token": "garbage", "first_name": "Octo" }),
            ))
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error(), "Invalid or expired registration token");

        let missing = app
            .send(json_request(
                Method::POST,
                "/auth/complete-registration",
                &json!({ "first_name": "Octo" }),
            ))
            .await;
        assert_eq!(missing.status, StatusCode::BAD_REQUEST);
        assert!(missing.body["errors"].is_array());
        assert_eq!(app.repo.user_count().await, 0);
    }
}

#[cfg(test)]
mod user_tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use super::support::*;

    #[tokio::test]
    async fn test_get_me() {
        let app = TestApp::new();
        let (access, _) = app.signed_in("a@x.edu").await;

        let me = app
            .send(bearer_request(Method::GET, "/users/me", &access, None))
            .await;
        assert_eq!(me.status, StatusCode::OK);
        assert_eq!(me.body["email"], "a@x.edu");
        assert_eq!(me.body["role"], "USER");

        let anonymous = app
            .send(
                axum::http::Request::builder()
                    .uri("/users/me")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_update_self_only() {
        let app = TestApp::new();
        let (alice, _) = app.signed_in("a@x.edu").await;
        let (bob, _) = app.signed_in("b@x.edu").await;

        let alice_id = app
            .send(bearer_request(Method::GET, "/users/me", &alice, None))
            .await
            .body["id"]
            .as_str()
            .unwrap()
            .to_string();

        let changes = json!({
            "first_name": "Alice",
            "last_name": "Liddell",
            "branch": "marketing"
        });

        let updated = app
            .send(bearer_request(
                Method::PATCH,
                &format!("/users/{alice_id}"),
                &alice,
                Some(&changes),
            ))
            .await;
        assert_eq!(updated.status, StatusCode::OK);
        assert_eq!(updated.body["full_name"], "Alice Liddell");
        assert_eq!(updated.body["branch"], "marketing");

        let forbidden = app
            .send(bearer_request(
                Method::PATCH,
                &format!("/users/{alice_id}"),
                &bob,
                Some(&json!({ "first_name": "Mallory" })),
            ))
            .await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
        assert_eq!(forbidden.error(), "Not allowed to modify this user");
    }

    #[tokio::test]
    async fn test_delete_removes_sessions() {
        let app = TestApp::new();
        let (access, refresh) = app.signed_in("a@x.edu").await;
        let (bob, _) = app.signed_in("b@x.edu").await;

        let id = app
            .send(bearer_request(Method::GET, "/users/me", &access, None))
            .await
            .body["id"]
            .as_str()
            .unwrap()
            .to_string();

        let forbidden = app
            .send(bearer_request(Method::DELETE, &format!("/users/{id}"), &bob, None))
            .await;
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

        let deleted = app
            .send(bearer_request(Method::DELETE, &format!("/users/{id}"), &access, None))
            .await;
        assert_eq!(deleted.status, StatusCode::OK);
        assert_eq!(deleted.body["message"], "User deleted successfully");

        assert_eq!(app.refresh(&refresh).await.status, StatusCode::UNAUTHORIZED);
        assert_eq!(app.repo.user_count().await, 1);

        // The access token outlives the account but finds nothing
        let me = app
            .send(bearer_request(Method::GET, "/users/me", &access, None))
            .await;
        assert_eq!(me.status, StatusCode::NOT_FOUND);
    }
}
