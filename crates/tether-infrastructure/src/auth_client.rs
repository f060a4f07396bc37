//! HTTP client for the login API.
//!
//! Endpoints (all `POST`, JSON bodies in camelCase):
//! - `/api/auth/login`   `{username, password}` -> `{success, accessToken, refreshToken, user}`
//! - `/api/auth/refresh` `{refreshToken}`       -> `{success, accessToken}`
//! - `/api/auth/logout`  `{refreshToken}`       -> `{success}`

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tether_core::AuthError;
use tether_core::auth::{AuthService, LoginGrant, UserInfo};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserInfo>,
}

impl AuthResponse {
    fn rejection(&self, fallback: &str) -> AuthError {
        AuthError::rejected(
            self.message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        )
    }
}

/// [`AuthService`] talking to the login API over HTTP.
#[derive(Clone)]
pub struct HttpAuthClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpAuthClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/auth/{}", self.base_url, name)
    }

    /// Posts `body` and decodes the JSON answer.
    ///
    /// The API reports refusals in the body, often with a 4xx status, so the
    /// body is decoded regardless of status. An undecodable 4xx answer is a
    /// rejection; anything else undecodable is a network failure.
    async fn post<B, R>(&self, name: &str, body: &B) -> Result<R, AuthError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.endpoint(name))
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AuthError::network(format!("{} request failed: {}", name, e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthError::network(format!("Failed to read {} response: {}", name, e)))?;

        match serde_json::from_slice::<R>(&bytes) {
            Ok(decoded) => Ok(decoded),
            Err(_) if status.is_client_error() => Err(AuthError::rejected(format!(
                "{} ({})",
                name, status
            ))),
            Err(e) => Err(AuthError::network(format!(
                "Failed to parse {} response ({}): {}",
                name, status, e
            ))),
        }
    }
}

#[async_trait]
impl AuthService for HttpAuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<LoginGrant, AuthError> {
        tracing::debug!("[Auth] Logging in as {}", username);
        let response: AuthResponse = self
            .post("login", &LoginRequest { username, password })
            .await?;

        if !response.success {
            return Err(response.rejection("Login rejected"));
        }

        match (response.access_token, response.refresh_token) {
            (Some(access_token), Some(refresh_token)) if !access_token.trim().is_empty() => {
                let user = response.user.unwrap_or_else(|| UserInfo {
                    username: username.to_string(),
                });
                Ok(LoginGrant {
                    access_token,
                    refresh_token,
                    user,
                })
            }
            _ => Err(AuthError::network("login response is missing tokens")),
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let response: AuthResponse = self
            .post("refresh", &RefreshTokenRequest { refresh_token })
            .await?;

        if !response.success {
            return Err(response.rejection("Refresh rejected"));
        }

        response
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| AuthError::network("refresh response is missing accessToken"))
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let response: AuthResponse = self
            .post("logout", &RefreshTokenRequest { refresh_token })
            .await?;

        if response.success {
            Ok(())
        } else {
            Err(response.rejection("Logout rejected"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HttpAuthClient {
        HttpAuthClient::new(format!("{}/", server.uri()), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_login_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"username": "alice", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": "A1",
                "refreshToken": "R1",
                "user": {"username": "alice"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let grant = client(&server).login("alice", "pw").await.unwrap();
        assert_eq!(grant.access_token, "A1");
        assert_eq!(grant.refresh_token, "R1");
        assert_eq!(grant.user.username, "alice");
    }

    #[tokio::test]
    async fn test_login_rejected_with_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "success": false,
                "message": "Fel användarnamn eller lösenord"
            })))
            .mount(&server)
            .await;

        let err = client(&server).login("alice", "bad").await.unwrap_err();
        assert_eq!(err, AuthError::rejected("Fel användarnamn eller lösenord"));
    }

    #[tokio::test]
    async fn test_refresh_sends_camel_case_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({"refreshToken": "R1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": "A2"
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(client(&server).refresh("R1").await.unwrap(), "A2");
    }

    #[tokio::test]
    async fn test_refresh_success_false_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let err = client(&server).refresh("R1").await.unwrap_err();
        assert!(err.is_rejected());
    }

    #[tokio::test]
    async fn test_blank_access_token_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": "   ",
                "refreshToken": "R1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "accessToken": " "
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let err = client.login("alice", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
        let err = client.refresh("R1").await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[tokio::test]
    async fn test_server_error_without_json_is_network_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/logout"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client(&server).logout("R1").await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        // Port 9 (discard) is closed on test machines.
        let client = HttpAuthClient::new("http://127.0.0.1:9", Duration::from_secs(2));
        let err = client.login("alice", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }
}
