//! Auth API collaborators: the login and token refresh endpoints.
//!
//! The backend owns credential checking and token minting; this module
//! only speaks its wire contract. The trait seam keeps the session store
//! and request wrapper testable without a server.

use async_trait::async_trait;
use tracing::debug;

use crate::models::{ApiErrorBody, LoginRequest, RefreshRequest, TokenResponse};
use crate::session::SessionError;

/// Fallback when a login error body carries no readable message.
const LOGIN_FALLBACK_MESSAGE: &str = "Invalid credentials";

/// Remote authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login` — exchange credentials for a token pair.
    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, SessionError>;

    /// `POST /auth/refresh-token` — mint a new token pair.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SessionError>;
}

/// reqwest-backed [`AuthApi`] implementation.
pub struct HttpAuthApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthApi {
    /// Create a client against `base_url` (e.g. `http://127.0.0.1:8080/api`).
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, SessionError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .client
            .post(self.endpoint("auth/login"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            debug!(%status, "login rejected");
            let message = resp
                .json::<ApiErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| LOGIN_FALLBACK_MESSAGE.to_string());
            return Err(SessionError::InvalidCredentials(message));
        }

        Ok(resp.json::<TokenResponse>().await?)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SessionError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let resp = self
            .client
            .post(self.endpoint("auth/refresh-token"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::RefreshFailed(format!("HTTP {status}: {body}")));
        }

        Ok(resp.json::<TokenResponse>().await?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let api = HttpAuthApi::new("http://localhost:8080/api/");
        assert_eq!(api.endpoint("auth/login"), "http://localhost:8080/api/auth/login");

        let api = HttpAuthApi::new("http://localhost:8080/api");
        assert_eq!(
            api.endpoint("auth/refresh-token"),
            "http://localhost:8080/api/auth/refresh-token"
        );
    }
}
