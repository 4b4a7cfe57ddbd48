//! Authenticated request wrapper.
//!
//! Wraps a `reqwest::Client` so every request carries the session's
//! bearer token. A 401 response triggers exactly one token refresh and
//! one retry; a failed refresh closes the session and surfaces
//! [`SessionError::SessionExpired`] for the host to map to its login
//! navigation. Callers interpret every other status themselves.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use tracing::debug;

use crate::session::{SessionError, SessionStore};

pub struct AuthenticatedClient {
    http: reqwest::Client,
    session: Arc<SessionStore>,
}

impl AuthenticatedClient {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self::with_client(reqwest::Client::new(), session)
    }

    pub fn with_client(http: reqwest::Client, session: Arc<SessionStore>) -> Self {
        Self { http, session }
    }

    /// Start a request against `url`; finish it with [`send`](Self::send).
    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.http.request(method, url)
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url)
    }

    /// Send a request with the session's bearer token attached.
    ///
    /// Fails fast when no access token is held; there are no anonymous
    /// requests through this client.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, SessionError> {
        let request = builder.build()?;

        let snapshot = self.session.snapshot().await;
        let access = snapshot
            .access_token
            .ok_or(SessionError::NotAuthenticated)?;

        // Keep a clone for the potential retry before the body is consumed.
        let retry = request.try_clone();

        let mut first = request;
        apply_headers(first.headers_mut(), &access)?;
        let response = self.http.execute(first).await?;

        if response.status() != StatusCode::UNAUTHORIZED || snapshot.refresh_token.is_none() {
            return Ok(response);
        }

        debug!(url = %response.url(), "401 received, refreshing token");
        self.session.refresh_tokens().await?;

        let Some(mut retry) = retry else {
            // Streaming bodies can not be replayed; the caller gets the 401.
            return Ok(response);
        };
        let access = self
            .session
            .snapshot()
            .await
            .access_token
            .ok_or(SessionError::SessionExpired)?;
        apply_headers(retry.headers_mut(), &access)?;
        Ok(self.http.execute(retry).await?)
    }
}

/// Install the bearer token and a default JSON content type.
///
/// The authorization header always comes from the session; a
/// caller-supplied content type is left alone.
fn apply_headers(headers: &mut HeaderMap, access_token: &str) -> Result<(), SessionError> {
    let bearer = HeaderValue::from_str(&format!("Bearer {access_token}"))
        .map_err(|_| SessionError::MalformedToken)?;
    headers.insert(AUTHORIZATION, bearer);
    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    Ok(())
}
