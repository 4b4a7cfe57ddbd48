//! Session domain models and wire types for the auth API.
//!
//! Domain models are snake_case; wire types carry `#[serde(rename_all =
//! "camelCase")]` to match the backend's JSON shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role carried in access token authorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Claim string as embedded in token authorities.
    pub fn as_claim(self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    /// Parse an authorities claim string.
    pub fn from_claim(claim: &str) -> Option<Self> {
        match claim {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_claim())
    }
}

/// Authenticated user as known to the session.
///
/// `role` is always re-derived from the access token, never set
/// independently, so a token change can not leave a stale role behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub role: String,
}

/// The process-wide session record.
///
/// `is_loading` is transient UI state and is not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub is_authenticated: bool,
    #[serde(skip)]
    pub is_loading: bool,
}

impl Session {
    /// True when the authenticated-state invariant holds: authenticated
    /// implies user and both tokens are present.
    pub fn is_consistent(&self) -> bool {
        !self.is_authenticated
            || (self.user.is_some() && self.access_token.is_some() && self.refresh_token.is_some())
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// `POST /auth/login` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/refresh-token` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by login and refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Only the login endpoint returns a username.
    #[serde(default)]
    pub username: Option<String>,
}

/// Error body returned by the auth endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_claim_round_trip() {
        assert_eq!(Role::from_claim(Role::Admin.as_claim()), Some(Role::Admin));
        assert_eq!(Role::from_claim(Role::User.as_claim()), Some(Role::User));
        assert_eq!(Role::from_claim("ROLE_SUPERVISOR"), None);
    }

    #[test]
    fn token_response_parses_camel_case() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"accessToken":"a.b.c","refreshToken":"r","username":"ana@example.com"}"#,
        )
        .expect("parse");
        assert_eq!(resp.access_token, "a.b.c");
        assert_eq!(resp.username.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn token_response_username_is_optional() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"accessToken":"a.b.c","refreshToken":"r"}"#).expect("parse");
        assert!(resp.username.is_none());
    }

    #[test]
    fn default_session_is_consistent() {
        assert!(Session::default().is_consistent());
    }

    #[test]
    fn authenticated_session_without_tokens_is_inconsistent() {
        let session = Session {
            is_authenticated: true,
            ..Session::default()
        };
        assert!(!session.is_consistent());
    }
}
