//! Access token payload decoding.
//!
//! The client never verifies signatures; the backend is the authority on
//! token validity. Decoding only extracts the role and expiry claims the
//! client needs for local decisions (navigation, proactive refresh).
//! Malformed input is a typed [`DecodeError`], and the boolean helpers
//! degrade to the safe answer (expired / no role) instead of panicking.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

/// Proactive refresh threshold: tokens within 5 minutes of expiry are
/// treated as expiring soon.
pub const EXPIRY_THRESHOLD_SECS: i64 = 5 * 60;

/// Token payload decoding errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Token is not a three-segment JWT")]
    MissingPayload,

    #[error("Payload is not valid base64url: {0}")]
    Base64(String),

    #[error("Payload is not valid UTF-8")]
    Utf8,

    #[error("Payload is not valid JSON: {0}")]
    Json(String),
}

/// Claims the client reads from an access token payload.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (the user's email).
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry (unix timestamp, seconds).
    #[serde(default)]
    pub exp: Option<i64>,
    /// Granted authorities, either a single string or a list
    /// (e.g. `"[ROLE_ADMIN]"` or `["ROLE_USER"]`).
    #[serde(default)]
    pub authorities: Option<serde_json::Value>,
}

impl Claims {
    /// First authority with surrounding bracket/quote characters stripped.
    /// Empty string when the claim is absent.
    pub fn role(&self) -> String {
        match &self.authorities {
            Some(serde_json::Value::String(s)) => strip_decorations(s),
            Some(serde_json::Value::Array(items)) => items
                .first()
                .and_then(|v| v.as_str())
                .map(strip_decorations)
                .unwrap_or_default(),
            _ => String::new(),
        }
    }
}

fn strip_decorations(raw: &str) -> String {
    raw.trim_matches(|c| matches!(c, '[' | ']' | '"' | ' '))
        .to_string()
}

/// Decode the payload segment of a JWT without verifying its signature.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if !payload.is_empty() => payload,
        _ => return Err(DecodeError::MissingPayload),
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)?;
    serde_json::from_str(&text).map_err(|e| DecodeError::Json(e.to_string()))
}

/// Role embedded in the token; empty string when absent or undecodable.
pub fn extract_role(token: &str) -> String {
    decode(token).map(|claims| claims.role()).unwrap_or_default()
}

/// True when the token is undecodable, carries no `exp`, or `exp` is past.
pub fn is_expired(token: &str) -> bool {
    match decode(token) {
        Ok(Claims { exp: Some(exp), .. }) => exp < Utc::now().timestamp(),
        _ => true,
    }
}

/// True when the token is undecodable or expires within `threshold_secs`.
pub fn is_expiring_soon(token: &str, threshold_secs: i64) -> bool {
    match decode(token) {
        Ok(Claims { exp: Some(exp), .. }) => exp - Utc::now().timestamp() < threshold_secs,
        _ => true,
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    //! HS256 token minting for tests.

    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct MintedClaims {
        #[serde(skip_serializing_if = "Option::is_none")]
        sub: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        exp: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        authorities: Option<serde_json::Value>,
    }

    /// Mint a real signed token with the given claims.
    pub fn mint(sub: Option<&str>, exp: Option<i64>, authorities: Option<serde_json::Value>) -> String {
        let claims = MintedClaims {
            sub: sub.map(str::to_string),
            exp,
            authorities,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("mint token")
    }

    /// Mint a user token expiring `offset_secs` from now.
    pub fn user_token(email: &str, offset_secs: i64) -> String {
        mint(
            Some(email),
            Some(chrono::Utc::now().timestamp() + offset_secs),
            Some(serde_json::json!(["ROLE_USER"])),
        )
    }

    /// Mint an admin token expiring `offset_secs` from now.
    pub fn admin_token(email: &str, offset_secs: i64) -> String {
        mint(
            Some(email),
            Some(chrono::Utc::now().timestamp() + offset_secs),
            Some(serde_json::json!(["ROLE_ADMIN"])),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_tokens::{mint, user_token};
    use super::*;

    #[test]
    fn decodes_minted_token_claims() {
        let token = user_token("ana@example.com", 3600);
        let claims = decode(&token).expect("decode");
        assert_eq!(claims.sub.as_deref(), Some("ana@example.com"));
        assert!(claims.exp.is_some());
        assert_eq!(claims.role(), "ROLE_USER");
    }

    #[test]
    fn malformed_tokens_yield_typed_errors() {
        assert_eq!(decode(""), Err(DecodeError::MissingPayload));
        assert_eq!(decode("only-one-segment"), Err(DecodeError::MissingPayload));
        assert_eq!(decode("a..c"), Err(DecodeError::MissingPayload));
        assert!(matches!(
            decode("a.!!not-base64!!.c"),
            Err(DecodeError::Base64(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode(b"not json");
        assert!(matches!(
            decode(&format!("a.{not_json}.c")),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn malformed_tokens_degrade_to_safe_defaults() {
        assert!(is_expired("garbage"));
        assert!(is_expiring_soon("garbage", EXPIRY_THRESHOLD_SECS));
        assert_eq!(extract_role("garbage"), "");
    }

    #[test]
    fn past_exp_is_expired() {
        let token = user_token("ana@example.com", -60);
        assert!(is_expired(&token));
        assert!(is_expiring_soon(&token, EXPIRY_THRESHOLD_SECS));
    }

    #[test]
    fn far_future_exp_is_neither_expired_nor_expiring() {
        let token = user_token("ana@example.com", 3600);
        assert!(!is_expired(&token));
        assert!(!is_expiring_soon(&token, EXPIRY_THRESHOLD_SECS));
    }

    #[test]
    fn near_future_exp_is_expiring_soon_but_not_expired() {
        let token = user_token("ana@example.com", 60);
        assert!(!is_expired(&token));
        assert!(is_expiring_soon(&token, EXPIRY_THRESHOLD_SECS));
    }

    #[test]
    fn missing_exp_is_expired() {
        let token = mint(Some("ana@example.com"), None, None);
        assert!(is_expired(&token));
        assert!(is_expiring_soon(&token, EXPIRY_THRESHOLD_SECS));
    }

    #[test]
    fn role_decorations_are_stripped() {
        let bracketed = mint(None, None, Some(serde_json::json!("[ROLE_ADMIN]")));
        assert_eq!(extract_role(&bracketed), "ROLE_ADMIN");

        let quoted = mint(None, None, Some(serde_json::json!(r#"["ROLE_USER"]"#)));
        assert_eq!(extract_role(&quoted), "ROLE_USER");

        let plain_list = mint(None, None, Some(serde_json::json!(["ROLE_USER"])));
        assert_eq!(extract_role(&plain_list), "ROLE_USER");
    }

    #[test]
    fn missing_authorities_yield_empty_role() {
        let token = mint(Some("ana@example.com"), Some(0), None);
        assert_eq!(extract_role(&token), "");
    }
}
