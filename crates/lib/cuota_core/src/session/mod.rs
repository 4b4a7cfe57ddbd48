//! Session state machine and persistence.
//!
//! The [`store::SessionStore`] is the single writer of the process-wide
//! session record; everything else observes it through snapshots or the
//! authenticated-state watch channel.

pub mod repository;
pub mod store;

pub use repository::{FileSessionRepository, MemorySessionRepository, SessionRepository};
pub use store::SessionStore;

use thiserror::Error;

/// Session lifecycle errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login rejected; carries the server-provided message verbatim.
    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Access token is not a valid header value")]
    MalformedToken,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
