//! Session persistence boundary.
//!
//! The store persists through this trait on every mutation, so a restart
//! rehydrates the last known session without re-login. Token strings are
//! stored in plaintext; the storage medium is assumed execution-isolated.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use super::SessionError;
use crate::models::Session;

/// Durable storage for the session record.
pub trait SessionRepository: Send + Sync {
    /// Load the persisted session, if any.
    fn load(&self) -> Result<Option<Session>, SessionError>;
    /// Persist the session, replacing any previous record.
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    /// Remove the persisted session.
    fn clear(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// File-backed repository
// ---------------------------------------------------------------------------

/// JSON file under the platform data dir (default
/// `<data dir>/cuota/session.json`).
pub struct FileSessionRepository {
    path: PathBuf,
}

impl FileSessionRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default session file location.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cuota")
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionRepository for FileSessionRepository {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Session>(&text) {
            Ok(session) => Ok(Some(session)),
            // A corrupt session file means re-login, not a crash.
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session file");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory repository
// ---------------------------------------------------------------------------

/// Ephemeral repository for tests and non-persistent hosts.
#[derive(Default)]
pub struct MemorySessionRepository {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for MemorySessionRepository {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.inner.lock().expect("repository lock").clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.inner.lock().expect("repository lock") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.inner.lock().expect("repository lock") = None;
        Ok(())
    }
}
