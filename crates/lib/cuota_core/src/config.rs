//! Client configuration.

use std::path::PathBuf;

use url::Url;

use crate::session::{FileSessionRepository, SessionError};

/// Configuration for the Cuota client.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    /// Base URL of the Cuota backend API.
    pub api_base_url: String,
    /// Path of the persisted session file.
    pub session_path: PathBuf,
}

impl CoreConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable             | Default                          |
    /// |----------------------|----------------------------------|
    /// | `CUOTA_API_URL`      | `http://127.0.0.1:8080/api`      |
    /// | `CUOTA_SESSION_FILE` | `<data dir>/cuota/session.json`  |
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_vars(
            std::env::var("CUOTA_API_URL").ok(),
            std::env::var("CUOTA_SESSION_FILE").ok(),
        )
    }

    fn from_vars(
        api_url: Option<String>,
        session_file: Option<String>,
    ) -> Result<Self, SessionError> {
        let api_base_url = api_url.unwrap_or_else(|| "http://127.0.0.1:8080/api".into());
        Url::parse(&api_base_url)
            .map_err(|e| SessionError::Config(format!("CUOTA_API_URL: {e}")))?;

        let session_path = session_file
            .map(PathBuf::from)
            .unwrap_or_else(FileSessionRepository::default_path);

        Ok(Self {
            api_base_url,
            session_path,
        })
    }
}
