//! The session store: single writer of the process-wide session record.
//!
//! All mutation goes through this type. Observers either take a
//! [`Session`] snapshot or subscribe to the authenticated-state watch
//! channel (used by the expiration poller). Every mutation is persisted
//! through the injected [`SessionRepository`].

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use super::{SessionError, SessionRepository};
use crate::api::AuthApi;
use crate::jwt;
use crate::models::{Session, User};

pub struct SessionStore {
    state: RwLock<Session>,
    api: Arc<dyn AuthApi>,
    repository: Arc<dyn SessionRepository>,
    auth_tx: watch::Sender<bool>,
    /// Shared in-flight refresh guard: the first caller performs the
    /// refresh, concurrent callers wait and then skip their own.
    refresh_guard: Mutex<()>,
}

impl SessionStore {
    /// Create a store, rehydrating any persisted session.
    pub fn new(api: Arc<dyn AuthApi>, repository: Arc<dyn SessionRepository>) -> Self {
        let initial = match repository.load() {
            Ok(Some(session)) if session.is_consistent() => session,
            Ok(Some(_)) => {
                warn!("discarding inconsistent persisted session");
                Session::default()
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!(error = %e, "failed to load persisted session");
                Session::default()
            }
        };
        if initial.is_authenticated {
            let email = initial.user.as_ref().map(|u| u.email.as_str()).unwrap_or("");
            info!(email, "session rehydrated");
        }
        let (auth_tx, _) = watch::channel(initial.is_authenticated);
        Self {
            state: RwLock::new(initial),
            api,
            repository,
            auth_tx,
            refresh_guard: Mutex::new(()),
        }
    }

    /// Current session state, by value.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    /// Subscribe to authenticated-state changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.auth_tx.subscribe()
    }

    /// Authenticate with email and password.
    ///
    /// On success the role is derived from the returned access token; on
    /// failure the session stays logged out and the server's message is
    /// propagated for the caller to display.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), SessionError> {
        {
            let mut s = self.state.write().await;
            s.is_loading = true;
        }

        match self.api.login(email, password).await {
            Ok(tokens) => {
                let mut s = self.state.write().await;
                let fallback = tokens.username.clone().unwrap_or_else(|| email.to_string());
                apply_tokens(
                    &mut s,
                    tokens.access_token,
                    tokens.refresh_token,
                    Some(fallback),
                );
                self.persist(&s);
                let role = s.user.as_ref().map(|u| u.role.clone()).unwrap_or_default();
                drop(s);
                self.auth_tx.send_replace(true);
                info!(email, role = %role, "logged in");
                Ok(())
            }
            Err(e) => {
                let mut s = self.state.write().await;
                s.is_loading = false;
                Err(e)
            }
        }
    }

    /// Clear the session. Idempotent.
    pub async fn logout(&self) {
        let was_authenticated = {
            let mut s = self.state.write().await;
            let was = s.is_authenticated;
            *s = Session::default();
            was
        };
        if let Err(e) = self.repository.clear() {
            warn!(error = %e, "failed to clear persisted session");
        }
        self.auth_tx.send_replace(false);
        if was_authenticated {
            info!("logged out");
        }
    }

    /// Install a new token pair after a silent refresh.
    ///
    /// The role is re-derived from the new access token; when it carries
    /// no subject claim the previously known email is kept.
    pub async fn set_tokens(&self, access_token: String, refresh_token: String) {
        let mut s = self.state.write().await;
        apply_tokens(&mut s, access_token, refresh_token, None);
        self.persist(&s);
        drop(s);
        self.auth_tx.send_replace(true);
    }

    /// Proactive expiry check: refresh when the access token is expired
    /// or expiring soon; no-op unless both tokens are present. A failed
    /// refresh closes the session.
    pub async fn check_token_expiration(&self) {
        let access = {
            let s = self.state.read().await;
            match (&s.access_token, &s.refresh_token) {
                (Some(access), Some(_)) => access.clone(),
                _ => return,
            }
        };
        if jwt::is_expired(&access) || jwt::is_expiring_soon(&access, jwt::EXPIRY_THRESHOLD_SECS) {
            debug!("access token near expiry, refreshing");
            if let Err(e) = self.refresh_tokens().await {
                warn!(error = %e, "proactive refresh failed");
            }
        }
    }

    /// Refresh the token pair via the auth API.
    ///
    /// Concurrent callers share one in-flight refresh. A refresh result
    /// that lands after the session was replaced or closed is discarded.
    /// On refresh failure the session is closed and `SessionExpired` is
    /// returned.
    pub async fn refresh_tokens(&self) -> Result<(), SessionError> {
        let initial_access = {
            let s = self.state.read().await;
            if s.refresh_token.is_none() {
                return Err(SessionError::NotAuthenticated);
            }
            s.access_token.clone()
        };

        let _guard = self.refresh_guard.lock().await;

        // A concurrent caller may have refreshed, or logout may have run,
        // while we waited for the guard.
        let refresh_token = {
            let s = self.state.read().await;
            match &s.refresh_token {
                None => return Err(SessionError::SessionExpired),
                Some(_) if s.access_token != initial_access => {
                    debug!("token already refreshed by a concurrent caller");
                    return Ok(());
                }
                Some(token) => token.clone(),
            }
        };

        match self.api.refresh(&refresh_token).await {
            Ok(tokens) => {
                let mut s = self.state.write().await;
                if s.refresh_token.as_deref() != Some(refresh_token.as_str()) {
                    // Logout raced the network call; do not resurrect.
                    debug!("discarding stale refresh result");
                    return Err(SessionError::SessionExpired);
                }
                apply_tokens(&mut s, tokens.access_token, tokens.refresh_token, None);
                self.persist(&s);
                drop(s);
                self.auth_tx.send_replace(true);
                info!("access token refreshed");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, closing session");
                self.logout().await;
                Err(SessionError::SessionExpired)
            }
        }
    }

    fn persist(&self, session: &Session) {
        if let Err(e) = self.repository.save(session) {
            warn!(error = %e, "failed to persist session");
        }
    }
}

/// Populate the session from a token pair, re-deriving the role and
/// keeping the known email when the new token has no subject claim.
fn apply_tokens(
    session: &mut Session,
    access_token: String,
    refresh_token: String,
    fallback_email: Option<String>,
) {
    let claims = jwt::decode(&access_token).ok();
    let role = claims.as_ref().map(|c| c.role()).unwrap_or_default();
    let email = claims
        .and_then(|c| c.sub)
        .or(fallback_email)
        .or_else(|| session.user.as_ref().map(|u| u.email.clone()))
        .unwrap_or_default();
    session.user = Some(User { email, role });
    session.access_token = Some(access_token);
    session.refresh_token = Some(refresh_token);
    session.is_authenticated = true;
    session.is_loading = false;
}
