//! Background expiration poller.
//!
//! Bound to the authenticated lifetime of the session: while logged in it
//! runs an immediate expiry check and then one every four minutes; while
//! logged out it sits idle on the watch channel. A visibility handle lets
//! the host trigger an extra check when it returns to the foreground
//! (covers a host suspended past the token's lifetime).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::session::SessionStore;

/// Interval between proactive expiry checks while authenticated.
pub const POLL_INTERVAL: Duration = Duration::from_secs(4 * 60);

pub struct ExpirationPoller {
    session: Arc<SessionStore>,
    visibility: Arc<Notify>,
}

impl ExpirationPoller {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            visibility: Arc::new(Notify::new()),
        }
    }

    /// Handle for the host to signal it regained foreground visibility.
    /// Signals arriving while logged out are ignored.
    pub fn visibility_handle(&self) -> Arc<Notify> {
        self.visibility.clone()
    }

    /// Run the poller on the current runtime until the store is dropped.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut authenticated = self.session.subscribe();
        loop {
            if !*authenticated.borrow_and_update() {
                // Idle until login; exits when the store is gone.
                if authenticated.changed().await.is_err() {
                    return;
                }
                continue;
            }

            debug!("expiration poller scheduled");
            self.session.check_token_expiration().await;

            let mut interval = tokio::time::interval(POLL_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // first tick fires immediately, already checked

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.session.check_token_expiration().await;
                    }
                    _ = self.visibility.notified() => {
                        debug!("visibility regained, checking token");
                        self.session.check_token_expiration().await;
                    }
                    changed = authenticated.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if !*authenticated.borrow_and_update() {
                            debug!("expiration poller idle");
                            break;
                        }
                    }
                }
            }
        }
    }
}
