//! Reacts to session events: reconciles the store and sends the user to the
//! login surface when the API client reports an invalidated session.
//!
//! DESIGN
//! ======
//! Navigation lives behind `Navigator` so the transport never touches it.
//! A burst of invalidations (several in-flight requests all rejected)
//! navigates once; the latch resets on the next sign-in. After a lag the
//! supervisor redirects only if the store dropped an authenticated session
//! since the last event it handled.

use std::sync::{Arc, Weak};

use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::task::JoinHandle;

use crate::events::SessionEvent;
use crate::session::SessionStore;

/// Whatever owns the page: a router, a window, or a terminal.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator for headless use: records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "navigate");
    }
}

/// Spawn the event loop. Only a weak handle to the store is kept, so the
/// task ends once the store is dropped, every event sender is dropped, or
/// the handle is aborted.
pub fn spawn_supervisor(
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    rx: Receiver<SessionEvent>,
) -> JoinHandle<()> {
    let seen = store.invalidations();
    tokio::spawn(supervise(Arc::downgrade(&store), navigator, login_path, rx, seen))
}

async fn supervise(
    store: Weak<SessionStore>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
    mut rx: Receiver<SessionEvent>,
    mut seen: u64,
) {
    let mut redirected = false;
    loop {
        let event = rx.recv().await;
        let Some(store) = store.upgrade() else {
            break;
        };
        match event {
            Ok(SessionEvent::Invalidated { path, status }) => {
                store.reconcile();
                seen = store.invalidations();
                if !redirected {
                    tracing::warn!(%path, status, login = %login_path, "session invalidated; redirecting");
                    navigator.navigate(&login_path);
                    redirected = true;
                }
            }
            Ok(SessionEvent::SignedIn { .. }) => redirected = false,
            Ok(SessionEvent::SignedOut) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "session events lagged");
                let invalidations = store.invalidations();
                if invalidations > seen && !redirected {
                    navigator.navigate(&login_path);
                    redirected = true;
                }
                seen = invalidations;
            }
            Err(RecvError::Closed) => break,
        }
    }
    tracing::debug!("session supervisor stopped");
}

#[cfg(test)]
#[path = "supervisor_test.rs"]
mod tests;
