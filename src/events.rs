//! Session lifecycle notifications.
//!
//! The API client announces invalidations here instead of navigating on its
//! own; whoever owns navigation subscribes (see `supervisor`).

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { user_id: String },
    SignedOut,
    /// The server rejected a request's authority; persisted state is gone.
    Invalidated { path: String, status: u16 },
}

/// Broadcast hub shared by the session store and the API client.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish to current subscribers. Having none is fine.
    pub fn emit(&self, event: SessionEvent) {
        tracing::debug!(?event, "session event");
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
