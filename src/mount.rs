//! Teardown guard for in-flight fetches.
//!
//! A view owns a `Mount`; tasks it starts carry a `MountToken`. Once the
//! mount is dropped or unmounted, tokens refuse to apply late responses.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct Mount {
    live: Arc<AtomicBool>,
}

#[derive(Debug, Clone)]
pub struct MountToken {
    live: Arc<AtomicBool>,
}

impl Mount {
    #[must_use]
    pub fn new() -> Self {
        Self { live: Arc::new(AtomicBool::new(true)) }
    }

    #[must_use]
    pub fn token(&self) -> MountToken {
        MountToken { live: Arc::clone(&self.live) }
    }

    pub fn unmount(&self) {
        self.live.store(false, Ordering::Release);
    }
}

impl Default for Mount {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl MountToken {
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Run `update` with `value` only while mounted. Returns whether it ran.
    pub fn apply<T>(&self, value: T, update: impl FnOnce(T)) -> bool {
        if !self.is_mounted() {
            tracing::trace!("dropping response for unmounted view");
            return false;
        }
        update(value);
        true
    }
}

#[cfg(test)]
#[path = "mount_test.rs"]
mod tests;
