//! # storefront-session
//!
//! Session core for the storefront client: a persisted session store, the
//! authenticated API client every data fetch goes through, and the glue
//! that turns a rejected credential into a redirect to the login surface.
//!
//! Rendering, routing, and the API server itself live elsewhere; views call
//! into this crate and display whatever it returns.

pub mod access;
pub mod api;
pub mod config;
pub mod events;
pub mod format;
pub mod mount;
pub mod session;
pub mod storage;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use api::{ApiClient, ApiError};
pub use config::ClientConfig;
pub use events::{SessionEvent, SessionEvents};
pub use session::{Identity, Role, SessionError, SessionSnapshot, SessionStatus, SessionStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use supervisor::{Navigator, spawn_supervisor};
