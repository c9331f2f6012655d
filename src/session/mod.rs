//! Session store: who is logged in, persisted across process starts.
//!
//! ARCHITECTURE
//! ============
//! `SessionStore` pairs an in-memory `SessionState` with the persisted
//! `authToken`/`userData` keys. Every mutation writes storage and memory
//! while holding the state lock and without awaiting in between, so no
//! reader ever sees the two disagree.
//!
//! The API client may purge storage behind the store's back (on 401).
//! Reads therefore reconcile first: when the persisted credential no longer
//! matches memory, state is re-derived from storage. A reconcile that drops
//! an authenticated session bumps `invalidations`.
//!
//! A logout whose purge fails remembers the token it could not remove and
//! treats it as absent until storage holds a different one.
//!
//! LIFECYCLE
//! =========
//! `Uninitialized → Restoring → {Authenticated | Anonymous}` via
//! `restore`, then `login`/`signup` and `logout` move between the last two.

pub mod types;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;

use crate::api::ApiClient;
use crate::events::{SessionEvent, SessionEvents};
use crate::storage::{AUTH_TOKEN_KEY, KeyValueStore, USER_DATA_KEY, purge_session};
pub use types::{Credential, Identity, Role, SessionError, SessionSnapshot, SessionState, SessionStatus};
use types::{parse_auth_response, rejection_message};

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";

struct Inner {
    session: SessionState,
    revoked: Option<String>,
    invalidations: u64,
}

pub struct SessionStore {
    state: Mutex<Inner>,
    storage: Arc<dyn KeyValueStore>,
    events: SessionEvents,
    api: ApiClient,
}

impl SessionStore {
    /// Create an uninitialized store sharing the client's storage and
    /// event hub.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            state: Mutex::new(Inner { session: SessionState::Uninitialized, revoked: None, invalidations: 0 }),
            storage: Arc::clone(api.storage()),
            events: api.events().clone(),
            api,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Current status and identity, reconciled against storage.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut state = self.lock();
        self.reconcile_locked(&mut state);
        state.session.snapshot()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.snapshot().status
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.snapshot().identity
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Re-derive memory from storage if they disagree. Returns the status
    /// afterwards.
    pub fn reconcile(&self) -> SessionStatus {
        let mut state = self.lock();
        self.reconcile_locked(&mut state);
        state.session.status()
    }

    /// Number of authenticated sessions dropped because storage was purged
    /// underneath the store.
    #[must_use]
    pub fn invalidations(&self) -> u64 {
        let mut state = self.lock();
        self.reconcile_locked(&mut state);
        state.invalidations
    }

    fn reconcile_locked(&self, state: &mut Inner) {
        if state.session.status().is_loading() {
            return;
        }
        let persisted = match self.storage.get(AUTH_TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "reconcile skipped; storage unreadable");
                return;
            }
        };
        if state.revoked.is_some() && persisted != state.revoked {
            state.revoked = None;
        }
        let visible = if state.revoked.is_some() { None } else { persisted };
        let in_memory = state.session.credential().map(Credential::expose);
        if visible.as_deref() == in_memory {
            return;
        }
        let previous = state.session.status();
        state.session = load_persisted(self.storage.as_ref());
        let current = state.session.status();
        if previous == SessionStatus::Authenticated && current == SessionStatus::Anonymous {
            state.invalidations += 1;
        }
        if current != previous {
            tracing::info!(?previous, ?current, "session reconciled with storage");
        }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Load the persisted session. Only the first call has any effect.
    pub fn restore(&self) -> SessionStatus {
        let mut state = self.lock();
        if !matches!(state.session, SessionState::Uninitialized) {
            tracing::warn!(status = ?state.session.status(), "restore called more than once; ignoring");
            return state.session.status();
        }
        state.session = SessionState::Restoring;
        state.session = load_persisted(self.storage.as_ref());
        tracing::info!(status = ?state.session.status(), "session restored");
        state.session.status()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// `Authentication` for a non-2xx reply, `Network` when the request never
    /// completes, `InvalidResponse` for an unusable 2xx body, `Storage` when
    /// the session cannot be persisted. State is unchanged on every error.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let body = json!({ "email": email, "password": password });
        self.authenticate(LOGIN_PATH, &body).await
    }

    /// Register and sign in. Same contract as [`SessionStore::login`].
    ///
    /// # Errors
    ///
    /// See [`SessionStore::login`].
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<Identity, SessionError> {
        let body = json!({ "email": email, "password": password, "name": name });
        self.authenticate(SIGNUP_PATH, &body).await
    }

    async fn authenticate(&self, path: &str, body: &serde_json::Value) -> Result<Identity, SessionError> {
        let reply = self.api.authenticate(path, body).await.map_err(|e| {
            tracing::warn!(path, error = %e, "auth request failed");
            SessionError::Network(e)
        })?;

        if !reply.is_success() {
            let message = rejection_message(&reply.body);
            tracing::info!(path, status = reply.status, "credentials rejected");
            return Err(SessionError::Authentication { status: reply.status, message });
        }

        let (credential, identity) = parse_auth_response(&reply.body)?;
        self.establish(credential, identity.clone())?;
        Ok(identity)
    }

    /// Persist then publish a fresh session. Memory is only touched once
    /// both keys are written.
    fn establish(&self, credential: Credential, identity: Identity) -> Result<(), SessionError> {
        let user_data = serde_json::to_string(&identity).map_err(crate::storage::StorageError::from)?;

        let mut state = self.lock();
        self.storage.set(AUTH_TOKEN_KEY, credential.expose())?;
        if let Err(e) = self.storage.set(USER_DATA_KEY, &user_data) {
            restore_previous_token(self.storage.as_ref(), state.session.credential(), state.revoked.as_deref());
            return Err(e.into());
        }
        let user_id = identity.id.clone();
        state.session = SessionState::Authenticated { credential, identity };
        state.revoked = None;
        drop(state);

        tracing::info!(%user_id, "signed in");
        self.events.emit(SessionEvent::SignedIn { user_id });
        Ok(())
    }

    /// Forget the session locally. Never fails; safe when already anonymous.
    ///
    /// If storage refuses the purge, the token left behind is ignored by
    /// this store until a different one is written.
    pub fn logout(&self) {
        let mut state = self.lock();
        if let Err(e) = purge_session(self.storage.as_ref()) {
            tracing::error!(error = %e, "failed to clear persisted session on logout");
            state.revoked = self.storage.get(AUTH_TOKEN_KEY).ok().flatten();
        }
        let was_authenticated = state.session.status() == SessionStatus::Authenticated;
        state.session = SessionState::Anonymous;
        drop(state);

        if was_authenticated {
            tracing::info!("signed out");
            self.events.emit(SessionEvent::SignedOut);
        }
    }
}

/// Derive state from storage. Corrupt `userData` is purged, never fatal.
fn load_persisted(storage: &dyn KeyValueStore) -> SessionState {
    let read = storage
        .get(AUTH_TOKEN_KEY)
        .and_then(|token| Ok((token, storage.get(USER_DATA_KEY)?)));
    let (token, user_data) = match read {
        Ok(pair) => pair,
        Err(e) => {
            tracing::warn!(error = %e, "persisted session unreadable; starting anonymous");
            return SessionState::Anonymous;
        }
    };

    let (Some(token), Some(user_data)) = (token, user_data) else {
        return SessionState::Anonymous;
    };

    match serde_json::from_str::<Identity>(&user_data) {
        Ok(identity) if !token.is_empty() => {
            SessionState::Authenticated { credential: Credential::new(token), identity }
        }
        parsed => {
            let reason = parsed.err().map_or_else(|| "empty token".to_owned(), |e| e.to_string());
            tracing::warn!(%reason, "malformed persisted session; purging");
            if let Err(e) = purge_session(storage) {
                tracing::error!(error = %e, "failed to purge malformed session");
            }
            SessionState::Anonymous
        }
    }
}

/// Undo a half-written login so storage matches the untouched memory.
fn restore_previous_token(storage: &dyn KeyValueStore, previous: Option<&Credential>, revoked: Option<&str>) {
    let result = match (previous, revoked) {
        (Some(credential), _) => storage.set(AUTH_TOKEN_KEY, credential.expose()),
        (None, Some(token)) => storage.set(AUTH_TOKEN_KEY, token),
        (None, None) => storage.remove(AUTH_TOKEN_KEY).map(|_| ()),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "failed to roll back credential after partial write");
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
