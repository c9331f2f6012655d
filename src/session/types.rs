//! Session types: identity, state, errors, and auth response parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::StorageError;

// =============================================================================
// ERROR
// =============================================================================

/// Errors returned by `login` and `signup`.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The request never completed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server rejected the credentials.
    #[error("authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// A 2xx reply without a usable token or user.
    #[error("invalid auth response: {0}")]
    InvalidResponse(String),

    /// The fresh session could not be persisted.
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Authentication { .. } => "E_AUTHENTICATION",
            Self::InvalidResponse(_) => "E_INVALID_RESPONSE",
            Self::Storage(_) => "E_STORAGE",
        }
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
    Coach,
    Athlete,
}

impl Role {
    /// Map a server-supplied role. Missing or unknown values get the lowest
    /// privilege.
    #[must_use]
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") => Self::Admin,
            Some("coach") => Self::Coach,
            Some("athlete") => Self::Athlete,
            Some("user") | None => Self::User,
            Some(other) => {
                tracing::warn!(role = other, "unknown role; defaulting to user");
                Self::User
            }
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Coach => "coach",
            Self::Athlete => "athlete",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user's profile. Also the persisted `userData` layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(..)")
    }
}

// =============================================================================
// STATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Uninitialized,
    Restoring,
    Anonymous,
    Authenticated,
}

impl SessionStatus {
    /// Whether collaborators should render a loading state.
    #[must_use]
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Uninitialized | Self::Restoring)
    }
}

/// In-memory session. Credential and identity exist only together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Restoring,
    Anonymous,
    Authenticated { credential: Credential, identity: Identity },
}

impl SessionState {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        match self {
            Self::Uninitialized => SessionStatus::Uninitialized,
            Self::Restoring => SessionStatus::Restoring,
            Self::Anonymous => SessionStatus::Anonymous,
            Self::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Self::Authenticated { credential, .. } => Some(credential),
            _ => None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot { status: self.status(), identity: self.identity().cloned() }
    }
}

/// What collaborators read: status plus identity, never the credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub identity: Option<Identity>,
}

// =============================================================================
// WIRE
// =============================================================================

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: Option<String>,
    user: Option<WireUser>,
}

/// User object as returned by the auth endpoints. `id` is canonical; `_id`
/// is accepted when `id` is missing.
#[derive(Debug, Deserialize)]
struct WireUser {
    id: Option<Value>,
    #[serde(rename = "_id")]
    legacy_id: Option<Value>,
    email: Option<String>,
    name: Option<String>,
    role: Option<String>,
}

impl WireUser {
    fn into_identity(self) -> Result<Identity, SessionError> {
        let id = id_string(self.id.as_ref())
            .or_else(|| id_string(self.legacy_id.as_ref()))
            .ok_or_else(|| SessionError::InvalidResponse("user has no id".into()))?;
        Ok(Identity {
            id,
            email: self.email.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            role: Role::from_wire(self.role.as_deref()),
        })
    }
}

fn id_string(raw: Option<&Value>) -> Option<String> {
    match raw? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a 2xx login/signup body into a credential and normalized identity.
pub(crate) fn parse_auth_response(body: &str) -> Result<(Credential, Identity), SessionError> {
    let resp: AuthResponse =
        serde_json::from_str(body).map_err(|e| SessionError::InvalidResponse(e.to_string()))?;
    let token = resp
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SessionError::InvalidResponse("missing token".into()))?;
    let user = resp
        .user
        .ok_or_else(|| SessionError::InvalidResponse("missing user".into()))?;
    Ok((Credential::new(token), user.into_identity()?))
}

/// Human-readable reason from a rejected auth reply.
pub(crate) fn rejection_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_owned))
    });
    from_json
        .or_else(|| Some(body.trim().to_owned()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| "credentials rejected".to_owned())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
