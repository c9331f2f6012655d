//! Client-side route guard for privileged surfaces (admin dashboard, coach
//! tools). This only steers the UI; the API enforces authorization.

use crate::config::ClientConfig;
use crate::session::{Role, SessionSnapshot, SessionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Anyone,
    Authenticated,
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Session not restored yet; show a loading state.
    Pending,
    Redirect(String),
}

#[must_use]
pub fn check_access(session: &SessionSnapshot, requirement: Requirement, config: &ClientConfig) -> Access {
    if requirement == Requirement::Anyone {
        return Access::Granted;
    }
    match (session.status, session.identity.as_ref()) {
        (status, _) if status.is_loading() => Access::Pending,
        (SessionStatus::Authenticated, Some(identity)) => match requirement {
            Requirement::Role(role) if identity.role != role => Access::Redirect(config.home_path.clone()),
            _ => Access::Granted,
        },
        _ => Access::Redirect(config.login_path.clone()),
    }
}

#[cfg(test)]
#[path = "access_test.rs"]
mod tests;
