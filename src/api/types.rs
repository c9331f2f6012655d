//! API client errors and raw auth replies.

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by application data requests.
///
/// A 401 is reported as an ordinary `Status`; its session side effects are
/// handled inside the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never completed (connect, timeout, TLS, body read).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// The success body was not the expected JSON shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// HTTP status when the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// AUTH REPLY
// =============================================================================

/// Unclassified answer from an authentication endpoint. The session layer
/// decides what a non-2xx status means there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthReply {
    pub status: u16,
    pub body: String,
}

impl AuthReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
