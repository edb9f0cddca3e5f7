//! Client error types

use thiserror::Error;

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// 401 that survived the refresh-and-retry path
    #[error("Authentication required")]
    Unauthorized,

    /// Session refresh failed; the session has been cleared
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error (server 4xx with message, or local validation)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Server-side failure
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Realtime channel failure
    #[error("Realtime error: {0}")]
    Realtime(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local file error (identity cache)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error taxonomy call sites branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or channel failure; retrying later may help
    Transport,
    /// Not (or no longer) signed in
    Authentication,
    /// Signed in but not allowed
    Authorization,
    /// Rejected input; the message is meant for the user
    Validation,
    /// Render as an absent/empty state
    NotFound,
    /// Backend fault or malformed payload
    Server,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Http(_) | ClientError::Realtime(_) | ClientError::Io(_) => {
                ErrorKind::Transport
            }
            ClientError::Unauthorized | ClientError::SessionExpired(_) => {
                ErrorKind::Authentication
            }
            ClientError::Forbidden(_) => ErrorKind::Authorization,
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::NotFound(_) => ErrorKind::NotFound,
            ClientError::InvalidResponse(_)
            | ClientError::Server { .. }
            | ClientError::Serialization(_)
            | ClientError::Internal(_) => ErrorKind::Server,
        }
    }

    /// Map a non-success HTTP status and the server's message
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            400 | 409 | 422 => ClientError::Validation(message),
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden(message),
            404 => ClientError::NotFound(message),
            _ => ClientError::Server { status, message },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
