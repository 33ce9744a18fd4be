//! Client error types

use thiserror::Error;

use crate::events::ExpiryReason;
use crate::validation::ValidationError;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Bad credentials at login or registration
    #[error("Authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// 401 that could not be recovered; the session has been cleared
    #[error("Session expired: {0}")]
    SessionExpired(ExpiryReason),

    /// Transport failure, no HTTP status available
    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Session error: {0}")]
    Session(#[from] backlog_session::SessionError),
}

impl ClientError {
    /// True when the hosting app should send the user back to login.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::SessionExpired(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Auth { status, .. } | ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
