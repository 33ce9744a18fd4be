//! Session credential triple

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::Result;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Short-lived bearer token
    pub access_token: String,
    /// Longer-lived token exchanged for a new access token
    pub refresh_token: String,
    /// Server-side handle tying refreshes to this login
    pub session_id: String,
}

impl Session {
    /// Build a session, rejecting empty credentials.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Result<Self> {
        let session = Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            session_id: session_id.into(),
        };
        session.validate()?;
        Ok(session)
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token.is_empty() {
            return Err(SessionError::Incomplete("access token"));
        }
        if self.refresh_token.is_empty() {
            return Err(SessionError::Incomplete("refresh token"));
        }
        if self.session_id.is_empty() {
            return Err(SessionError::Incomplete("session id"));
        }
        Ok(())
    }

    /// Same session with a replaced access token.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..self.clone()
        }
    }

    /// Same login, regardless of which access token each side holds.
    pub fn is_same_session(&self, other: &Session) -> bool {
        self.session_id == other.session_id && self.refresh_token == other.refresh_token
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("session_id", &self.session_id)
            .finish()
    }
}
