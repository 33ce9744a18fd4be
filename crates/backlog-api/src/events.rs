//! Session lifecycle events
//!
//! The client never navigates anywhere itself. It broadcasts these events and
//! the hosting application decides what to do, typically showing the login
//! screen on `SessionEvent::Expired`.

use serde::Serialize;

/// Broadcast buffer size. Slow subscribers see `RecvError::Lagged`.
pub(crate) const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryReason {
    /// The refresh endpoint itself rejected the exchange
    RefreshRejected,
    /// The refresh exchange failed in transport or returned garbage
    RefreshFailed,
    /// The single retry was rejected with 401 again
    RetryRejected,
    /// 401 received with no refresh credential stored
    NoRefreshCredential,
    /// The stored session disappeared while a refresh was in flight
    SessionReplaced,
}

impl ExpiryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryReason::RefreshRejected => "refresh_rejected",
            ExpiryReason::RefreshFailed => "refresh_failed",
            ExpiryReason::RetryRejected => "retry_rejected",
            ExpiryReason::NoRefreshCredential => "no_refresh_credential",
            ExpiryReason::SessionReplaced => "session_replaced",
        }
    }
}

impl std::fmt::Display for ExpiryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    LoggedIn { session_id: String },
    Refreshed { session_id: String },
    LoggedOut,
    /// Session cleared after an unrecoverable 401
    Expired { reason: ExpiryReason },
}

impl SessionEvent {
    pub fn requires_login(&self) -> bool {
        matches!(self, SessionEvent::Expired { .. })
    }
}
