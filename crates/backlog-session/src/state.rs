//! Authentication State Machine
//!
//! ```text
//! Anonymous
//!   ↓ login / register
//! Authenticated ──→ logout / expiry ──→ Anonymous
//!   ↓ 401
//! Refreshing
//!   ↓ refresh ok          ↓ refresh failed
//! Authenticated         Anonymous
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    /// No persisted session
    Anonymous,
    /// A full credential triple is persisted
    Authenticated,
    /// A refresh exchange is in flight
    Refreshing,
}

impl AuthState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: AuthState) -> bool {
        match (self, target) {
            (AuthState::Anonymous, AuthState::Authenticated) => true,
            // Access token rejected
            (AuthState::Authenticated, AuthState::Refreshing) => true,
            // Logout, or a retried request rejected again
            (AuthState::Authenticated, AuthState::Anonymous) => true,
            (AuthState::Refreshing, AuthState::Authenticated) => true,
            (AuthState::Refreshing, AuthState::Anonymous) => true,
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthState::Anonymous)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthState::Anonymous => "anonymous",
            AuthState::Authenticated => "authenticated",
            AuthState::Refreshing => "refreshing",
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
