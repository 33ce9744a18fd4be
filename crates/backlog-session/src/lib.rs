//! Backlog Session Management
//!
//! - A Session is the credential triple issued at login or registration
//! - Exactly one session exists at a time, persisted locally
//! - The triple is written and cleared as a unit, never partially
//! - Only the access token changes during a session's lifetime

mod error;
mod session;
mod state;
mod store;

pub use error::SessionError;
pub use session::Session;
pub use state::AuthState;
pub use store::{
    MemorySessionStore, PersistentSessionStore, SessionStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY, SESSION_ID_KEY,
};

pub type Result<T> = std::result::Result<T, SessionError>;
