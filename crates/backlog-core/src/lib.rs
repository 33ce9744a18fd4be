//! Backlog Core
//!
//! Wires local storage, the persisted session and the API client together
//! for a hosting application.

mod backlog;
mod config;
mod error;

pub use backlog::Backlog;
pub use config::{Config, BACKEND_URL_ENV};
pub use error::CoreError;

// Re-export core components
pub use backlog_api::{
    ApiClient, ApiRequest, ApiResponse, BacklogList, ClientConfig, ClientError, ExpiryReason,
    Game, HttpTransport, PasswordChange, Registration, RegistrationForm, ReviewRequest,
    ReviewResponse, SessionEvent, Transport, User, UserWithGames, ValidationError,
};
pub use backlog_session::{
    AuthState, MemorySessionStore, PersistentSessionStore, Session, SessionError, SessionStore,
};
pub use backlog_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
