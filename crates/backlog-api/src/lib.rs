//! Backlog API Client
//!
//! Session-aware client for the backlog REST backend:
//! - Attaches the stored access token as a bearer credential
//! - On 401, exchanges the refresh token once and retries the request once
//! - On irrecoverable expiry, clears the session and emits `SessionEvent::Expired`
//! - Thin typed wrappers for the game, user and review endpoints

mod client;
mod config;
mod endpoints;
mod error;
mod events;
mod models;
mod request;
mod transport;
mod validation;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH, REGISTER_PATH};
pub use config::ClientConfig;
pub use error::ClientError;
pub use events::{ExpiryReason, SessionEvent};
pub use models::{
    BacklogList, Cover, Game, Platform, ReviewRequest, ReviewResponse, User, UserWithGames,
};
pub use request::{ApiRequest, ApiResponse, Attempt, Method};
pub use transport::{HttpTransport, Transport};
pub use validation::{
    parse_age, validate_credentials, validate_email, PasswordChange, Registration,
    RegistrationForm, ValidationError,
};

pub use backlog_session::{AuthState, Session, SessionStore};

pub type Result<T> = std::result::Result<T, ClientError>;
