//! Session-aware API client
//!
//! Every authenticated call goes through `ApiClient::request`, which owns the
//! token lifecycle:
//!
//! ```text
//! send with bearer ──→ non-401 ──→ returned unchanged
//!        │
//!        ↓ 401
//! refresh call itself? ───────────→ clear + Expired(RefreshRejected)
//! already retried? ───────────────→ clear + Expired(RetryRejected)
//! no stored session? ─────────────→ clear + Expired(NoRefreshCredential)
//! POST /auth/refresh ── fails ────→ clear + Expired(RefreshRejected | RefreshFailed)
//!        │ ok
//!        ↓
//! store new access token, re-send once
//! (another login replaced the session meanwhile: keep it, re-send once with it)
//! ```
//!
//! Concurrent 401s each run their own refresh. There is no single-flight.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use backlog_session::{AuthState, Session, SessionStore};

use crate::error::ClientError;
use crate::events::{ExpiryReason, SessionEvent, EVENT_CAPACITY};
use crate::request::{ApiRequest, ApiResponse, Attempt};
use crate::transport::Transport;
use crate::validation::{validate_credentials, Registration};
use crate::Result;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Statuses from login/register that mean the user's input was rejected.
const AUTH_FAILURE_STATUSES: [u16; 4] = [400, 401, 403, 409];

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionHandle<'a> {
    refresh_token: &'a str,
    session_id: &'a str,
}

impl<'a> From<&'a Session> for SessionHandle<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            refresh_token: &session.refresh_token,
            session_id: &session.session_id,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
    /// Refresh exchanges currently in flight
    refreshing: Arc<AtomicUsize>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            transport,
            store,
            events,
            refreshing: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Receive session lifecycle events. `Expired` means "show the login screen".
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn session(&self) -> Result<Option<Session>> {
        Ok(self.store.load()?)
    }

    pub fn auth_state(&self) -> Result<AuthState> {
        if self.refreshing.load(Ordering::SeqCst) > 0 {
            return Ok(AuthState::Refreshing);
        }
        if self.store.is_authenticated()? {
            Ok(AuthState::Authenticated)
        } else {
            Ok(AuthState::Anonymous)
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        validate_credentials(username, password)?;

        let request = ApiRequest::post(LOGIN_PATH).with_json(&Credentials { username, password })?;
        self.authenticate(&request).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<Session> {
        let request = ApiRequest::post(REGISTER_PATH).with_json(registration)?;
        self.authenticate(&request).await
    }

    /// Tell the backend (best effort) and drop the local session.
    /// Only a failure to clear local state is reported.
    pub async fn logout(&self) -> Result<()> {
        let session = match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session during logout");
                None
            }
        };

        if let Some(session) = session {
            match self.notify_logout(&session).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!(session_id = %session.session_id, "Backend session closed");
                }
                Ok(response) => {
                    tracing::warn!(
                        session_id = %session.session_id,
                        status = response.status(),
                        "Logout rejected by backend, clearing local session anyway"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        session_id = %session.session_id,
                        error = %e,
                        "Logout request failed, clearing local session anyway"
                    );
                }
            }
        }

        self.enter_state(AuthState::Anonymous);
        self.store.clear()?;
        self.emit(SessionEvent::LoggedOut);

        tracing::info!("Logged out");

        Ok(())
    }

    /// Perform an authenticated call, refreshing the access token at most once.
    pub async fn request(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let mut attempt = Attempt::first();

        loop {
            let bearer = self.store.load()?.map(|s| s.access_token);
            let response = self.transport.send(request, bearer.as_deref()).await?;

            if !response.is_unauthorized() {
                return Ok(response);
            }

            tracing::debug!(
                method = %request.method(),
                path = %request.path(),
                retries = attempt.retries(),
                "Request unauthorized"
            );

            let reason = if request.is_refresh() {
                ExpiryReason::RefreshRejected
            } else if !attempt.can_retry() {
                ExpiryReason::RetryRejected
            } else {
                match self.store.load()? {
                    None => ExpiryReason::NoRefreshCredential,
                    Some(session) => match self.refresh(&session).await {
                        Ok(()) => {
                            attempt = attempt.next();
                            continue;
                        }
                        // A newer login took over while the exchange was in flight
                        Err(ExpiryReason::SessionReplaced) if self.store.is_authenticated()? => {
                            tracing::debug!(
                                session_id = %session.session_id,
                                "Session replaced during refresh, retrying with current session"
                            );
                            attempt = attempt.next();
                            continue;
                        }
                        Err(reason) => reason,
                    },
                }
            };

            return Err(self.expire(reason));
        }
    }

    /// Exchange the refresh token for a new access token. Never retried.
    async fn refresh(&self, session: &Session) -> std::result::Result<(), ExpiryReason> {
        self.enter_state(AuthState::Refreshing);
        let _guard = RefreshGuard::enter(&self.refreshing);

        let request = ApiRequest::post(REFRESH_PATH)
            .with_json(&SessionHandle::from(session))
            .map_err(|_| ExpiryReason::RefreshFailed)?;

        let response = match self
            .transport
            .send(&request, Some(&session.access_token))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(session_id = %session.session_id, error = %e, "Refresh request failed");
                return Err(ExpiryReason::RefreshFailed);
            }
        };

        if !response.is_success() {
            tracing::warn!(
                session_id = %session.session_id,
                status = response.status(),
                "Refresh rejected"
            );
            return Err(ExpiryReason::RefreshRejected);
        }

        let access_token = match response.json::<RefreshResponse>() {
            Ok(body) if !body.access_token.is_empty() => body.access_token,
            Ok(_) => {
                tracing::warn!(session_id = %session.session_id, "Refresh returned an empty token");
                return Err(ExpiryReason::RefreshFailed);
            }
            Err(e) => {
                tracing::warn!(session_id = %session.session_id, error = %e, "Unreadable refresh response");
                return Err(ExpiryReason::RefreshFailed);
            }
        };

        self.enter_state(AuthState::Authenticated);
        match self.store.update_access_token(session, &access_token) {
            Ok(true) => {}
            Ok(false) => return Err(ExpiryReason::SessionReplaced),
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist refreshed access token");
                return Err(ExpiryReason::RefreshFailed);
            }
        }

        tracing::info!(session_id = %session.session_id, "Access token refreshed");
        self.emit(SessionEvent::Refreshed {
            session_id: session.session_id.clone(),
        });

        Ok(())
    }

    /// Shared login/register exchange. No bearer, no refresh handling.
    async fn authenticate(&self, request: &ApiRequest) -> Result<Session> {
        let response = self.transport.send(request, None).await?;

        if !response.is_success() {
            let status = response.status();
            let message = response.error_message();

            if AUTH_FAILURE_STATUSES.contains(&status) {
                tracing::warn!(path = %request.path(), status, "Authentication rejected");
                return Err(ClientError::Auth { status, message });
            }
            return Err(ClientError::Http { status, message });
        }

        let session: Session = response.json()?;
        session
            .validate()
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        self.enter_state(AuthState::Authenticated);
        self.store.save(&session)?;

        tracing::info!(
            path = %request.path(),
            session_id = %session.session_id,
            "Session established"
        );
        self.emit(SessionEvent::LoggedIn {
            session_id: session.session_id.clone(),
        });

        Ok(session)
    }

    async fn notify_logout(&self, session: &Session) -> Result<ApiResponse> {
        let request = ApiRequest::post(LOGOUT_PATH).with_json(&SessionHandle::from(session))?;
        self.transport
            .send(&request, Some(&session.access_token))
            .await
    }

    /// Clear the session and announce it. Returns the error for the caller.
    fn expire(&self, reason: ExpiryReason) -> ClientError {
        self.enter_state(AuthState::Anonymous);
        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "Failed to clear expired session");
        }

        tracing::warn!(reason = %reason, "Session expired");
        self.emit(SessionEvent::Expired { reason });

        ClientError::SessionExpired(reason)
    }

    /// Trace a move to `to`. Returns false when the machine does not allow it,
    /// which only happens when a concurrent logout or login races the caller.
    fn enter_state(&self, to: AuthState) -> bool {
        let from = match self.auth_state() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read auth state");
                AuthState::Anonymous
            }
        };

        if from.can_transition_to(to) {
            tracing::debug!(%from, %to, "Auth state change");
            true
        } else {
            tracing::warn!(%from, %to, "Unexpected auth state change");
            false
        }
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Clone for ApiClient {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            store: Arc::clone(&self.store),
            events: self.events.clone(),
            refreshing: Arc::clone(&self.refreshing),
        }
    }
}

struct RefreshGuard(Arc<AtomicUsize>);

impl RefreshGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for RefreshGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
