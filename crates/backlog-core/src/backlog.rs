//! Application container
//!
//! Owns the local database and the session-aware API client built on top of
//! it. The hosting application keeps one `Backlog` for its lifetime.

use std::sync::Arc;

use backlog_api::{ApiClient, ClientConfig, HttpTransport, SessionEvent, Transport};
use backlog_session::{AuthState, PersistentSessionStore};
use backlog_storage::Database;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::Result;

pub struct Backlog {
    config: Config,
    db: Database,
    client: ApiClient,
}

impl Backlog {
    /// Open local storage and build an HTTP client for `config.backend_url`.
    pub fn new(config: Config) -> Result<Self> {
        let client_config =
            ClientConfig::new(&config.backend_url)?.with_timeout(config.request_timeout());
        let transport = Arc::new(HttpTransport::new(&client_config)?);
        let db = Database::open(&config.database_path)?;

        Ok(Self::with_transport(config, db, transport))
    }

    /// Build on an already opened database and a caller-supplied transport.
    pub fn with_transport(config: Config, db: Database, transport: Arc<dyn Transport>) -> Self {
        let store = Arc::new(PersistentSessionStore::new(db.clone()));
        let client = ApiClient::new(transport, store);

        tracing::info!(
            backend = %config.backend_url,
            database = %config.database_path.display(),
            "Backlog initialized"
        );

        Self { config, db, client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn auth_state(&self) -> Result<AuthState> {
        Ok(self.client.auth_state()?)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.client.subscribe()
    }
}
