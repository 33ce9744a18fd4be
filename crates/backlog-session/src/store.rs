//! Session stores
//!
//! The client only talks to `SessionStore`, so the persistent store can be
//! swapped for `MemorySessionStore` in tests.

use parking_lot::RwLock;
use std::sync::Arc;

use backlog_storage::{delete_item, read_item, write_item, Database};

use crate::session::Session;
use crate::Result;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const SESSION_ID_KEY: &str = "sessionId";

pub trait SessionStore: Send + Sync {
    /// Current session, or `None`. Never a partial triple.
    fn load(&self) -> Result<Option<Session>>;

    /// Replace whatever is stored with `session`.
    fn save(&self, session: &Session) -> Result<()>;

    /// Swap the access token of the stored session, but only while it is still
    /// `expected` (same refresh token and session id). Returns false when the
    /// session was cleared or replaced in the meantime.
    fn update_access_token(&self, expected: &Session, access_token: &str) -> Result<bool>;

    /// Remove the whole triple.
    fn clear(&self) -> Result<()>;

    fn is_authenticated(&self) -> Result<bool> {
        Ok(self.load()?.is_some())
    }
}

/// In-process store. Contents are lost when dropped.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Arc<RwLock<Option<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(Some(session))),
        }
    }
}

impl Clone for MemorySessionStore {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.session.read().clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        session.validate()?;
        *self.session.write() = Some(session.clone());
        Ok(())
    }

    fn update_access_token(&self, expected: &Session, access_token: &str) -> Result<bool> {
        let mut guard = self.session.write();
        match guard.as_ref() {
            Some(current) if current.is_same_session(expected) => {
                let updated = current.with_access_token(access_token);
                updated.validate()?;
                *guard = Some(updated);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn clear(&self) -> Result<()> {
        *self.session.write() = None;
        Ok(())
    }
}

/// Store backed by the local storage table, one key per credential.
pub struct PersistentSessionStore {
    db: Database,
}

impl PersistentSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl Clone for PersistentSessionStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl SessionStore for PersistentSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let items = self.db.transaction(|conn| {
            Ok((
                read_item(conn, ACCESS_TOKEN_KEY)?,
                read_item(conn, REFRESH_TOKEN_KEY)?,
                read_item(conn, SESSION_ID_KEY)?,
            ))
        })?;

        match items {
            (Some(access_token), Some(refresh_token), Some(session_id)) => {
                match Session::new(access_token, refresh_token, session_id) {
                    Ok(session) => Ok(Some(session)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring invalid stored session");
                        Ok(None)
                    }
                }
            }
            (None, None, None) => Ok(None),
            _ => {
                tracing::warn!("Ignoring partially stored session");
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        session.validate()?;

        self.db.transaction(|conn| {
            write_item(conn, ACCESS_TOKEN_KEY, &session.access_token)?;
            write_item(conn, REFRESH_TOKEN_KEY, &session.refresh_token)?;
            write_item(conn, SESSION_ID_KEY, &session.session_id)?;
            Ok(())
        })?;

        tracing::debug!(session_id = %session.session_id, "Persisted session");

        Ok(())
    }

    fn update_access_token(&self, expected: &Session, access_token: &str) -> Result<bool> {
        if access_token.is_empty() {
            return Err(crate::SessionError::Incomplete("access token"));
        }

        let updated = self.db.transaction(|conn| {
            let matches = read_item(conn, ACCESS_TOKEN_KEY)?.is_some()
                && read_item(conn, REFRESH_TOKEN_KEY)?.as_deref()
                    == Some(expected.refresh_token.as_str())
                && read_item(conn, SESSION_ID_KEY)?.as_deref()
                    == Some(expected.session_id.as_str());

            if matches {
                write_item(conn, ACCESS_TOKEN_KEY, access_token)?;
            }
            Ok(matches)
        })?;

        if !updated {
            tracing::debug!(session_id = %expected.session_id, "Stored session changed, token not updated");
        }

        Ok(updated)
    }

    fn clear(&self) -> Result<()> {
        self.db.transaction(|conn| {
            delete_item(conn, ACCESS_TOKEN_KEY)?;
            delete_item(conn, REFRESH_TOKEN_KEY)?;
            delete_item(conn, SESSION_ID_KEY)?;
            Ok(())
        })?;

        tracing::debug!("Cleared persisted session");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;

    fn session() -> Session {
        Session::new("A1", "R1", "S1").unwrap()
    }

    fn exercise(store: &dyn SessionStore) {
        assert!(store.load().unwrap().is_none());
        assert!(!store.is_authenticated().unwrap());
        assert!(!store.update_access_token(&session(), "A2").unwrap());
        assert!(store.load().unwrap().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap(), Some(session()));

        assert!(store.update_access_token(&session(), "A2").unwrap());
        let refreshed = store.load().unwrap().unwrap();
        assert_eq!(refreshed.access_token, "A2");
        assert_eq!(refreshed.refresh_token, "R1");
        assert_eq!(refreshed.session_id, "S1");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemorySessionStore::new());
    }

    #[test]
    fn test_persistent_store() {
        let db = Database::open_in_memory().unwrap();
        exercise(&PersistentSessionStore::new(db));
    }

    fn exercise_replaced(store: &dyn SessionStore) {
        let newer = Session::new("B1", "R2", "S2").unwrap();
        store.save(&newer).unwrap();

        assert!(!store.update_access_token(&session(), "A2").unwrap());
        assert_eq!(store.load().unwrap(), Some(newer.clone()));

        // A different access token on the same login still matches
        assert!(store
            .update_access_token(&newer.with_access_token("B0"), "B2")
            .unwrap());
        assert_eq!(store.load().unwrap().unwrap().access_token, "B2");
    }

    #[test]
    fn test_memory_store_keeps_replaced_session() {
        exercise_replaced(&MemorySessionStore::new());
    }

    #[test]
    fn test_persistent_store_keeps_replaced_session() {
        let db = Database::open_in_memory().unwrap();
        exercise_replaced(&PersistentSessionStore::new(db));
    }

    /// Writers alternate save/clear/refresh while readers load; every load must
    /// see nothing or one whole triple.
    fn hammer<S>(store: S)
    where
        S: SessionStore + Clone + 'static,
    {
        const ROUNDS: usize = 200;

        let mut handles = Vec::new();

        for writer in 0..2 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..ROUNDS {
                    let tag = format!("{writer}-{i}");
                    let current = Session::new(
                        format!("A{tag}"),
                        format!("R{tag}"),
                        format!("S{tag}"),
                    )
                    .unwrap();
                    store.save(&current).unwrap();
                    store
                        .update_access_token(&current, &format!("A{tag}"))
                        .unwrap();
                    if i % 3 == 0 {
                        store.clear().unwrap();
                    }
                }
            }));
        }

        for _ in 0..2 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..ROUNDS {
                    if let Some(loaded) = store.load().unwrap() {
                        let tag = &loaded.session_id[1..];
                        assert_eq!(loaded.access_token, format!("A{tag}"));
                        assert_eq!(loaded.refresh_token, format!("R{tag}"));
                    }
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_memory_store_concurrent_access() {
        hammer(MemorySessionStore::new());
    }

    #[test]
    fn test_persistent_store_concurrent_access() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("backlog.db")).unwrap();
        hammer(PersistentSessionStore::new(db));
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemorySessionStore::new();
        let other = store.clone();
        store.save(&session()).unwrap();
        assert_eq!(other.load().unwrap(), Some(session()));
    }

    #[test]
    fn test_persistent_store_writes_all_keys() {
        let db = Database::open_in_memory().unwrap();
        let store = PersistentSessionStore::new(db.clone());
        store.save(&session()).unwrap();

        assert_eq!(db.get_item(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A1"));
        assert_eq!(db.get_item(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("R1"));
        assert_eq!(db.get_item(SESSION_ID_KEY).unwrap().as_deref(), Some("S1"));

        store.clear().unwrap();
        assert_eq!(db.get_item(ACCESS_TOKEN_KEY).unwrap(), None);
        assert_eq!(db.get_item(REFRESH_TOKEN_KEY).unwrap(), None);
        assert_eq!(db.get_item(SESSION_ID_KEY).unwrap(), None);
    }

    #[test]
    fn test_partial_triple_reads_as_anonymous() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
        db.set_item(SESSION_ID_KEY, "S1").unwrap();

        let store = PersistentSessionStore::new(db);
        assert!(store.load().unwrap().is_none());
        assert!(!store.update_access_token(&session(), "A2").unwrap());
    }

    #[test]
    fn test_rejects_incomplete_session() {
        let store = MemorySessionStore::new();
        let broken = Session {
            access_token: "A1".to_string(),
            refresh_token: String::new(),
            session_id: "S1".to_string(),
        };

        assert!(matches!(
            store.save(&broken),
            Err(SessionError::Incomplete("refresh token"))
        ));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_persistent_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("backlog.db");

        PersistentSessionStore::new(Database::open(&path).unwrap())
            .save(&session())
            .unwrap();

        let reopened = PersistentSessionStore::new(Database::open(&path).unwrap());
        assert_eq!(reopened.load().unwrap(), Some(session()));
    }
}
