//! Key-value stores holding the CSRF token between the two legs of the
//! authorization flow.

use crate::errors::{ConfigurationError, DropboxError, DropboxResult};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

/// Prefix applied to every key written by the bundled stores.
pub const KEY_PREFIX: &str = "DBAPI_";

/// Persistent data store interface (for dependency injection).
pub trait PersistentDataStore: Send + Sync {
    /// Value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`.
    fn set(&self, key: &str, value: String);

    /// Removes `key`.
    fn clear(&self, key: &str);
}

/// Store backed by a private in-memory map.
#[derive(Default)]
pub struct InMemoryDataStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryDataStore {
    /// Create new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentDataStore for InMemoryDataStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(&prefixed(key)).cloned()
    }

    fn set(&self, key: &str, value: String) {
        lock(&self.values).insert(prefixed(key), value);
    }

    fn clear(&self, key: &str) {
        lock(&self.values).remove(&prefixed(key));
    }
}

/// A caller-owned session map shared between requests of one user.
pub type Session = Arc<Mutex<HashMap<String, String>>>;

/// Store that writes into a caller-owned [`Session`].
///
/// The caller scopes the session to one user and decides its lifetime; the
/// store only reads and writes its own prefixed keys.
#[derive(Clone)]
pub struct SessionDataStore {
    session: Session,
}

impl SessionDataStore {
    /// Wraps a session map.
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

impl PersistentDataStore for SessionDataStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.session).get(&prefixed(key)).cloned()
    }

    fn set(&self, key: &str, value: String) {
        lock(&self.session).insert(prefixed(key), value);
    }

    fn clear(&self, key: &str) {
        lock(&self.session).remove(&prefixed(key));
    }
}

/// Named selector for the bundled stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistentDataStoreKind {
    /// [`InMemoryDataStore`].
    Memory,
    /// [`SessionDataStore`].
    Session,
}

impl FromStr for PersistentDataStoreKind {
    type Err = DropboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "session" => Ok(Self::Session),
            other => Err(ConfigurationError::UnknownDataStore(other.to_string()).into()),
        }
    }
}

impl PersistentDataStoreKind {
    /// Builds the selected store. A session store needs `session`.
    pub fn build(self, session: Option<Session>) -> DropboxResult<Arc<dyn PersistentDataStore>> {
        match (self, session) {
            (Self::Memory, _) => Ok(Arc::new(InMemoryDataStore::new())),
            (Self::Session, Some(session)) => Ok(Arc::new(SessionDataStore::new(session))),
            (Self::Session, None) => Err(DropboxError::configuration(
                "The session data store needs a session",
            )),
        }
    }
}

fn prefixed(key: &str) -> String {
    format!("{}{}", KEY_PREFIX, key)
}

fn lock(map: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
