//! In-process server-side session storage.
//!
//! Sessions are keyed by an opaque token handed to the browser in a cookie
//! and hold a small map of JSON values. Idle sessions expire after `ttl`.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 14;

#[derive(Debug)]
struct SessionEntry {
    values: HashMap<String, Value>,
    last_seen: DateTime<Utc>,
}

impl SessionEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            values: HashMap::new(),
            last_seen: now,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        // A panic while holding the lock leaves the map itself intact.
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.ttl
    }

    /// Start an empty session and return its key.
    pub fn create(&self) -> String {
        let key = Uuid::new_v4().simple().to_string();
        self.lock().insert(key.clone(), SessionEntry::new(Utc::now()));
        key
    }

    /// Mark `key` as used. Returns false for unknown or expired sessions,
    /// which are dropped.
    pub fn touch(&self, key: &str) -> bool {
        let now = Utc::now();
        let mut sessions = self.lock();
        let alive = sessions.get(key).map(|entry| !self.is_expired(entry, now));
        match alive {
            Some(true) => {
                if let Some(entry) = sessions.get_mut(key) {
                    entry.last_seen = now;
                }
                true
            }
            Some(false) => {
                sessions.remove(key);
                false
            }
            None => false,
        }
    }

    pub fn get(&self, key: &str, name: &str) -> Option<Value> {
        self.lock()
            .get(key)
            .and_then(|entry| entry.values.get(name).cloned())
    }

    pub fn insert(&self, key: &str, name: &str, value: Value) {
        let now = Utc::now();
        let mut sessions = self.lock();
        let entry = sessions
            .entry(key.to_string())
            .or_insert_with(|| SessionEntry::new(now));
        entry.values.insert(name.to_string(), value);
        entry.last_seen = now;
    }

    pub fn remove(&self, key: &str, name: &str) -> Option<Value> {
        self.lock()
            .get_mut(key)
            .and_then(|entry| entry.values.remove(name))
    }

    /// Drop every session idle for longer than the TTL.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_seen <= self.ttl);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
