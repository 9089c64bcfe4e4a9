use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use contact_importer_core::session_ports::{SessionError, SessionStore};

/// In-memory mock for `SessionStore`.
///
/// Clones share the same map, so a test can hand one clone to a controller
/// and inspect the other.
#[derive(Default, Clone)]
pub struct MockSessionStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
        self
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }

    /// Make every operation fail.
    pub fn set_should_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    fn check(&self) -> Result<(), SessionError> {
        if *self.fail.lock().unwrap() {
            return Err(SessionError::new("backend unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.check()?;
        Ok(self.value(key))
    }

    async fn insert(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.check()?;
        self.values.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.check()?;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionError> {
        self.check()?;
        Ok(self.values.lock().unwrap().remove(key))
    }
}
