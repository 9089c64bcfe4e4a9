//! TTL session store backed by a moka cache
//!
//! One [`MokaSessionStore`] is shared process-wide; each user session gets a
//! [`SessionHandle`] that prefixes its keys with the session id. Entries
//! expire `ttl` after they were written, so abandoned authorization attempts
//! clean themselves up.

use std::time::Duration;

use async_trait::async_trait;
use contact_importer_core::{SessionError, SessionStore};
use contact_importer_domain::SessionConfig;
use moka::future::Cache;
use uuid::Uuid;

/// Process-wide session storage
#[derive(Clone)]
pub struct MokaSessionStore {
    cache: Cache<String, String>,
}

impl MokaSessionStore {
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        Self { cache: Cache::builder().max_capacity(max_entries).time_to_live(ttl).build() }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    /// Mint a new random session id.
    #[must_use]
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Store scoped to one user session.
    pub fn session(&self, session_id: impl Into<String>) -> SessionHandle {
        SessionHandle { cache: self.cache.clone(), session_id: session_id.into() }
    }
}

/// [`SessionStore`] view of one session inside a [`MokaSessionStore`]
#[derive(Clone)]
pub struct SessionHandle {
    cache: Cache<String, String>,
    session_id: String,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn scoped(&self, key: &str) -> Result<String, SessionError> {
        if self.session_id.is_empty() {
            return Err(SessionError::new("session id must not be empty"));
        }
        Ok(format!("{}:{key}", self.session_id))
    }
}

#[async_trait]
impl SessionStore for SessionHandle {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.cache.get(&self.scoped(key)?).await)
    }

    async fn insert(&self, key: &str, value: String) -> Result<(), SessionError> {
        self.cache.insert(self.scoped(key)?, value).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.cache.invalidate(&self.scoped(key)?).await;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.cache.remove(&self.scoped(key)?).await)
    }
}
