//! Session store port
//!
//! Short-lived key/value storage scoped to one user session. The flow
//! controller keeps the CSRF state and the pending token here between the
//! authorization redirect, the callback, and the redirected request.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a session store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("session store error: {0}")]
pub struct SessionError(pub String);

impl SessionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trait for per-session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read a value without removing it
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Store a value, replacing any existing one
    async fn insert(&self, key: &str, value: String) -> Result<(), SessionError>;

    /// Delete a value; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<(), SessionError>;

    /// Read and delete a value in one step
    ///
    /// When two callers race, at most one of them observes `Some`.
    async fn take(&self, key: &str) -> Result<Option<String>, SessionError>;
}
