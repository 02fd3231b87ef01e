//! Session Store Port - Interface for persisting screening sessions.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::screening::Session;

/// Caller-supplied user identifier, non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("user key cannot be empty")]
pub struct InvalidUserKey;

impl UserKey {
    pub fn new(key: impl Into<String>) -> Result<Self, InvalidUserKey> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(InvalidUserKey);
        }
        Ok(UserKey(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur during session store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode session: {0}")]
    Serialization(String),
}

/// Port for persisting and loading screening sessions.
///
/// The store owns inactivity expiry: a `get` after the idle window must
/// behave as if the session never existed. `put` replaces the whole
/// record and refreshes the activity timestamp.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads the live session for a user, if any.
    async fn get(&self, key: &UserKey) -> Result<Option<Session>, StoreError>;

    /// Stores the full session, stamping the activity time.
    async fn put(&self, key: &UserKey, session: &Session) -> Result<(), StoreError>;

    /// Removes the session. Deleting a missing session is not an error.
    async fn delete(&self, key: &UserKey) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_key_rejects_empty_and_blank() {
        assert!(UserKey::new("").is_err());
        assert!(UserKey::new("   ").is_err());
        assert!(UserKey::new("user-123").is_ok());
    }

    #[test]
    fn user_key_serializes_transparently() {
        let key = UserKey::new("abc").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"abc\"");
    }
}
