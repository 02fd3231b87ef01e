//! In-memory session store with inactivity expiry.
//!
//! Sessions live in a map guarded by an async RwLock. Every `put`
//! stamps the activity time; a `get` past the idle window deletes the
//! entry and reports the session missing, so expiry needs no sweeper.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::screening::Session;
use crate::ports::{SessionStore, StoreError, UserKey};

struct Entry {
    session: Session,
    last_activity: Instant,
}

pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    idle_timeout: Duration,
}

impl InMemorySessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        InMemorySessionStore {
            entries: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &UserKey) -> Result<Option<Session>, StoreError> {
        let mut entries = self.entries.write().await;
        match entries.get(key.as_str()) {
            None => Ok(None),
            Some(entry) if entry.last_activity.elapsed() > self.idle_timeout => {
                entries.remove(key.as_str());
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.session.clone())),
        }
    }

    async fn put(&self, key: &UserKey, session: &Session) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.as_str().to_string(),
            Entry {
                session: session.clone(),
                last_activity: Instant::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &UserKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(key.as_str());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screening::DialogueState;

    fn key(s: &str) -> UserKey {
        UserKey::new(s).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_returns_the_session() {
        let store = InMemorySessionStore::new(Duration::from_secs(600));
        let mut session = Session::new();
        session.push_user("안녕하세요");
        store.put(&key("u1"), &session).await.unwrap();

        let loaded = store.get(&key("u1")).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemorySessionStore::new(Duration::from_secs(600));
        assert!(store.get(&key("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = InMemorySessionStore::new(Duration::from_secs(600));
        store.put(&key("u1"), &Session::new()).await.unwrap();
        store.delete(&key("u1")).await.unwrap();
        store.delete(&key("u1")).await.unwrap();
        assert!(store.get(&key("u1")).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_session_expires_on_read() {
        let store = InMemorySessionStore::new(Duration::from_secs(600));
        store.put(&key("u1"), &Session::new()).await.unwrap();

        tokio::time::advance(Duration::from_secs(601)).await;
        assert!(store.get(&key("u1")).await.unwrap().is_none());
        // the expired entry was removed, not just hidden
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn put_refreshes_the_activity_clock() {
        let store = InMemorySessionStore::new(Duration::from_secs(600));
        store.put(&key("u1"), &Session::new()).await.unwrap();

        tokio::time::advance(Duration::from_secs(500)).await;
        let mut session = store.get(&key("u1")).await.unwrap().unwrap();
        session.set_state(DialogueState::Collecting).unwrap();
        store.put(&key("u1"), &session).await.unwrap();

        tokio::time::advance(Duration::from_secs(500)).await;
        let loaded = store.get(&key("u1")).await.unwrap().unwrap();
        assert_eq!(loaded.state, DialogueState::Collecting);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = InMemorySessionStore::new(Duration::from_secs(600));
        let mut a = Session::new();
        a.push_user("a");
        let mut b = Session::new();
        b.push_user("b");
        store.put(&key("a"), &a).await.unwrap();
        store.put(&key("b"), &b).await.unwrap();

        assert_eq!(store.get(&key("a")).await.unwrap().unwrap().history[0].text, "a");
        assert_eq!(store.get(&key("b")).await.unwrap().unwrap().history[0].text, "b");
    }
}
