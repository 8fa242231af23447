//! Session Store: id → session map, constructed once at startup and injected.
//!
//! Every session sits behind its own async mutex. Holding it for the length of a
//! manager operation (generator awaits included) gives one writer per session at a
//! time. The outer map lock is only held for lookups, inserts and removals.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::errors::InterviewError;
use crate::interview::session::{Difficulty, Session};

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session with a fresh id and registers it.
    pub async fn create(
        &self,
        role: String,
        difficulty: Difficulty,
        topics: Vec<String>,
    ) -> (String, SessionHandle) {
        let mut sessions = self.sessions.write().await;

        let mut id = generate_session_id();
        while sessions.contains_key(&id) {
            id = generate_session_id();
        }

        let handle = Arc::new(Mutex::new(Session::new(id.clone(), role, difficulty, topics)));
        sessions.insert(id.clone(), Arc::clone(&handle));
        debug!("Session {id} created ({} live)", sessions.len());
        (id, handle)
    }

    pub async fn get(&self, id: &str) -> Result<SessionHandle, InterviewError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| InterviewError::SessionNotFound(id.to_string()))
    }

    /// Returns true if a session was removed.
    pub async fn delete(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Removes sessions idle for longer than `ttl`. Returns the number evicted.
    ///
    /// A session is in use while any handle besides the map's own is alive: an
    /// operation takes its handle from `get` before it locks, so a clone count
    /// above one covers the gap between lookup and lock as well as the lock itself.
    pub async fn evict_idle(&self, ttl: Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => session.last_accessed_at >= cutoff,
                Err(_) => true,
            }
        });

        before - sessions.len()
    }
}

/// `session_<16 hex chars>_<unix seconds>`
fn generate_session_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", &hex[..16], Utc::now().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create(store: &SessionStore) -> String {
        let (id, _) = store
            .create(
                "backend engineer".to_string(),
                Difficulty::Medium,
                vec!["system design".to_string()],
            )
            .await;
        id
    }

    #[test]
    fn test_session_id_format() {
        let id = generate_session_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "session");
        assert_eq!(parts[1].len(), 16);
        assert!(parts[1].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(parts[2].parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = SessionStore::new();
        let id = create(&store).await;
        let handle = store.get(&id).await.unwrap();
        let session = handle.lock().await;
        assert_eq!(session.id, id);
        assert_eq!(session.role, "backend engineer");
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = SessionStore::new();
        let a = create(&store).await;
        let b = create(&store).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(
            store.get("session_missing").await,
            Err(InterviewError::SessionNotFound(id)) if id == "session_missing"
        ));
    }

    #[tokio::test]
    async fn test_delete_twice_reports_missing_second_time() {
        let store = SessionStore::new();
        let id = create(&store).await;
        assert!(store.delete(&id).await);
        assert!(!store.delete(&id).await);
        assert!(store.get(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_ids() {
        let store = SessionStore::new();
        let a = create(&store).await;
        let b = create(&store).await;
        let ids = store.list_ids().await;
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a));
        assert!(ids.contains(&b));
    }

    #[tokio::test]
    async fn test_evict_idle_removes_only_stale_sessions() {
        let store = SessionStore::new();
        let stale = create(&store).await;
        let fresh = create(&store).await;

        {
            let handle = store.get(&stale).await.unwrap();
            handle.lock().await.last_accessed_at = Utc::now() - Duration::hours(3);
        }

        let evicted = store.evict_idle(Duration::hours(2)).await;
        assert_eq!(evicted, 1);
        assert!(store.get(&stale).await.is_err());
        assert!(store.get(&fresh).await.is_ok());
    }

    #[tokio::test]
    async fn test_evict_idle_skips_locked_sessions() {
        let store = SessionStore::new();
        let id = create(&store).await;
        let handle = store.get(&id).await.unwrap();
        let mut guard = handle.lock().await;
        guard.last_accessed_at = Utc::now() - Duration::hours(3);

        assert_eq!(store.evict_idle(Duration::hours(2)).await, 0);
        drop(guard);
        drop(handle);
        assert_eq!(store.evict_idle(Duration::hours(2)).await, 1);
    }

    #[tokio::test]
    async fn test_evict_idle_skips_session_fetched_but_not_yet_locked() {
        let store = SessionStore::new();
        let id = create(&store).await;
        {
            let handle = store.get(&id).await.unwrap();
            handle.lock().await.last_accessed_at = Utc::now() - Duration::hours(3);
        }

        // An operation has looked the session up and is about to lock it
        let handle = store.get(&id).await.unwrap();
        assert_eq!(store.evict_idle(Duration::hours(2)).await, 0);

        // The operation refreshes the session and it stays reachable
        handle.lock().await.touch();
        drop(handle);
        assert_eq!(store.evict_idle(Duration::hours(2)).await, 0);
        assert!(store.get(&id).await.is_ok());
    }
}
