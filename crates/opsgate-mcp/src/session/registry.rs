//! Session registry — per-session handshake state and push-channel sender.
//!
//! Entries are `Arc<Mutex<_>>` behind one `RwLock`ed map: calls touching the
//! same session serialize on the entry, calls for different sessions do not
//! contend. The registry itself holds no global mutable state beyond the map.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex, RwLock};

use crate::types::{GatewayError, GatewayResult};

/// Handshake progress of one session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Uninitialized,
    AwaitingAck,
    Ready,
}

/// Mutable per-session state.
pub struct SessionState {
    pub id: String,
    pub handshake: HandshakeState,
    pub created_at: DateTime<Utc>,
    /// Sender for the session's push channel, when one is open. Carries
    /// serialized JSON envelopes; the transport wraps them into SSE frames.
    pub push_tx: Option<mpsc::UnboundedSender<String>>,
}

impl SessionState {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            handshake: HandshakeState::Uninitialized,
            created_at: Utc::now(),
            push_tx: None,
        }
    }
}

/// Registry of live sessions, injected into every component that needs one.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
    /// Accept requests for ids the registry has never seen. Some clients
    /// issue requests before their push channel registers; intended for
    /// development and testing.
    permissive: bool,
}

impl SessionRegistry {
    pub fn new(permissive: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            permissive,
        }
    }

    pub fn permissive(&self) -> bool {
        self.permissive
    }

    /// Create (or return) the session for `id`.
    pub async fn register(&self, id: &str) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::new(id))))
            .clone()
    }

    /// Look up a session. In permissive mode an unknown id gets a placeholder
    /// entry; otherwise the caller receives `SessionNotFound`.
    pub async fn get(&self, id: &str) -> GatewayResult<Arc<Mutex<SessionState>>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(id) {
                return Ok(session.clone());
            }
        }

        if self.permissive {
            tracing::debug!(session = id, "permissive mode: registering unseen session id");
            return Ok(self.register(id).await);
        }

        Err(GatewayError::SessionNotFound(id.to_string()))
    }

    /// Drop a session on channel close.
    pub async fn remove(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(id).is_some() {
            tracing::debug!(session = id, "session removed");
        }
    }

    /// Whether `id` is currently registered, without creating it.
    pub async fn contains(&self, id: &str) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Attach a push-channel sender to a session, registering it if new.
    pub async fn attach_push_channel(&self, id: &str, tx: mpsc::UnboundedSender<String>) {
        let session = self.register(id).await;
        session.lock().await.push_tx = Some(tx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn strict_mode_rejects_unknown_ids() {
        let registry = SessionRegistry::new(false);
        assert!(matches!(
            registry.get("ghost").await,
            Err(GatewayError::SessionNotFound(_))
        ));
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn permissive_mode_creates_placeholder() {
        let registry = SessionRegistry::new(true);
        let session = registry.get("ghost").await.unwrap();
        assert_eq!(session.lock().await.handshake, HandshakeState::Uninitialized);
        assert!(registry.contains("ghost").await);
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let registry = SessionRegistry::new(false);
        let a = registry.register("s1").await;
        a.lock().await.handshake = HandshakeState::Ready;
        let b = registry.register("s1").await;
        assert_eq!(b.lock().await.handshake, HandshakeState::Ready);
        assert_eq!(registry.count().await, 1);
    }

    #[tokio::test]
    async fn remove_forgets_the_session() {
        let registry = SessionRegistry::new(false);
        registry.register("s1").await;
        registry.remove("s1").await;
        assert!(!registry.contains("s1").await);
    }
}
