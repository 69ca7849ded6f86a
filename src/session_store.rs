//! In-memory store of triage sessions, one per browser.
//!
//! Key properties:
//! - Sessions exist only in memory, never persisted
//! - Each session sits behind its own mutex so one user's completion call
//!   does not block another user
//! - Sessions idle longer than the timeout are evicted on the next sweep

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::triage::TriageSession;

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<TriageSession>>;

struct StoredSession {
    state: SessionHandle,
    created_at: chrono::DateTime<chrono::Utc>,
    last_seen: Instant,
}

/// Metadata about a live session.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub created_at: String,
}

pub struct SessionStore {
    sessions: HashMap<Uuid, StoredSession>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
        }
    }

    /// Create a fresh session at `initial_input`.
    pub fn create(&mut self) -> (SessionInfo, SessionHandle) {
        let id = Uuid::new_v4();
        let created_at = chrono::Utc::now();
        let state = Arc::new(Mutex::new(TriageSession::new()));
        self.sessions.insert(
            id,
            StoredSession {
                state: state.clone(),
                created_at,
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(session_id = %id, "Session created");
        (
            SessionInfo {
                id,
                created_at: created_at.to_rfc3339(),
            },
            state,
        )
    }

    /// Look up a session and mark it as active.
    pub fn touch(&mut self, id: &Uuid) -> Option<SessionHandle> {
        let stored = self.sessions.get_mut(id)?;
        stored.last_seen = Instant::now();
        Some(stored.state.clone())
    }

    pub fn info(&self, id: &Uuid) -> Option<SessionInfo> {
        self.sessions.get(id).map(|s| SessionInfo {
            id: *id,
            created_at: s.created_at.to_rfc3339(),
        })
    }

    pub fn remove(&mut self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Drop sessions idle longer than the timeout. Returns how many.
    pub fn evict_idle(&mut self) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions.retain(|_, s| s.last_seen.elapsed() <= timeout);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
