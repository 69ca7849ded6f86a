//! Process-wide state shared by every request.
//!
//! Built once at startup and wrapped in `Arc`. The directory and the
//! completion client are read-only; only the session store mutates.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use uuid::Uuid;

use crate::completion::CompletionClient;
use crate::directory::Directory;
use crate::session_store::{SessionHandle, SessionInfo, SessionStore};
use crate::triage::{TriageFlow, TriageSession};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("Lock poisoned")]
    LockPoisoned,
}

pub struct CoreState {
    directory: Directory,
    client: Arc<dyn CompletionClient>,
    sessions: RwLock<SessionStore>,
}

impl CoreState {
    pub fn new(
        directory: Directory,
        client: Arc<dyn CompletionClient>,
        session_idle_timeout: Duration,
    ) -> Self {
        Self {
            directory,
            client,
            sessions: RwLock::new(SessionStore::new(session_idle_timeout)),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn client(&self) -> &dyn CompletionClient {
        self.client.as_ref()
    }

    /// Flow handlers bound to this process's collaborators.
    pub fn flow(&self) -> TriageFlow<'_> {
        TriageFlow::new(self.client.as_ref(), &self.directory)
    }

    // ── Sessions ────────────────────────────────────────────

    /// Start a new session. Sweeps idle sessions first.
    pub fn create_session(&self) -> Result<(SessionInfo, SessionHandle), CoreError> {
        let mut store = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        store.evict_idle();
        Ok(store.create())
    }

    pub fn session(&self, id: &Uuid) -> Result<SessionHandle, CoreError> {
        let mut store = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        store.touch(id).ok_or(CoreError::SessionNotFound(*id))
    }

    pub fn end_session(&self, id: &Uuid) -> Result<(), CoreError> {
        let mut store = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        if store.remove(id) {
            Ok(())
        } else {
            Err(CoreError::SessionNotFound(*id))
        }
    }

    pub fn session_info(&self, id: &Uuid) -> Option<SessionInfo> {
        self.sessions.read().ok().and_then(|s| s.info(id))
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Run `f` with exclusive access to one session. Holds only that
    /// session's lock, never the store lock.
    pub fn with_session<T>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut TriageSession) -> T,
    ) -> Result<T, CoreError> {
        let handle = self.session(id)?;
        let mut guard = handle.lock().map_err(|_| CoreError::LockPoisoned)?;
        Ok(f(&mut *guard))
    }
}
