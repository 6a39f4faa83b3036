use crate::metrics;
use crate::session::error::{SessionError, SessionResult};
use crate::session::types::EchoSession;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Process-wide table of live echo sessions, keyed by session id.
///
/// Entries exist only while their channel is connected; nothing is persisted.
/// Every mutation happens under the map's shard lock and never spans an await.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, EchoSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly connected session
    pub fn insert(&self, session: EchoSession) -> SessionResult<()> {
        match self.sessions.entry(session.session_id.clone()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyExists(session.session_id)),
            Entry::Vacant(slot) => {
                slot.insert(session);
                metrics::record_session_opened();
                Ok(())
            }
        }
    }

    /// Connect a new session with a random id and return its guard
    pub fn connect(&self) -> SessionGuard {
        loop {
            let session_id = uuid::Uuid::new_v4().to_string();
            if self.insert(EchoSession::new(session_id.clone())).is_ok() {
                return SessionGuard {
                    registry: self.clone(),
                    session_id,
                };
            }
        }
    }

    /// Apply `f` to a session in place
    pub fn update<R>(
        &self,
        session_id: &str,
        f: impl FnOnce(&mut EchoSession) -> R,
    ) -> SessionResult<R> {
        let mut entry = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        Ok(f(&mut entry))
    }

    /// Remove a session, returning its final state
    pub fn remove(&self, session_id: &str) -> Option<EchoSession> {
        let removed = self.sessions.remove(session_id).map(|(_, s)| s);
        if removed.is_some() {
            metrics::record_session_closed();
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Owns one registry entry; the entry is removed when the guard drops.
#[derive(Debug)]
pub struct SessionGuard {
    registry: SessionRegistry,
    session_id: String,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn update<R>(&self, f: impl FnOnce(&mut EchoSession) -> R) -> SessionResult<R> {
        self.registry.update(&self.session_id, f)
    }

    /// Remove the entry now and hand back its final state
    pub fn close(self) -> Option<EchoSession> {
        self.registry.remove(&self.session_id)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.session_id);
    }
}
