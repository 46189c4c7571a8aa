//! Process-wide registry of in-flight transport sessions.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::TransportSession;
use crate::error::CheckoutError;

static GLOBAL: LazyLock<Arc<SessionRegistry>> = LazyLock::new(|| Arc::new(SessionRegistry::new()));

/// Concurrency-safe map from transport id to the live session.
///
/// Lifetime contract for an id: it is registered before any transport use,
/// released exactly once when its [`SessionGuard`] drops, and cannot be
/// registered again while a session under it is live.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<TransportSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every [`Checkout`](crate::checkout::Checkout)
    /// that was not given its own.
    pub fn global() -> Arc<SessionRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Register a session under its transport id.
    ///
    /// Fails with [`CheckoutError::MissingTransportId`] for an empty id and
    /// [`CheckoutError::SessionInUse`] if the id is already live.
    pub fn register(
        self: &Arc<Self>,
        session: TransportSession,
    ) -> Result<SessionGuard, CheckoutError> {
        let id = session.id().to_string();
        if id.is_empty() {
            return Err(CheckoutError::MissingTransportId);
        }

        let session = Arc::new(session);
        {
            let mut sessions = self.lock();
            if sessions.contains_key(&id) {
                return Err(CheckoutError::SessionInUse(id));
            }
            sessions.insert(id.clone(), Arc::clone(&session));
        }
        debug!(id = %id, url = session.target_url(), "registered transport session");

        Ok(SessionGuard {
            registry: Arc::clone(self),
            id,
            session,
        })
    }

    /// Look up a live session.
    pub fn get(&self, id: &str) -> Option<Arc<TransportSession>> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn release(&self, id: &str) {
        if self.lock().remove(id).is_some() {
            debug!(id, "released transport session");
        }
    }

    // Every critical section is a single map call; poisoning leaves no partial state.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<TransportSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a session registered; removes it from the registry on drop.
#[derive(Debug)]
pub struct SessionGuard {
    registry: Arc<SessionRegistry>,
    id: String,
    session: Arc<TransportSession>,
}

impl SessionGuard {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn session(&self) -> &TransportSession {
        &self.session
    }
}

impl std::ops::Deref for SessionGuard {
    type Target = TransportSession;

    fn deref(&self) -> &TransportSession {
        &self.session
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.release(&self.id);
    }
}
