//! Session change subscriptions
//!
//! Listeners are held in a registry owned by the backend. A [`Subscription`]
//! only keeps a weak handle to that registry, so a dropped backend never
//! keeps callbacks alive and a dropped subscription never leaks a listener.

use super::types::Session;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Callback invoked with the current session (or `None` when signed out)
pub type SessionCallback = Box<dyn Fn(Option<Session>) + Send + Sync>;

/// Registry of active session listeners
#[derive(Default)]
pub struct SessionListeners {
    next_id: AtomicU64,
    callbacks: Mutex<HashMap<u64, Arc<dyn Fn(Option<Session>) + Send + Sync>>>,
}

impl SessionListeners {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a callback and immediately invoke it with `current`
    pub fn subscribe(
        self: &Arc<Self>,
        current: Option<Session>,
        callback: SessionCallback,
    ) -> Subscription {
        let callback: Arc<dyn Fn(Option<Session>) + Send + Sync> = Arc::from(callback);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.lock().insert(id, Arc::clone(&callback));
        tracing::debug!(listener = id, "session listener registered");

        callback(current);

        Subscription {
            id,
            listeners: Arc::downgrade(self),
            active: true,
        }
    }

    /// Invoke every registered callback with the new session state
    pub fn notify(&self, session: Option<Session>) {
        if self.is_empty() {
            return;
        }
        // Snapshot first so a callback may cancel its own subscription.
        let callbacks: Vec<_> = self.callbacks.lock().values().cloned().collect();
        for callback in callbacks {
            callback(session.clone());
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.callbacks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        if self.callbacks.lock().remove(&id).is_some() {
            tracing::debug!(listener = id, "session listener released");
        }
    }
}

/// Handle to a registered session listener; cancelled on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    listeners: Weak<SessionListeners>,
    active: bool,
}

impl Subscription {
    /// A subscription bound to nothing, for collaborators without change feeds
    pub fn detached() -> Self {
        Self {
            id: 0,
            listeners: Weak::new(),
            active: false,
        }
    }

    /// Stop receiving callbacks. Calling this more than once is a no-op.
    pub fn cancel(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.remove(self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for SessionListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionListeners")
            .field("listeners", &self.len())
            .finish()
    }
}
