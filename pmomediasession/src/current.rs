use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::session::{SessionCallback, SessionRef};

/// State behind the single current-session slot.
#[derive(Default)]
pub(crate) struct SlotState {
    pub(crate) session: Option<SessionRef>,
    /// Callback registered on `session` by the watcher.
    pub(crate) callback: Option<Arc<dyn SessionCallback>>,
    /// Bumped on every attach and reset; callbacks carry the value they
    /// were registered under.
    pub(crate) epoch: u64,
}

/// The one session the mirror follows, shared by registry, watcher and relay.
#[derive(Clone, Default)]
pub(crate) struct SessionSlot {
    state: Arc<Mutex<SlotState>>,
}

impl SessionSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Current session lock poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    pub(crate) fn current(&self) -> Option<SessionRef> {
        self.lock().session.clone()
    }
}
