//! Watches the current session and publishes snapshots.
//!
//! ## Ordering
//!
//! Every attach bumps the slot epoch and the registered callback remembers
//! the epoch it belongs to. An event whose epoch is no longer the slot's
//! comes from a superseded attachment and is dropped. Snapshots are built
//! and rendered with the slot lock held, so publishes never interleave.

use std::sync::{Arc, Weak};

use tracing::debug;

use crate::current::{SessionSlot, SlotState};
use crate::model::SessionSnapshot;
use crate::presenter::SnapshotPresenter;
use crate::session::{SessionCallback, SessionRef};

#[derive(Clone)]
pub struct SessionWatcher {
    inner: Arc<WatcherInner>,
}

struct WatcherInner {
    slot: SessionSlot,
    presenter: Arc<dyn SnapshotPresenter>,
}

/// Callback handed to a session; forwards to the watcher while its
/// attachment is still the current one.
struct WatcherCallback {
    watcher: Weak<WatcherInner>,
    epoch: u64,
}

impl SessionCallback for WatcherCallback {
    fn on_metadata_changed(&self) {
        if let Some(watcher) = self.watcher.upgrade() {
            watcher.publish_for_epoch(self.epoch, "metadata");
        }
    }

    fn on_playback_state_changed(&self) {
        if let Some(watcher) = self.watcher.upgrade() {
            watcher.publish_for_epoch(self.epoch, "playback state");
        }
    }
}

impl SessionWatcher {
    pub(crate) fn new(slot: SessionSlot, presenter: Arc<dyn SnapshotPresenter>) -> Self {
        Self {
            inner: Arc::new(WatcherInner { slot, presenter }),
        }
    }

    /// Makes `session` the current one, registers change callbacks on it
    /// and publishes its state right away.
    ///
    /// The callback of the previous session, if any, is unregistered.
    pub fn attach(&self, session: SessionRef) {
        self.attach_unless_moved(session, None);
    }

    /// Attaches `session` only if no attach or reset happened since the
    /// slot epoch was `seen`. Returns `false` when the slot moved on.
    pub fn attach_if_epoch(&self, session: SessionRef, seen: u64) -> bool {
        self.attach_unless_moved(session, Some(seen))
    }

    /// Current slot epoch, to be handed back to [`attach_if_epoch`](Self::attach_if_epoch).
    pub fn epoch(&self) -> u64 {
        self.inner.slot.lock().epoch
    }

    fn attach_unless_moved(&self, session: SessionRef, seen: Option<u64>) -> bool {
        let (epoch, previous) = {
            let mut slot = self.inner.slot.lock();
            if let Some(seen) = seen.filter(|seen| *seen != slot.epoch) {
                debug!(
                    owner = %session.owner_id(),
                    seen,
                    current_epoch = slot.epoch,
                    "Slot moved on, not attaching"
                );
                return false;
            }
            slot.epoch += 1;
            let previous_callback = slot.callback.take();
            let previous_session = slot.session.replace(Arc::clone(&session));
            (slot.epoch, previous_session.zip(previous_callback))
        };

        // provider calls happen without the slot lock: a provider may fire
        // callbacks synchronously from register/unregister
        if let Some((old_session, old_callback)) = previous {
            old_session.unregister_callback(&old_callback);
        }

        let callback: Arc<dyn SessionCallback> = Arc::new(WatcherCallback {
            watcher: Arc::downgrade(&self.inner),
            epoch,
        });
        session.register_callback(Arc::clone(&callback));

        let mut slot = self.inner.slot.lock();
        if slot.epoch != epoch {
            drop(slot);
            debug!(owner = %session.owner_id(), epoch, "Attachment superseded before completion");
            session.unregister_callback(&callback);
            return true;
        }
        slot.callback = Some(callback);
        debug!(owner = %session.owner_id(), epoch, "Attached to session");
        self.inner.publish_locked(&slot);
        true
    }

    /// Same as a metadata change notification on the current session.
    pub fn on_metadata_changed(&self) -> bool {
        self.recompute_and_publish()
    }

    /// Same as a playback state change notification on the current session.
    pub fn on_playback_state_changed(&self) -> bool {
        self.recompute_and_publish()
    }

    /// Reads the current session and publishes a fresh snapshot.
    ///
    /// Returns `false` when nothing was published: no current session, or
    /// the session has no metadata right now.
    pub fn recompute_and_publish(&self) -> bool {
        let slot = self.inner.slot.lock();
        self.inner.publish_locked(&slot)
    }
}

impl WatcherInner {
    fn publish_for_epoch(&self, epoch: u64, cause: &str) -> bool {
        let slot = self.slot.lock();
        if slot.epoch != epoch {
            debug!(
                epoch,
                current_epoch = slot.epoch,
                "Discarding {} change from a superseded session",
                cause
            );
            return false;
        }
        self.publish_locked(&slot)
    }

    fn publish_locked(&self, slot: &SlotState) -> bool {
        let Some(session) = slot.session.as_ref() else {
            return false;
        };

        match SessionSnapshot::capture(session.as_ref()) {
            Some(snapshot) => {
                debug!(
                    owner = %snapshot.owner_id,
                    actions = ?snapshot.supported_actions,
                    "Publishing session snapshot"
                );
                self.presenter.render(&snapshot);
                true
            }
            None => {
                debug!(owner = %session.owner_id(), "Session has no metadata, keeping previous display");
                false
            }
        }
    }
}
