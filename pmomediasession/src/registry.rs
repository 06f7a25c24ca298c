use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, info};

use crate::config::SessionsConfig;
use crate::current::SessionSlot;
use crate::presenter::SnapshotPresenter;
use crate::relay::CommandRelay;
use crate::session::{SessionProvider, SessionRef, SessionsChangedListener};
use crate::watcher::SessionWatcher;

/// Tracks the current session from the provider's active-session list.
///
/// The first session of every non-empty list becomes current. This is not
/// always the session the user is interacting with, but the provider gives
/// no better signal. Empty or absent lists leave the current session alone.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    provider: Arc<dyn SessionProvider>,
    slot: SessionSlot,
    watcher: SessionWatcher,
    listener: Mutex<Option<Arc<dyn SessionsChangedListener>>>,
    log_active_sessions: bool,
}

/// Listener given to the provider; holds the registry weakly so the
/// provider never keeps it alive.
struct RegistryListener {
    registry: Weak<RegistryInner>,
}

impl SessionsChangedListener for RegistryListener {
    fn on_active_sessions_changed(&self, sessions: Option<Vec<SessionRef>>) {
        if let Some(inner) = self.registry.upgrade() {
            SessionRegistry { inner }.on_session_list_changed(sessions);
        }
    }
}

impl SessionRegistry {
    pub fn new(
        provider: Arc<dyn SessionProvider>,
        presenter: Arc<dyn SnapshotPresenter>,
        config: &SessionsConfig,
    ) -> Self {
        let slot = SessionSlot::new();
        let watcher = SessionWatcher::new(slot.clone(), presenter);
        Self {
            inner: Arc::new(RegistryInner {
                provider,
                slot,
                watcher,
                listener: Mutex::new(None),
                log_active_sessions: config.log_active_sessions,
            }),
        }
    }

    /// Registers for list-changed notifications. Subscribing twice is a no-op.
    pub fn subscribe(&self) {
        let mut listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if listener.is_some() {
            return;
        }

        let new_listener: Arc<dyn SessionsChangedListener> = Arc::new(RegistryListener {
            registry: Arc::downgrade(&self.inner),
        });
        self.inner
            .provider
            .add_sessions_listener(Arc::clone(&new_listener));
        *listener = Some(new_listener);
        debug!("Subscribed to active session changes");
    }

    /// Adopts the start-up list of active sessions.
    pub fn initialize(&self, sessions: Option<Vec<SessionRef>>) -> bool {
        self.adopt_first(sessions, None, "initial session list")
    }

    /// Adopts a start-up list queried after [`epoch`](Self::epoch) returned
    /// `seen`. A list change delivered in between is newer than this list
    /// and wins: nothing is attached then.
    pub fn initialize_if_unchanged(&self, seen: u64, sessions: Option<Vec<SessionRef>>) -> bool {
        self.adopt_first(sessions, Some(seen), "initial session list")
    }

    /// Attachment epoch of the current session slot.
    pub fn epoch(&self) -> u64 {
        self.inner.watcher.epoch()
    }

    /// Handles a list-changed notification from the provider.
    ///
    /// Returns `true` when the current session was (re)attached.
    pub fn on_session_list_changed(&self, sessions: Option<Vec<SessionRef>>) -> bool {
        self.adopt_first(sessions, None, "active sessions changed")
    }

    fn adopt_first(
        &self,
        sessions: Option<Vec<SessionRef>>,
        seen: Option<u64>,
        origin: &str,
    ) -> bool {
        let Some(sessions) = sessions.filter(|list| !list.is_empty()) else {
            debug!("{}: no active session, keeping current", origin);
            return false;
        };

        if self.inner.log_active_sessions {
            log_sessions(&sessions);
        }

        let first = Arc::clone(&sessions[0]);
        info!(owner = %first.owner_id(), count = sessions.len(), "{}: following first session", origin);
        match seen {
            Some(seen) => self.inner.watcher.attach_if_epoch(first, seen),
            None => {
                self.inner.watcher.attach(first);
                true
            }
        }
    }

    /// Stops listening to the provider. The current session is kept.
    pub fn teardown(&self) {
        let listener = self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            self.inner.provider.remove_sessions_listener(&listener);
            debug!("Unsubscribed from active session changes");
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Forgets the current session and drops the watcher's callback on it.
    pub fn reset(&self) {
        let previous = {
            let mut slot = self.inner.slot.lock();
            slot.epoch += 1;
            let callback = slot.callback.take();
            slot.session.take().zip(callback)
        };
        if let Some((session, callback)) = previous {
            debug!(owner = %session.owner_id(), "Current session cleared");
            session.unregister_callback(&callback);
        }
    }

    pub fn current(&self) -> Option<SessionRef> {
        self.inner.slot.current()
    }

    pub fn watcher(&self) -> &SessionWatcher {
        &self.inner.watcher
    }

    /// A relay dispatching to whatever session is current at call time.
    pub fn command_relay(&self) -> CommandRelay {
        CommandRelay::new(self.inner.slot.clone())
    }
}

fn log_sessions(sessions: &[SessionRef]) {
    for session in sessions {
        match session.playback_status() {
            Some(status) => debug!(
                owner = %session.owner_id(),
                state = status.as_str(),
                "Active session"
            ),
            None => debug!(owner = %session.owner_id(), "Active session with no playback state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::SupportedActions;
    use crate::memory::{InMemoryProvider, InMemorySession};
    use crate::model::{SessionMetadata, SessionSnapshot};
    use crate::presenter::SnapshotBus;
    use crossbeam_channel::Receiver;

    fn registry() -> (SessionRegistry, Arc<InMemoryProvider>, Receiver<SessionSnapshot>) {
        let provider = Arc::new(InMemoryProvider::new());
        let bus = SnapshotBus::new();
        let rx = bus.subscribe();
        let registry = SessionRegistry::new(
            provider.clone(),
            Arc::new(bus),
            &SessionsConfig {
                log_active_sessions: true,
            },
        );
        (registry, provider, rx)
    }

    fn session(owner: &str) -> SessionRef {
        let session = InMemorySession::shared(owner);
        session.set_metadata(Some(SessionMetadata::default().with_title(owner)));
        session.set_capability_mask(Some(SupportedActions::PLAY.bits()));
        session
    }

    fn current_owner(registry: &SessionRegistry) -> Option<String> {
        registry.current().map(|s| s.owner_id())
    }

    #[test]
    fn test_first_session_wins() {
        let (registry, _provider, rx) = registry();
        let list = vec![session("a"), session("b"), session("c")];

        assert!(registry.on_session_list_changed(Some(list)));
        assert_eq!(current_owner(&registry).as_deref(), Some("a"));
        assert_eq!(rx.try_recv().unwrap().owner_id, "a");
        assert!(rx.try_recv().is_err());

        assert!(registry.initialize(Some(vec![session("c"), session("a")])));
        assert_eq!(current_owner(&registry).as_deref(), Some("c"));
    }

    #[test]
    fn test_empty_list_keeps_current() {
        let (registry, _provider, _rx) = registry();
        registry.initialize(Some(vec![session("a")]));

        assert!(!registry.on_session_list_changed(Some(Vec::new())));
        assert!(!registry.on_session_list_changed(None));
        assert_eq!(current_owner(&registry).as_deref(), Some("a"));
    }

    #[test]
    fn test_initial_list_yields_to_newer_change() {
        let (registry, _provider, rx) = registry();
        let seen = registry.epoch();
        assert!(registry.on_session_list_changed(Some(vec![session("b")])));
        rx.try_recv().unwrap();

        assert!(!registry.initialize_if_unchanged(seen, Some(vec![session("a")])));
        assert_eq!(current_owner(&registry).as_deref(), Some("b"));
        assert!(rx.try_recv().is_err());

        assert!(registry.initialize_if_unchanged(registry.epoch(), Some(vec![session("c")])));
        assert_eq!(current_owner(&registry).as_deref(), Some("c"));
    }

    #[test]
    fn test_no_sessions_publishes_nothing() {
        let (registry, _provider, rx) = registry();
        assert!(!registry.initialize(None));
        assert!(registry.current().is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_subscribe_and_teardown() {
        let (registry, provider, rx) = registry();

        registry.subscribe();
        registry.subscribe();
        assert_eq!(provider.listener_count(), 1);
        assert!(registry.is_subscribed());

        provider.set_sessions(vec![session("a")]);
        assert_eq!(current_owner(&registry).as_deref(), Some("a"));
        assert_eq!(rx.try_recv().unwrap().owner_id, "a");

        registry.teardown();
        assert_eq!(provider.listener_count(), 0);
        assert!(!registry.is_subscribed());

        provider.set_sessions(vec![session("b")]);
        assert_eq!(current_owner(&registry).as_deref(), Some("a"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_reset_clears_and_detaches() {
        let (registry, _provider, rx) = registry();
        let tracked = InMemorySession::shared("a");
        tracked.set_metadata(Some(SessionMetadata::default().with_title("Song A")));
        registry.initialize(Some(vec![tracked.clone() as SessionRef]));
        rx.try_recv().unwrap();
        assert_eq!(tracked.callback_count(), 1);

        registry.reset();
        assert!(registry.current().is_none());
        assert_eq!(tracked.callback_count(), 0);

        tracked.set_metadata(Some(SessionMetadata::default().with_title("Song B")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_registry_ignores_late_notifications() {
        let (registry, provider, rx) = registry();
        registry.subscribe();
        drop(registry);

        provider.set_sessions(vec![session("a")]);
        assert!(rx.try_recv().is_err());
    }
}
