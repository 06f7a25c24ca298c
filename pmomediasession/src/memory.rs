//! In-process session provider.
//!
//! Hosts without a platform session service can feed sessions by hand
//! through these types. Every mutation notifies registered callbacks
//! synchronously on the calling thread, after the internal locks are
//! released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::actions::ActionKind;
use crate::model::{PlaybackStatus, SessionMetadata};
use crate::session::{
    MediaSession, SessionCallback, SessionProvider, SessionRef, SessionsChangedListener,
    TransportControls,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct SessionState {
    metadata: Option<SessionMetadata>,
    capability_mask: Option<u64>,
    playback_status: Option<PlaybackStatus>,
    controls: Option<Arc<dyn TransportControls>>,
}

/// A session whose state is set directly by the host.
pub struct InMemorySession {
    owner_id: String,
    state: Mutex<SessionState>,
    callbacks: Mutex<Vec<Arc<dyn SessionCallback>>>,
}

impl InMemorySession {
    pub fn new(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            state: Mutex::new(SessionState::default()),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(owner_id: &str) -> Arc<Self> {
        Arc::new(Self::new(owner_id))
    }

    pub fn set_metadata(&self, metadata: Option<SessionMetadata>) {
        lock(&self.state).metadata = metadata;
        self.notify_metadata_changed();
    }

    pub fn set_capability_mask(&self, mask: Option<u64>) {
        lock(&self.state).capability_mask = mask;
        self.notify_playback_state_changed();
    }

    pub fn set_playback_status(&self, status: Option<PlaybackStatus>) {
        lock(&self.state).playback_status = status;
        self.notify_playback_state_changed();
    }

    pub fn set_transport_controls(&self, controls: Option<Arc<dyn TransportControls>>) {
        lock(&self.state).controls = controls;
    }

    pub fn notify_metadata_changed(&self) {
        for callback in self.callbacks() {
            callback.on_metadata_changed();
        }
    }

    pub fn notify_playback_state_changed(&self) {
        for callback in self.callbacks() {
            callback.on_playback_state_changed();
        }
    }

    /// Callbacks currently registered, in registration order.
    pub fn callbacks(&self) -> Vec<Arc<dyn SessionCallback>> {
        lock(&self.callbacks).clone()
    }

    pub fn callback_count(&self) -> usize {
        lock(&self.callbacks).len()
    }
}

impl MediaSession for InMemorySession {
    fn owner_id(&self) -> String {
        self.owner_id.clone()
    }

    fn metadata(&self) -> Option<SessionMetadata> {
        lock(&self.state).metadata.clone()
    }

    fn capability_mask(&self) -> Option<u64> {
        lock(&self.state).capability_mask
    }

    fn transport_controls(&self) -> Option<Arc<dyn TransportControls>> {
        lock(&self.state).controls.clone()
    }

    fn register_callback(&self, callback: Arc<dyn SessionCallback>) {
        lock(&self.callbacks).push(callback);
    }

    fn unregister_callback(&self, callback: &Arc<dyn SessionCallback>) {
        lock(&self.callbacks).retain(|registered| !Arc::ptr_eq(registered, callback));
    }

    fn playback_status(&self) -> Option<PlaybackStatus> {
        lock(&self.state).playback_status.clone()
    }
}

/// Provider backed by a list the host replaces as sessions come and go.
#[derive(Default)]
pub struct InMemoryProvider {
    sessions: Mutex<Vec<SessionRef>>,
    listeners: Mutex<Vec<Arc<dyn SessionsChangedListener>>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active list and notifies every listener.
    pub fn set_sessions(&self, sessions: Vec<SessionRef>) {
        *lock(&self.sessions) = sessions.clone();
        self.notify(Some(sessions));
    }

    /// Sends a raw notification without touching the stored list.
    pub fn notify(&self, sessions: Option<Vec<SessionRef>>) {
        let listeners = lock(&self.listeners).clone();
        for listener in listeners {
            listener.on_active_sessions_changed(sessions.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

impl SessionProvider for InMemoryProvider {
    fn active_sessions(&self) -> Option<Vec<SessionRef>> {
        Some(lock(&self.sessions).clone())
    }

    fn add_sessions_listener(&self, listener: Arc<dyn SessionsChangedListener>) {
        lock(&self.listeners).push(listener);
    }

    fn remove_sessions_listener(&self, listener: &Arc<dyn SessionsChangedListener>) {
        lock(&self.listeners).retain(|registered| !Arc::ptr_eq(registered, listener));
    }
}

/// Transport controls that only remember what they were asked to do.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    commands: Mutex<Vec<ActionKind>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<ActionKind> {
        lock(&self.commands).clone()
    }

    fn record(&self, kind: ActionKind) {
        lock(&self.commands).push(kind);
    }
}

impl TransportControls for RecordingTransport {
    fn play(&self) {
        self.record(ActionKind::Play);
    }

    fn pause(&self) {
        self.record(ActionKind::Pause);
    }

    fn skip_to_next(&self) {
        self.record(ActionKind::SkipNext);
    }

    fn skip_to_previous(&self) {
        self.record(ActionKind::SkipPrevious);
    }

    fn stop(&self) {
        self.record(ActionKind::Stop);
    }
}
