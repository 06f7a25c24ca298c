//! Interfaces implemented by the host's media session provider.
//!
//! The crate never owns sessions: the provider creates and destroys them and
//! hands out shared references ([`SessionRef`]). Callbacks may fire on any
//! provider thread.

use std::sync::Arc;

use crate::model::{PlaybackStatus, SessionMetadata};

pub type SessionRef = Arc<dyn MediaSession>;

/// Transport command sink of one session.
pub trait TransportControls: Send + Sync {
    fn play(&self);

    fn pause(&self);

    fn skip_to_next(&self);

    fn skip_to_previous(&self);

    fn stop(&self);
}

/// Per-session change notifications.
pub trait SessionCallback: Send + Sync {
    fn on_metadata_changed(&self);

    fn on_playback_state_changed(&self);
}

/// One media session as seen through the provider.
pub trait MediaSession: Send + Sync {
    /// Package / owner identifier of the application behind the session.
    fn owner_id(&self) -> String;

    fn metadata(&self) -> Option<SessionMetadata>;

    /// Raw capability bits, `None` when the session has no playback state.
    fn capability_mask(&self) -> Option<u64>;

    fn transport_controls(&self) -> Option<Arc<dyn TransportControls>>;

    fn register_callback(&self, callback: Arc<dyn SessionCallback>);

    /// Drops a callback previously given to [`MediaSession::register_callback`].
    ///
    /// Providers that cannot unregister may keep the default; stale
    /// callbacks are ignored by the watcher anyway.
    fn unregister_callback(&self, _callback: &Arc<dyn SessionCallback>) {}

    fn playback_status(&self) -> Option<PlaybackStatus> {
        None
    }
}

/// Receives active-session list updates from the provider.
pub trait SessionsChangedListener: Send + Sync {
    /// `sessions` is ordered as reported by the provider and may be absent.
    fn on_active_sessions_changed(&self, sessions: Option<Vec<SessionRef>>);
}

pub trait SessionProvider: Send + Sync {
    fn active_sessions(&self) -> Option<Vec<SessionRef>>;

    fn add_sessions_listener(&self, listener: Arc<dyn SessionsChangedListener>);

    fn remove_sessions_listener(&self, listener: &Arc<dyn SessionsChangedListener>);
}
