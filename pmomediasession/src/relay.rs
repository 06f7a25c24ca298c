use tracing::debug;

use crate::actions::ActionKind;
use crate::current::SessionSlot;

/// What a dispatch did. None of these is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Forwarded,
    NoSession,
    NoTransportControls,
}

/// Forwards user intents to the current session's transport controls.
///
/// The relay does not look at the supported actions: hosts only offer the
/// affordances the last snapshot advertised.
#[derive(Clone)]
pub struct CommandRelay {
    slot: SessionSlot,
}

impl CommandRelay {
    pub(crate) fn new(slot: SessionSlot) -> Self {
        Self { slot }
    }

    pub fn dispatch(&self, intent: ActionKind) -> DispatchOutcome {
        // release the slot before calling out: controls may trigger callbacks
        let Some(session) = self.slot.current() else {
            debug!(%intent, "No current session, ignoring command");
            return DispatchOutcome::NoSession;
        };

        let Some(controls) = session.transport_controls() else {
            debug!(owner = %session.owner_id(), %intent, "Session exposes no transport controls");
            return DispatchOutcome::NoTransportControls;
        };

        debug!(owner = %session.owner_id(), %intent, "Forwarding transport command");
        match intent {
            ActionKind::Play => controls.play(),
            ActionKind::Pause => controls.pause(),
            ActionKind::SkipNext => controls.skip_to_next(),
            ActionKind::SkipPrevious => controls.skip_to_previous(),
            ActionKind::Stop => controls.stop(),
        }
        DispatchOutcome::Forwarded
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::{InMemorySession, RecordingTransport};
    use crate::presenter::SnapshotBus;
    use crate::watcher::SessionWatcher;

    #[test]
    fn test_dispatch_without_session() {
        let relay = CommandRelay::new(SessionSlot::new());
        for kind in ActionKind::ALL {
            assert_eq!(relay.dispatch(kind), DispatchOutcome::NoSession);
        }
    }

    #[test]
    fn test_dispatch_without_controls() {
        let slot = SessionSlot::new();
        let watcher = SessionWatcher::new(slot.clone(), Arc::new(SnapshotBus::new()));
        watcher.attach(InMemorySession::shared("org.example.a"));

        let relay = CommandRelay::new(slot);
        assert_eq!(relay.dispatch(ActionKind::Play), DispatchOutcome::NoTransportControls);
    }

    #[test]
    fn test_dispatch_maps_every_intent() {
        let slot = SessionSlot::new();
        let watcher = SessionWatcher::new(slot.clone(), Arc::new(SnapshotBus::new()));
        let session = InMemorySession::shared("org.example.a");
        let transport = Arc::new(RecordingTransport::new());
        session.set_transport_controls(Some(transport.clone()));
        watcher.attach(session);

        let relay = CommandRelay::new(slot);
        for kind in ActionKind::ALL {
            assert_eq!(relay.dispatch(kind), DispatchOutcome::Forwarded);
        }
        assert_eq!(transport.commands(), ActionKind::ALL.to_vec());
    }
}
