use std::sync::Arc;

use tracing::{info, warn};

use crate::access::AccessGate;
use crate::actions::ActionKind;
use crate::config::MirrorConfig;
use crate::errors::MediaSessionError;
use crate::presenter::SnapshotPresenter;
use crate::registry::SessionRegistry;
use crate::relay::{CommandRelay, DispatchOutcome};
use crate::session::SessionProvider;

/// Mirror of the provider's current media session:
/// - subscribes to active-session changes,
/// - follows the first reported session and renders its snapshots,
/// - relays transport commands to it.
///
/// Dropping the mirror unsubscribes from the provider.
pub struct MediaMirror {
    registry: SessionRegistry,
    relay: CommandRelay,
}

impl MediaMirror {
    /// Starts mirroring.
    ///
    /// Fails only when `access` is denied, in which case nothing is
    /// subscribed and the provider is not queried.
    pub fn start(
        access: impl Into<AccessGate>,
        provider: Arc<dyn SessionProvider>,
        presenter: Arc<dyn SnapshotPresenter>,
        config: &MirrorConfig,
    ) -> Result<Self, MediaSessionError> {
        if let Err(err) = access.into().check() {
            warn!("Media session mirror not started: {}", err);
            return Err(err);
        }

        let registry = SessionRegistry::new(Arc::clone(&provider), presenter, &config.sessions);
        registry.subscribe();
        let seen = registry.epoch();
        registry.initialize_if_unchanged(seen, provider.active_sessions());

        let relay = registry.command_relay();
        let following = registry
            .current()
            .map(|session| session.owner_id())
            .unwrap_or_else(|| "-".to_string());
        info!(following = %following, "Media session mirror started");

        Ok(Self { registry, relay })
    }

    pub fn dispatch(&self, intent: ActionKind) -> DispatchOutcome {
        self.relay.dispatch(intent)
    }

    /// Owner identifier of the session being mirrored.
    pub fn current_owner(&self) -> Option<String> {
        self.registry.current().map(|session| session.owner_id())
    }

    /// Publishes the current session's state again.
    pub fn refresh(&self) -> bool {
        self.registry.watcher().recompute_and_publish()
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn relay(&self) -> &CommandRelay {
        &self.relay
    }

    /// Unsubscribes from the provider. Safe to call more than once.
    pub fn shutdown(&self) {
        if self.registry.is_subscribed() {
            self.registry.teardown();
            info!("Media session mirror stopped");
        }
    }
}

impl Drop for MediaMirror {
    fn drop(&mut self) {
        self.shutdown();
    }
}
