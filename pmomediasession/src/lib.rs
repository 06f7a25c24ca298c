//! # pmomediasession
//!
//! Mirrors a single active media session into a presentation layer and
//! relays transport commands back to it.
//!
//! The host supplies a [`SessionProvider`] (the platform's session service)
//! and a [`SnapshotPresenter`]. The crate follows the first session of each
//! active-session list, publishes a [`SessionSnapshot`] whenever its
//! metadata or playback state changes, and forwards [`ActionKind`] commands
//! to its transport controls.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pmomediasession::{
//!     ActionKind, InMemoryProvider, MediaMirror, MirrorConfig, TracingPresenter,
//! };
//!
//! let config = MirrorConfig::load(None)?;
//! let provider = Arc::new(InMemoryProvider::new());
//! let presenter = Arc::new(TracingPresenter::from_config(&config));
//!
//! let mirror = MediaMirror::start(true, provider, presenter, &config)?;
//! mirror.dispatch(ActionKind::Play);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod access;
pub mod actions;
pub mod config;
mod current;
pub mod errors;
pub mod logging;
pub mod memory;
pub mod mirror;
pub mod model;
pub mod presenter;
pub mod registry;
pub mod relay;
pub mod session;
pub mod watcher;

pub use access::AccessGate;
pub use actions::{ActionKind, SupportedActions, decode};
pub use config::MirrorConfig;
pub use errors::MediaSessionError;
pub use logging::init_logging;
pub use memory::{InMemoryProvider, InMemorySession, RecordingTransport};
pub use mirror::MediaMirror;
pub use model::{Artwork, PlaybackStatus, SessionMetadata, SessionSnapshot};
pub use presenter::{SnapshotBus, SnapshotPresenter, TracingPresenter};
pub use registry::SessionRegistry;
pub use relay::{CommandRelay, DispatchOutcome};
pub use session::{
    MediaSession, SessionCallback, SessionProvider, SessionRef, SessionsChangedListener,
    TransportControls,
};
pub use watcher::SessionWatcher;
