use std::sync::{Arc, Mutex, PoisonError};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, info};

use crate::config::MirrorConfig;
use crate::model::{Artwork, SessionSnapshot};

/// Presentation side of the mirror.
///
/// `render` is called with the mirror's session lock held: implementations
/// must return quickly and must not call back into the mirror. It may be
/// called repeatedly with identical snapshots.
pub trait SnapshotPresenter: Send + Sync {
    fn render(&self, snapshot: &SessionSnapshot);
}

/// Fans snapshots out to any number of channel subscribers.
///
/// Subscribers whose receiver was dropped are pruned on the next render.
#[derive(Clone, Default)]
pub struct SnapshotBus {
    subscribers: Arc<Mutex<Vec<Sender<SessionSnapshot>>>>,
}

impl SnapshotBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscribe(&self) -> Receiver<SessionSnapshot> {
        let (tx, rx) = unbounded::<SessionSnapshot>();
        {
            let mut subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.push(tx);
        }
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn broadcast(&self, snapshot: SessionSnapshot) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }
}

impl SnapshotPresenter for SnapshotBus {
    fn render(&self, snapshot: &SessionSnapshot) {
        self.broadcast(snapshot.clone());
    }
}

/// Writes every snapshot to the log as labelled lines.
#[derive(Clone, Debug)]
pub struct TracingPresenter {
    verbose: bool,
}

impl TracingPresenter {
    /// `verbose` logs at info level, otherwise at debug level.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn from_config(config: &MirrorConfig) -> Self {
        Self::new(config.presentation.log_snapshots)
    }
}

impl SnapshotPresenter for TracingPresenter {
    fn render(&self, snapshot: &SessionSnapshot) {
        for line in describe(snapshot) {
            if self.verbose {
                info!(owner = %snapshot.owner_id, "{}", line);
            } else {
                debug!(owner = %snapshot.owner_id, "{}", line);
            }
        }
    }
}

/// Human readable rendering of a snapshot, one line per present field.
///
/// Absent metadata fields are omitted. When no action is supported the
/// controls line says so instead of listing them.
pub fn describe(snapshot: &SessionSnapshot) -> Vec<String> {
    let metadata = &snapshot.metadata;
    let mut lines = vec![format!("Owner: {}", snapshot.owner_id)];

    let texts = [
        ("Title", &metadata.title),
        ("Album", &metadata.album),
        ("Artist", &metadata.artist),
        ("Display Title", &metadata.display_title),
        ("Display sub-title", &metadata.display_subtitle),
    ];
    for (label, value) in texts {
        if let Some(value) = value {
            lines.push(format!("{}: {}", label, value));
        }
    }

    let artworks = [
        ("Album art", &metadata.album_art),
        ("Album art URI", &metadata.album_art_uri),
        ("Art", &metadata.art),
    ];
    for (label, value) in artworks {
        match value {
            Some(Artwork::Uri(uri)) => lines.push(format!("{}: {}", label, uri)),
            Some(Artwork::Bitmap(bytes)) => {
                lines.push(format!("{}: <{} bytes>", label, bytes.len()))
            }
            None => {}
        }
    }

    if snapshot.has_controls() {
        let names: Vec<&str> = snapshot
            .supported_actions
            .kinds()
            .map(|kind| kind.as_str())
            .collect();
        lines.push(format!("Controls: {}", names.join(", ")));
    } else {
        lines.push("Controls: none".to_string());
    }

    lines
}
