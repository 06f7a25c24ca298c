use std::sync::Arc;

use serde::Serialize;

use crate::actions::{SupportedActions, decode};
use crate::session::MediaSession;

/// Artwork attached to a session's metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Artwork {
    /// Location the host can fetch the image from.
    Uri(String),
    /// Encoded image bytes handed over by the provider.
    Bitmap(Arc<[u8]>),
}

/// Metadata currently published by a session.
///
/// Every field is independently optional; providers fill any subset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionMetadata {
    pub title: Option<String>,
    pub album: Option<String>,
    pub artist: Option<String>,
    /// Provider-suggested display strings, distinct from title/artist.
    pub display_title: Option<String>,
    pub display_subtitle: Option<String>,
    pub album_art: Option<Artwork>,
    pub album_art_uri: Option<Artwork>,
    pub art: Option<Artwork>,
}

impl SessionMetadata {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_album(mut self, album: &str) -> Self {
        self.album = Some(album.to_string());
        self
    }

    pub fn with_artist(mut self, artist: &str) -> Self {
        self.artist = Some(artist.to_string());
        self
    }

    pub fn with_display_title(mut self, display_title: &str) -> Self {
        self.display_title = Some(display_title.to_string());
        self
    }

    pub fn with_display_subtitle(mut self, display_subtitle: &str) -> Self {
        self.display_subtitle = Some(display_subtitle.to_string());
        self
    }

    pub fn with_album_art(mut self, art: Artwork) -> Self {
        self.album_art = Some(art);
        self
    }

    pub fn with_album_art_uri(mut self, art: Artwork) -> Self {
        self.album_art_uri = Some(art);
        self
    }

    pub fn with_art(mut self, art: Artwork) -> Self {
        self.art = Some(art);
        self
    }
}

/// Coarse playback state of a session.
///
/// Only used for diagnostics; snapshots do not carry it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    None,
    Stopped,
    Paused,
    Playing,
    Buffering,
    Error,
    /// Provider-specific state.
    Other(String),
}

impl PlaybackStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PlaybackStatus::None => "NONE",
            PlaybackStatus::Stopped => "STOPPED",
            PlaybackStatus::Paused => "PAUSED",
            PlaybackStatus::Playing => "PLAYING",
            PlaybackStatus::Buffering => "BUFFERING",
            PlaybackStatus::Error => "ERROR",
            PlaybackStatus::Other(s) => s.as_str(),
        }
    }
}

/// Immutable projection of one session at a given instant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub owner_id: String,
    pub metadata: SessionMetadata,
    pub supported_actions: SupportedActions,
}

impl SessionSnapshot {
    /// Reads the session's live state and projects it.
    ///
    /// Returns `None` when the session currently has no metadata: there is
    /// nothing to display in that case. A missing capability mask counts as
    /// the empty mask.
    pub fn capture(session: &dyn MediaSession) -> Option<SessionSnapshot> {
        let metadata = session.metadata()?;
        let mask = session.capability_mask().unwrap_or(0);

        Some(SessionSnapshot {
            owner_id: session.owner_id(),
            metadata,
            supported_actions: decode(mask),
        })
    }

    /// True if at least one transport control should be shown.
    pub fn has_controls(&self) -> bool {
        !self.supported_actions.is_empty()
    }
}
