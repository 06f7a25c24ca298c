use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, Weak};

use pmomediasession::{
    ActionKind, InMemoryProvider, InMemorySession, MediaMirror, MirrorConfig, PlaybackStatus,
    SessionMetadata, SessionRef, SupportedActions, TracingPresenter, TransportControls,
    init_logging,
};

const TRACKS: [(&str, &str, &str); 3] = [
    ("Song A", "Artist X", "First Album"),
    ("Song B", "Artist Y", "Second Album"),
    ("Song C", "Artist Z", "Third Album"),
];

/// Fake player behind the session: reacts to transport commands by
/// updating the session like a real application would.
struct DemoPlayer {
    session: Weak<InMemorySession>,
    track: Mutex<usize>,
}

impl DemoPlayer {
    fn publish_track(&self, session: &InMemorySession, index: usize) {
        let (title, artist, album) = TRACKS[index];
        session.set_metadata(Some(
            SessionMetadata::default()
                .with_title(title)
                .with_artist(artist)
                .with_album(album)
                .with_display_title(&format!("{} - {}", artist, title)),
        ));
    }

    fn set_playing(&self, session: &InMemorySession, playing: bool) {
        let navigation = SupportedActions::SKIP_NEXT | SupportedActions::SKIP_PREVIOUS;
        if playing {
            session.set_playback_status(Some(PlaybackStatus::Playing));
            session.set_capability_mask(Some(
                (SupportedActions::PAUSE | SupportedActions::STOP | navigation).bits(),
            ));
        } else {
            session.set_playback_status(Some(PlaybackStatus::Paused));
            session.set_capability_mask(Some((SupportedActions::PLAY | navigation).bits()));
        }
    }

    fn skip(&self, forward: bool) {
        let Some(session) = self.session.upgrade() else {
            return;
        };
        let index = {
            let mut track = self.track.lock().unwrap_or_else(|p| p.into_inner());
            *track = if forward {
                (*track + 1) % TRACKS.len()
            } else {
                (*track + TRACKS.len() - 1) % TRACKS.len()
            };
            *track
        };
        self.publish_track(&session, index);
    }
}

impl TransportControls for DemoPlayer {
    fn play(&self) {
        if let Some(session) = self.session.upgrade() {
            self.set_playing(&session, true);
        }
    }

    fn pause(&self) {
        if let Some(session) = self.session.upgrade() {
            self.set_playing(&session, false);
        }
    }

    fn skip_to_next(&self) {
        self.skip(true);
    }

    fn skip_to_previous(&self) {
        self.skip(false);
    }

    fn stop(&self) {
        if let Some(session) = self.session.upgrade() {
            session.set_playback_status(Some(PlaybackStatus::Stopped));
            session.set_capability_mask(Some(SupportedActions::PLAY.bits()));
        }
    }
}

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = MirrorConfig::load(config_path.as_deref())?;
    init_logging(&config);

    let provider = Arc::new(InMemoryProvider::new());
    let presenter = Arc::new(TracingPresenter::from_config(&config));
    let mirror = MediaMirror::start(true, provider.clone(), presenter, &config)?;

    let session = InMemorySession::shared("org.example.demoplayer");
    let player = Arc::new(DemoPlayer {
        session: Arc::downgrade(&session),
        track: Mutex::new(0),
    });
    session.set_transport_controls(Some(player.clone()));
    player.publish_track(&session, 0);
    player.set_playing(&session, false);

    provider.set_sessions(vec![session.clone() as SessionRef]);

    println!("Commands: play, pause, next, previous, stop, quit");
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }
        match line.parse::<ActionKind>() {
            Ok(intent) => {
                let outcome = mirror.dispatch(intent);
                tracing::info!(?outcome, "{} dispatched", intent);
            }
            Err(err) => println!("{}", err),
        }
    }

    mirror.shutdown();
    Ok(())
}
