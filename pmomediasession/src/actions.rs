//! Transport actions and capability mask decoding.
//!
//! A session advertises what it can do through a raw bitmask. Only five bits
//! matter here (play, pause, skip next, skip previous, stop); every other bit
//! is ignored by [`decode`].

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::errors::MediaSessionError;

/// A user-facing transport intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Play,
    Pause,
    SkipNext,
    SkipPrevious,
    Stop,
}

impl ActionKind {
    /// Every kind, in display order.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Play,
        ActionKind::Pause,
        ActionKind::SkipNext,
        ActionKind::SkipPrevious,
        ActionKind::Stop,
    ];

    /// The capability flag advertising this action.
    pub fn flag(self) -> SupportedActions {
        match self {
            ActionKind::Play => SupportedActions::PLAY,
            ActionKind::Pause => SupportedActions::PAUSE,
            ActionKind::SkipNext => SupportedActions::SKIP_NEXT,
            ActionKind::SkipPrevious => SupportedActions::SKIP_PREVIOUS,
            ActionKind::Stop => SupportedActions::STOP,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Play => "play",
            ActionKind::Pause => "pause",
            ActionKind::SkipNext => "next",
            ActionKind::SkipPrevious => "previous",
            ActionKind::Stop => "stop",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = MediaSessionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim().to_ascii_lowercase();
        match s.as_str() {
            "play" => Ok(ActionKind::Play),
            "pause" => Ok(ActionKind::Pause),
            "next" | "skip_next" | "skipnext" => Ok(ActionKind::SkipNext),
            "previous" | "prev" | "skip_previous" | "skipprevious" => {
                Ok(ActionKind::SkipPrevious)
            }
            "stop" => Ok(ActionKind::Stop),
            _ => Err(MediaSessionError::unknown_action(raw)),
        }
    }
}

bitflags! {
    /// Set of transport actions a session currently supports.
    ///
    /// Bit values match the raw capability mask reported by sessions, so a
    /// truncating conversion from the raw mask is exactly the decoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SupportedActions: u64 {
        const STOP          = 1 << 0;
        const PAUSE         = 1 << 1;
        const PLAY          = 1 << 2;
        const SKIP_PREVIOUS = 1 << 4;
        const SKIP_NEXT     = 1 << 5;
    }
}

impl SupportedActions {
    pub fn contains_kind(&self, kind: ActionKind) -> bool {
        self.contains(kind.flag())
    }

    /// Supported kinds in [`ActionKind::ALL`] order.
    pub fn kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        ActionKind::ALL
            .into_iter()
            .filter(move |kind| self.contains_kind(*kind))
    }
}

impl FromIterator<ActionKind> for SupportedActions {
    fn from_iter<I: IntoIterator<Item = ActionKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SupportedActions::empty(), |acc, kind| acc | kind.flag())
    }
}

impl Serialize for SupportedActions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kinds: Vec<ActionKind> = self.kinds().collect();
        let mut seq = serializer.serialize_seq(Some(kinds.len()))?;
        for kind in kinds {
            seq.serialize_element(&kind)?;
        }
        seq.end()
    }
}

/// Decodes a raw capability mask into the set of supported actions.
///
/// Any mask is valid. Bits outside the five recognized actions are dropped.
pub fn decode(mask: u64) -> SupportedActions {
    let mut actions = SupportedActions::empty();
    for kind in ActionKind::ALL {
        if mask & kind.flag().bits() != 0 {
            actions |= kind.flag();
        }
    }
    actions
}
