// File: zyra-common/src/models/session.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::models::media::MediaItem;

/// Identity of a group voice session (the guild id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SessionId {
    fn from(v: u64) -> Self {
        SessionId(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    #[default]
    Off,
    /// Replay the current item.
    Single,
    /// Rotate finished items to the back of the queue.
    All,
}

impl RepeatMode {
    pub fn next(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::Single,
            RepeatMode::Single => RepeatMode::All,
            RepeatMode::All => RepeatMode::Off,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::Off => "Off",
            RepeatMode::Single => "Song",
            RepeatMode::All => "Queue",
        }
    }
}

impl FromStr for RepeatMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "0" | "none" => Ok(RepeatMode::Off),
            "song" | "single" | "track" | "1" => Ok(RepeatMode::Single),
            "queue" | "all" | "2" => Ok(RepeatMode::All),
            other => Err(Error::Parse(format!("unknown loop mode '{other}'"))),
        }
    }
}

/// Point-in-time copy of a session's queue, for display.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub session_id: SessionId,
    pub current: Option<MediaItem>,
    pub upcoming: Vec<MediaItem>,
    pub volume: u8,
    pub playing: bool,
    pub paused: bool,
    pub repeat: RepeatMode,
    pub elapsed_secs: u64,
}

impl QueueSnapshot {
    pub fn len(&self) -> usize {
        self.upcoming.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.upcoming.is_empty()
    }
}
