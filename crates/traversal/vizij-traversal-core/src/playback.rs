//! Playback state of a traversal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not started, or restarted without autoplay
    #[default]
    Idle,
    /// Advancing every tick
    Playing,
    /// Paused mid-traversal; time is preserved
    Paused,
    /// Reached the end of the path in `LoopMode::Once`
    StoppedAtEnd,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::StoppedAtEnd => "stopped_at_end",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// Play from here starts a fresh loop rather than resuming.
    #[inline]
    pub fn starts_new_loop(&self) -> bool {
        matches!(self, Self::StoppedAtEnd)
    }
}
