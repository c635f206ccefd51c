//! Playback commands and traversal modes.
//!
//! Hosts that queue UI or editor actions can hand them to
//! `Traversal::apply` as [`TraversalCommand`]s instead of calling the setters.

use serde::{Deserialize, Serialize};

use crate::axis::AlignAxis;

/// Where traversal progress comes from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Elapsed time advanced by `tick`.
    #[default]
    Time,
    /// An external timeline sets progress directly; `tick` does not advance time.
    Timeline,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoopMode {
    /// Stop at the end of the path.
    #[default]
    Once,
    /// Wrap back to the start and keep playing.
    Loop,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TraversalCommand {
    Play,
    Pause,
    Restart { autoplay: bool },
    SetNormalizedTime { time: f32 },
    SetElapsedTime { time: f32 },
    SetProgress { progress: f32 },
    SetStartOffset { offset: f32 },
    SetDuration { duration: f32 },
    SetForwardAxis { axis: AlignAxis },
    SetUpAxis { axis: AlignAxis },
    SetLoopMode { mode: LoopMode },
}
