//! Vizij Traversal Core (engine-agnostic)
//!
//! Moves an object along a shared path over time. The crate owns the playback
//! state, the time model, start-offset caching and pose evaluation; hosts
//! provide the geometry through [`CurvePath`] and receive poses through a
//! [`TransformSink`].

pub mod axis;
pub mod config;
pub mod easing;
pub mod error;
pub mod ids;
pub mod inputs;
pub mod math;
pub mod offset;
pub mod outputs;
pub mod path;
pub mod playback;
pub mod pose;
pub mod time;
pub mod traversal;

// Re-exports for consumers (adapters)
pub use axis::{axis_remap_rotation, resolve_axis_pair, AlignAxis};
pub use config::TraversalConfig;
pub use easing::Easing;
pub use error::TraversalError;
pub use ids::SubscriptionId;
pub use inputs::{LoopMode, Method, TraversalCommand};
pub use math::{look_rotation, AxisLocks, Quat, Vec3};
pub use offset::OffsetResolver;
pub use outputs::{Observer, Observers, Outputs, TraversalEvent};
pub use path::{CurvePath, PathSample, PathUnit, PolylinePath};
pub use playback::PlaybackState;
pub use pose::{evaluate_pose, AlignmentMode, PoseResult};
pub use time::{fold_loop, TimeModel, MIN_DURATION};
pub use traversal::{Transform, TransformSink, Traversal};

pub type Result<T> = std::result::Result<T, TraversalError>;
