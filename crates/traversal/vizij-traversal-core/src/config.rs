//! Traversal configuration.
//!
//! Loading through [`TraversalConfig::from_json`] validates strictly. Values
//! written at runtime through the traversal setters are corrected in place
//! instead, so a bad value never stops playback.

use serde::{Deserialize, Serialize};

use crate::axis::AlignAxis;
use crate::easing::Easing;
use crate::error::TraversalError;
use crate::inputs::{LoopMode, Method};
use crate::math::AxisLocks;
use crate::pose::AlignmentMode;
use crate::Result;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Seconds to traverse the whole path once.
    pub duration: f32,
    /// Normalized distance `[0, 1]` of the traversal's logical zero point.
    pub start_offset: f32,
    pub method: Method,
    pub loop_mode: LoopMode,
    pub easing: Easing,
    pub alignment: AlignmentMode,
    /// Object-space axis treated as forward.
    pub forward_axis: AlignAxis,
    /// Object-space axis treated as up.
    pub up_axis: AlignAxis,
    pub locks: AxisLocks,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            start_offset: 0.0,
            method: Method::Time,
            loop_mode: LoopMode::Once,
            easing: Easing::Linear,
            alignment: AlignmentMode::CurveElement,
            forward_axis: AlignAxis::XAxis,
            up_axis: AlignAxis::YAxis,
            locks: AxisLocks::default(),
        }
    }
}

impl TraversalConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(TraversalError::configuration(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(0.0..=1.0).contains(&self.start_offset) {
            return Err(TraversalError::configuration(format!(
                "start_offset must be within [0, 1], got {}",
                self.start_offset
            )));
        }
        if self.forward_axis.shares_physical_axis(self.up_axis) {
            return Err(TraversalError::configuration(format!(
                "forward axis {:?} and up axis {:?} share a physical axis",
                self.forward_axis, self.up_axis
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
