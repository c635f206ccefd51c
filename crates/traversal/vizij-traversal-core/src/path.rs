//! Curve geometry interface and a reference polyline implementation.
//!
//! The engine never owns or edits geometry. It reads a [`CurvePath`] through a
//! shared handle and relies on [`CurvePath::version`] to notice rebuilds.

use serde::{Deserialize, Serialize};

use crate::error::TraversalError;
use crate::math::{clamp01, Quat, Vec3};
use crate::Result;

/// Units understood by [`CurvePath::convert_unit`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathUnit {
    /// Arc length from the start of the path.
    Distance,
    /// Path-native parameter in `[0, 1]`.
    Normalized,
    /// Segment index plus fraction within that segment.
    SegmentIndex,
}

/// Geometry at one curve parameter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathSample {
    pub position: Vec3,
    pub tangent: Vec3,
    pub up: Vec3,
}

/// Read-only view of an ordered sequence of curve segments.
///
/// Parameters passed to [`evaluate`](CurvePath::evaluate) are in
/// [`PathUnit::Normalized`] space.
pub trait CurvePath {
    /// Total arc length, never negative.
    fn length(&self) -> f32;

    /// True when the path has no segments; such a path counts as "no curve".
    fn is_empty(&self) -> bool;

    fn evaluate(&self, t: f32) -> PathSample;

    fn convert_unit(&self, value: f32, from: PathUnit, to: PathUnit) -> f32;

    /// Revision counter; must change whenever the geometry changes.
    fn version(&self) -> u64;

    /// Rotation of the transform that owns the path.
    fn reference_rotation(&self) -> Quat {
        Quat::identity()
    }
}

/// Piecewise-linear path through a list of points, parameterized by arc length.
#[derive(Clone, Debug)]
pub struct PolylinePath {
    points: Vec<Vec3>,
    ups: Vec<Vec3>,
    /// Arc length at each point.
    cumulative: Vec<f32>,
    version: u64,
    reference_rotation: Quat,
}

impl PolylinePath {
    /// Path through `points` with a +Y up vector everywhere.
    pub fn new(points: Vec<Vec3>) -> Self {
        let ups = vec![Vec3::y(); points.len()];
        Self::build(points, ups)
    }

    /// Path with one up vector per point.
    pub fn with_ups(points: Vec<Vec3>, ups: Vec<Vec3>) -> Result<Self> {
        if points.len() != ups.len() {
            return Err(TraversalError::configuration(format!(
                "expected {} up vectors, got {}",
                points.len(),
                ups.len()
            )));
        }
        Ok(Self::build(points, ups))
    }

    pub fn with_reference_rotation(mut self, rotation: Quat) -> Self {
        self.reference_rotation = rotation;
        self
    }

    /// Replace the geometry, bumping the version.
    pub fn set_points(&mut self, points: Vec<Vec3>) {
        let version = self.version + 1;
        let reference_rotation = self.reference_rotation;
        let ups = vec![Vec3::y(); points.len()];
        *self = Self::build(points, ups);
        self.version = version;
        self.reference_rotation = reference_rotation;
    }

    fn build(points: Vec<Vec3>, ups: Vec<Vec3>) -> Self {
        let mut cumulative = Vec::with_capacity(points.len());
        let mut acc = 0.0f32;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                acc += (p - points[i - 1]).norm();
            }
            cumulative.push(acc);
        }
        Self {
            points,
            ups,
            cumulative,
            version: 0,
            reference_rotation: Quat::identity(),
        }
    }

    #[inline]
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    #[inline]
    fn segment_length(&self, index: usize) -> f32 {
        self.cumulative[index + 1] - self.cumulative[index]
    }

    /// Segment containing arc length `distance` (already clamped).
    fn segment_at(&self, distance: f32) -> usize {
        let upper = self.cumulative.partition_point(|c| *c <= distance);
        upper.saturating_sub(1).min(self.segment_count() - 1)
    }

    fn distance_from(&self, value: f32, unit: PathUnit) -> f32 {
        let length = self.length();
        let distance = match unit {
            PathUnit::Distance => value,
            PathUnit::Normalized => value * length,
            PathUnit::SegmentIndex => {
                let last = self.segment_count() - 1;
                let index = (value.max(0.0).floor() as usize).min(last);
                let frac = clamp01(value - index as f32);
                self.cumulative[index] + frac * self.segment_length(index)
            }
        };
        distance.clamp(0.0, length)
    }

    fn distance_to(&self, distance: f32, unit: PathUnit) -> f32 {
        let length = self.length();
        match unit {
            PathUnit::Distance => distance,
            PathUnit::Normalized => {
                if length > 0.0 {
                    distance / length
                } else {
                    0.0
                }
            }
            PathUnit::SegmentIndex => {
                let index = self.segment_at(distance);
                let seg = self.segment_length(index);
                let frac = if seg > 0.0 {
                    (distance - self.cumulative[index]) / seg
                } else {
                    0.0
                };
                index as f32 + frac
            }
        }
    }
}

impl CurvePath for PolylinePath {
    fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn is_empty(&self) -> bool {
        self.segment_count() == 0
    }

    fn evaluate(&self, t: f32) -> PathSample {
        if self.is_empty() {
            return PathSample {
                position: self.points.first().copied().unwrap_or_else(Vec3::zeros),
                tangent: Vec3::zeros(),
                up: Vec3::y(),
            };
        }
        let length = self.length();
        let distance = clamp01(t) * length;
        let i = self.segment_at(distance);
        let seg = self.segment_length(i);
        let (a, b) = (self.points[i], self.points[i + 1]);
        let local = if seg > 0.0 {
            (distance - self.cumulative[i]) / seg
        } else {
            0.0
        };
        // d(position)/dt over the normalized parameter
        let tangent = if seg > 0.0 {
            (b - a) * (length / seg)
        } else {
            Vec3::zeros()
        };
        let up = self.ups[i]
            .lerp(&self.ups[i + 1], local)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y);
        PathSample {
            position: a.lerp(&b, local),
            tangent,
            up,
        }
    }

    fn convert_unit(&self, value: f32, from: PathUnit, to: PathUnit) -> f32 {
        if self.is_empty() || from == to {
            return value;
        }
        self.distance_to(self.distance_from(value, from), to)
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn reference_rotation(&self) -> Quat {
        self.reference_rotation
    }
}
