//! Small math helpers on top of nalgebra.
//!
//! Conventions: +Z is forward, +Y is up. `look_rotation` maps the local +Z axis
//! onto `forward` and bends the local +Y axis towards `up`.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f32>;
pub type Quat = UnitQuaternion<f32>;

/// Squared length below which two directions are treated as parallel.
const PARALLEL_EPSILON: f32 = 1e-10;

/// Rotation whose forward (+Z) is `forward` and whose up (+Y) leans towards `up`.
///
/// A zero `forward` yields identity. When `up` is parallel to `forward` the
/// shortest-arc rotation from +Z is used instead, so the result is never NaN.
pub fn look_rotation(forward: &Vec3, up: &Vec3) -> Quat {
    let Some(dir) = forward.try_normalize(f32::EPSILON) else {
        return Quat::identity();
    };
    if dir.cross(up).norm_squared() <= PARALLEL_EPSILON {
        return Quat::rotation_between(&Vec3::z(), &dir).unwrap_or_else(|| {
            // dir is -Z
            Quat::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI)
        });
    }
    Quat::face_towards(&dir, up)
}

/// Per-axis Euler locks applied to an aligned rotation.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLocks {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl AxisLocks {
    #[inline]
    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }

    /// Replace the locked Euler components of `target` with those of `current`.
    pub fn apply(&self, target: &Quat, current: &Quat) -> Quat {
        if !self.any() {
            return *target;
        }
        let (nx, ny, nz) = target.euler_angles();
        let (ox, oy, oz) = current.euler_angles();
        Quat::from_euler_angles(
            if self.x { ox } else { nx },
            if self.y { oy } else { ny },
            if self.z { oz } else { nz },
        )
    }
}

#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}
