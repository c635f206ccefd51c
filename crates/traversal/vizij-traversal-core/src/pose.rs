//! Pose evaluation: position on the path plus an aligned, axis-remapped rotation.

use serde::{Deserialize, Serialize};

use crate::axis::{axis_remap_rotation, AlignAxis};
use crate::math::{look_rotation, Quat, Vec3};
use crate::path::CurvePath;

/// Tangents at or below this length are treated as degenerate.
pub const TANGENT_EPSILON: f32 = f32::EPSILON;

/// Parameter nudge used to resample a degenerate tangent.
pub const TANGENT_RESAMPLE_STEP: f32 = 0.01;

/// What the object's forward/up axes align to.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignmentMode {
    /// Rotation is left as the sink currently has it.
    None,
    /// Path tangent and up vector at the current parameter.
    #[default]
    CurveElement,
    /// Z/Y axes of the transform owning the path.
    ReferenceObject,
    /// World Z/Y axes.
    World,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseResult {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Tangent at `t`, resampled once when it is degenerate.
///
/// Cusps and endpoints can yield a zero tangent. The nudge goes forward while
/// there is room (`t < 1`) and backward at the end of the path.
pub fn resampled_tangent(path: &dyn CurvePath, t: f32) -> Vec3 {
    let tangent = path.evaluate(t).tangent;
    if tangent.norm() > TANGENT_EPSILON {
        return tangent;
    }
    let nudged = if t < 1.0 {
        (t + TANGENT_RESAMPLE_STEP).min(1.0)
    } else {
        t - TANGENT_RESAMPLE_STEP
    };
    path.evaluate(nudged).tangent
}

/// Forward/up basis for `alignment`, or `None` when no alignment applies.
pub fn alignment_basis(
    path: &dyn CurvePath,
    t: f32,
    alignment: AlignmentMode,
) -> Option<(Vec3, Vec3)> {
    match alignment {
        AlignmentMode::None => None,
        AlignmentMode::CurveElement => {
            let forward = resampled_tangent(path, t)
                .try_normalize(TANGENT_EPSILON)
                .unwrap_or_else(Vec3::zeros);
            Some((forward, path.evaluate(t).up))
        }
        AlignmentMode::ReferenceObject => {
            let rotation = path.reference_rotation();
            Some((rotation * Vec3::z(), rotation * Vec3::y()))
        }
        AlignmentMode::World => Some((Vec3::z(), Vec3::y())),
    }
}

/// Evaluate the pose at curve parameter `t`.
///
/// With [`AlignmentMode::None`] the rotation is `current_rotation` untouched.
pub fn evaluate_pose(
    path: &dyn CurvePath,
    t: f32,
    alignment: AlignmentMode,
    forward_axis: AlignAxis,
    up_axis: AlignAxis,
    current_rotation: &Quat,
) -> PoseResult {
    let position = path.evaluate(t).position;
    let rotation = match alignment_basis(path, t, alignment) {
        Some((forward, up)) => {
            look_rotation(&forward, &up) * axis_remap_rotation(forward_axis, up_axis)
        }
        None => *current_rotation,
    };
    PoseResult { position, rotation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PolylinePath;
    use approx::assert_relative_eq;

    fn along_x() -> PolylinePath {
        PolylinePath::new(vec![Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0)])
    }

    #[test]
    fn curve_element_faces_tangent() {
        let path = along_x();
        let pose = evaluate_pose(
            &path,
            0.5,
            AlignmentMode::CurveElement,
            AlignAxis::ZAxis,
            AlignAxis::YAxis,
            &Quat::identity(),
        );
        assert_relative_eq!(pose.position, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(pose.rotation * Vec3::z(), Vec3::x(), epsilon = 1e-5);
    }

    #[test]
    fn remapped_forward_axis_follows_tangent() {
        let path = along_x();
        let pose = evaluate_pose(
            &path,
            0.5,
            AlignmentMode::CurveElement,
            AlignAxis::NegativeXAxis,
            AlignAxis::YAxis,
            &Quat::identity(),
        );
        // the object's -X axis now points down the path
        assert_relative_eq!(pose.rotation * -Vec3::x(), Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(pose.rotation * Vec3::y(), Vec3::y(), epsilon = 1e-5);
    }

    #[test]
    fn none_passes_rotation_through() {
        let current = Quat::from_euler_angles(0.1, 0.2, 0.3);
        let pose = evaluate_pose(
            &along_x(),
            0.2,
            AlignmentMode::None,
            AlignAxis::ZAxis,
            AlignAxis::YAxis,
            &current,
        );
        assert_eq!(pose.rotation, current);
    }

    #[test]
    fn reference_object_uses_path_rotation() {
        let rot = Quat::from_euler_angles(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let path = along_x().with_reference_rotation(rot);
        let pose = evaluate_pose(
            &path,
            0.0,
            AlignmentMode::ReferenceObject,
            AlignAxis::ZAxis,
            AlignAxis::YAxis,
            &Quat::identity(),
        );
        assert_relative_eq!(pose.rotation * Vec3::z(), rot * Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn world_alignment_is_identity_for_canonical_axes() {
        let pose = evaluate_pose(
            &along_x(),
            0.3,
            AlignmentMode::World,
            AlignAxis::ZAxis,
            AlignAxis::YAxis,
            &Quat::from_euler_angles(1.0, 0.0, 0.0),
        );
        assert_relative_eq!(pose.rotation.angle(), 0.0, epsilon = 1e-5);
    }
}
