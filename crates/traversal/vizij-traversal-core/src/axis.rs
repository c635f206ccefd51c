//! Object-space alignment axes and forward/up pair validation.

use serde::{Deserialize, Serialize};

use crate::math::{look_rotation, Quat, Vec3};

/// One of the six signed principal axes.
///
/// Discriminants are ordered so that `index % 3` names the physical axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlignAxis {
    XAxis = 0,
    YAxis = 1,
    ZAxis = 2,
    NegativeXAxis = 3,
    NegativeYAxis = 4,
    NegativeZAxis = 5,
}

impl AlignAxis {
    #[inline]
    pub fn vector(self) -> Vec3 {
        match self {
            Self::XAxis => Vec3::x(),
            Self::YAxis => Vec3::y(),
            Self::ZAxis => Vec3::z(),
            Self::NegativeXAxis => -Vec3::x(),
            Self::NegativeYAxis => -Vec3::y(),
            Self::NegativeZAxis => -Vec3::z(),
        }
    }

    /// Physical axis ignoring sign: 0 = X, 1 = Y, 2 = Z.
    #[inline]
    pub fn physical(self) -> u8 {
        self as u8 % 3
    }

    #[inline]
    pub fn shares_physical_axis(self, other: Self) -> bool {
        self.physical() == other.physical()
    }
}

/// Decide the outcome of assigning `new_value` to `target` while `other` is held.
///
/// Returns `(target, other)` after the assignment:
/// - `new_value == other`: the two axes swap.
/// - `new_value` on a different physical axis than `other`: accepted.
/// - otherwise (opposite of `other`): rejected, both unchanged.
pub fn resolve_axis_pair(
    new_value: AlignAxis,
    target: AlignAxis,
    other: AlignAxis,
) -> (AlignAxis, AlignAxis) {
    if new_value == other {
        (new_value, target)
    } else if !new_value.shares_physical_axis(other) {
        (new_value, other)
    } else {
        (target, other)
    }
}

/// Rotation undoing the object's forward/up choice relative to +Z/+Y.
pub fn axis_remap_rotation(forward: AlignAxis, up: AlignAxis) -> Quat {
    look_rotation(&forward.vector(), &up.vector()).inverse()
}
