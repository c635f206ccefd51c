//! Progress easing for curve-driven traversal.
//!
//! Easing remaps in-loop progress `u ∈ [0, 1]` before the start offset is
//! applied. Every variant keeps `ease(0) == 0` and `ease(1) == 1` so loop
//! boundaries stay put.

use serde::{Deserialize, Serialize};

use crate::math::clamp01;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Cubic-bezier timing with control points (x1, y1, x2, y2).
    Bezier([f32; 4]),
    /// Piecewise-linear curve through `(u, eased)` keys sorted by `u`.
    Keys(Vec<[f32; 2]>),
}

impl Easing {
    pub fn apply(&self, u: f32) -> f32 {
        let u = clamp01(u);
        match self {
            Self::Linear => u,
            Self::EaseIn => bezier_ease_t(u, [0.42, 0.0, 1.0, 1.0]),
            Self::EaseOut => bezier_ease_t(u, [0.0, 0.0, 0.58, 1.0]),
            Self::EaseInOut => bezier_ease_t(u, [0.42, 0.0, 0.58, 1.0]),
            Self::Bezier(ctrl) => bezier_ease_t(u, *ctrl),
            Self::Keys(keys) => keyed_value(keys, u),
        }
    }
}

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Invert the x bezier by bisection, then evaluate y.
fn bezier_ease_t(t: f32, ctrl: [f32; 4]) -> f32 {
    let [x1, y1, x2, y2] = ctrl;
    if x1 == 0.0 && y1 == 0.0 && x2 == 1.0 && y2 == 1.0 {
        return t;
    }
    let (x1, x2) = (clamp01(x1), clamp01(x2));
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}

fn keyed_value(keys: &[[f32; 2]], u: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return u;
    };
    if u <= first[0] {
        return first[1];
    }
    if u >= last[0] {
        return last[1];
    }
    let upper = keys.partition_point(|k| k[0] <= u);
    let (a, b) = (keys[upper - 1], keys[upper]);
    let span = b[0] - a[0];
    if span <= 0.0 {
        return b[1];
    }
    lerp_f32(a[1], b[1], (u - a[0]) / span)
}
