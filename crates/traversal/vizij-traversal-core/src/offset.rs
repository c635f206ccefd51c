//! Start-offset resolution: normalized distance → curve parameter.
//!
//! The converted parameter and the path length are cached together with the
//! path version they were computed from. The cache is recomputed on read when
//! it is dirty or the path version moved.

use crate::path::{CurvePath, PathUnit};

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetResolver {
    param: f32,
    length: Option<f32>,
    version: Option<u64>,
    dirty: bool,
}

impl OffsetResolver {
    pub fn new() -> Self {
        Self {
            param: 0.0,
            length: None,
            version: None,
            dirty: true,
        }
    }

    /// Mark the cache for recomputation (path rebuilt, offset or duration changed).
    #[inline]
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when the cache cannot be trusted for `path`.
    #[inline]
    pub fn is_stale(&self, path: &dyn CurvePath) -> bool {
        self.dirty || self.version != Some(path.version())
    }

    /// Cached path length; `None` until the first computation.
    #[inline]
    pub fn length(&self) -> Option<f32> {
        self.length
    }

    /// Last computed parameter; meaningful only once [`length`](Self::length) is `Some`.
    #[inline]
    pub fn param(&self) -> f32 {
        self.param
    }

    /// Recompute length and offset parameter from `path`.
    ///
    /// An absent or empty path clears the cached length and leaves the cache dirty.
    pub fn recompute(&mut self, path: Option<&dyn CurvePath>, start_offset: f32) {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            self.length = None;
            self.version = None;
            self.dirty = true;
            return;
        };
        let length = path.length();
        self.param = path.convert_unit(
            start_offset * length,
            PathUnit::Distance,
            PathUnit::Normalized,
        );
        self.length = Some(length);
        self.version = Some(path.version());
        self.dirty = false;
        log::debug!(
            "start offset {start_offset} resolved to param {} (length {length}, version {})",
            self.param,
            path.version()
        );
    }

    /// Recompute-on-read accessor.
    pub fn resolve(&mut self, path: &dyn CurvePath, start_offset: f32) -> f32 {
        if self.is_stale(path) {
            self.recompute(Some(path), start_offset);
        }
        self.param
    }
}

impl Default for OffsetResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use crate::path::PolylinePath;
    use approx::assert_relative_eq;

    fn straight(len: f32) -> PolylinePath {
        PolylinePath::new(vec![Vec3::zeros(), Vec3::new(0.0, 0.0, len)])
    }

    #[test]
    fn starts_dirty_and_resolves() {
        let path = straight(10.0);
        let mut resolver = OffsetResolver::new();
        assert!(resolver.is_dirty());
        assert_eq!(resolver.length(), None);

        assert_relative_eq!(resolver.resolve(&path, 0.25), 0.25);
        assert!(!resolver.is_dirty());
        assert_eq!(resolver.length(), Some(10.0));
    }

    #[test]
    fn version_change_makes_cache_stale() {
        let mut path = straight(10.0);
        let mut resolver = OffsetResolver::new();
        resolver.resolve(&path, 0.5);
        assert!(!resolver.is_stale(&path));

        path.set_points(vec![Vec3::zeros(), Vec3::new(0.0, 0.0, 4.0)]);
        assert!(resolver.is_stale(&path));
        resolver.resolve(&path, 0.5);
        assert_eq!(resolver.length(), Some(4.0));
    }

    #[test]
    fn missing_path_clears_cached_length() {
        let path = straight(10.0);
        let mut resolver = OffsetResolver::new();
        resolver.resolve(&path, 0.5);
        assert_eq!(resolver.length(), Some(10.0));

        resolver.recompute(None, 0.5);
        assert_eq!(resolver.length(), None);
        assert!(resolver.is_stale(&path));
    }

    #[test]
    fn empty_path_keeps_cache_dirty() {
        let empty = PolylinePath::new(Vec::new());
        let mut resolver = OffsetResolver::new();
        resolver.recompute(Some(&empty as &dyn CurvePath), 0.5);
        assert!(resolver.is_dirty());
        resolver.recompute(None, 0.5);
        assert!(resolver.is_dirty());
    }
}
