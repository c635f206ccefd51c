//! Time model: elapsed seconds, normalized loop time and loop-edge detection.
//!
//! `normalized_time` packs the completed loop count in its integer part and
//! in-loop progress in its fraction. Elapsed time is never wrapped here unless
//! the caller asks for it with [`TimeModel::wrap`].

use crate::math::clamp01;

/// Smallest duration accepted; non-positive durations are clamped to this.
pub const MIN_DURATION: f32 = 1e-4;

/// Fold a loop-space value into a curve parameter in `[0, 1]`.
///
/// Exact integers clamp (so a finished loop sits at 1, not 0); everything else
/// keeps its fractional part.
#[inline]
pub fn fold_loop(value: f32) -> f32 {
    if value.floor() == value {
        clamp01(value)
    } else {
        value.rem_euclid(1.0)
    }
}

fn sanitize_duration(duration: f32) -> f32 {
    if duration.is_finite() && duration > 0.0 {
        duration.max(MIN_DURATION)
    } else {
        log::warn!(
            "traversal duration {duration} is not positive; clamping to {MIN_DURATION}"
        );
        MIN_DURATION
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeModel {
    elapsed: f32,
    normalized: f32,
    duration: f32,
    /// Loops completed before the one being played.
    base: f32,
    /// Elapsed seconds at which the current loop started.
    loop_start: f32,
    end_reached: bool,
}

impl TimeModel {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            normalized: 0.0,
            duration: sanitize_duration(duration),
            base: 0.0,
            loop_start: 0.0,
            end_reached: false,
        }
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    #[inline]
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn normalized_time(&self) -> f32 {
        self.normalized
    }

    /// Completed loops (integer part of normalized time).
    #[inline]
    pub fn loop_count(&self) -> u32 {
        self.normalized.floor() as u32
    }

    /// True once the current loop has run its full duration.
    #[inline]
    pub fn at_loop_end(&self) -> bool {
        self.loop_elapsed() >= self.duration
    }

    #[inline]
    pub fn end_reached_pending(&self) -> bool {
        self.end_reached
    }

    /// Clear the pending end flag, returning whether it was set.
    #[inline]
    pub fn take_end_reached(&mut self) -> bool {
        std::mem::take(&mut self.end_reached)
    }

    /// Change the duration, keeping in-loop progress where it is.
    pub fn set_duration(&mut self, duration: f32) {
        let duration = sanitize_duration(duration);
        let scale = duration / self.duration;
        self.elapsed *= scale;
        self.loop_start *= scale;
        self.duration = duration;
    }

    /// Advance by `dt` seconds and return how many loop boundaries were crossed.
    ///
    /// Crossings compare whole durations of the current loop before and after
    /// the step, so a single large `dt` is still detected. Advancing from the
    /// end of a loop reports that end again; the loop count does not move.
    pub fn advance(&mut self, dt: f32) -> u32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let previous = self.loop_elapsed();
        self.elapsed += dt;
        self.recompute_normalized();

        if previous >= self.duration {
            self.end_reached = true;
            return 1;
        }
        let crossings = (self.loop_elapsed() / self.duration).floor().max(0.0) as u32;
        if crossings > 0 {
            self.end_reached = true;
        }
        crossings
    }

    /// Scrub to a normalized time. Never flags the end.
    ///
    /// An exact integer `n > 0` lands on the end of loop `n` rather than the
    /// start of loop `n + 1`.
    pub fn set_normalized_time(&mut self, normalized: f32) {
        self.normalized = if normalized.is_finite() {
            normalized.max(0.0)
        } else {
            0.0
        };
        self.elapsed = self.duration * self.normalized;
        let whole = self.normalized.floor();
        self.base = if whole == self.normalized && whole > 0.0 {
            whole - 1.0
        } else {
            whole
        };
        self.loop_start = self.base * self.duration;
    }

    /// Scrub to an elapsed time within the current loop. Never flags the end.
    pub fn set_elapsed_time(&mut self, elapsed: f32) {
        self.elapsed = if elapsed.is_finite() {
            elapsed.max(0.0)
        } else {
            0.0
        };
        self.base = self.normalized.floor();
        self.loop_start = 0.0;
        self.recompute_normalized();
    }

    /// Start the next loop: elapsed restarts at 0 while the loop count stays.
    pub fn begin_loop(&mut self) {
        self.base = self.normalized.floor();
        self.elapsed = 0.0;
        self.loop_start = 0.0;
        self.recompute_normalized();
    }

    /// Fold elapsed time back into `[0, duration)` after crossings.
    ///
    /// Returns the number of whole loops removed from elapsed time.
    pub fn wrap(&mut self) -> u32 {
        let local = self.loop_elapsed();
        if local < self.duration {
            return 0;
        }
        let laps = (local / self.duration).floor();
        self.base += laps;
        self.elapsed = (local - laps * self.duration).max(0.0);
        self.loop_start = 0.0;
        self.recompute_normalized();
        laps as u32
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.normalized = 0.0;
        self.base = 0.0;
        self.loop_start = 0.0;
        self.end_reached = false;
    }

    /// Curve-space progress for the current loop, shifted by `offset`.
    #[inline]
    pub fn loop_interpolation(&self, offset: f32) -> f32 {
        fold_loop(self.normalized + offset)
    }

    #[inline]
    fn loop_elapsed(&self) -> f32 {
        self.elapsed - self.loop_start
    }

    fn recompute_normalized(&mut self) {
        let t = self.loop_elapsed().clamp(0.0, self.duration) / self.duration;
        // t == 0 keeps the integer boundary instead of jumping back a loop
        self.normalized = if t == 0.0 { self.base } else { self.base + t };
    }
}

impl Default for TimeModel {
    fn default() -> Self {
        Self::new(1.0)
    }
}
