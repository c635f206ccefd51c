//! Traversal: playback control over a shared path, writing poses into a sink.
//!
//! One `Traversal` drives one object. Per tick it advances the time model,
//! folds progress (easing + start offset) into a curve parameter, evaluates the
//! pose, writes it to the sink and emits `Updated`, then `Completed` for each
//! loop boundary crossed during that tick.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::axis::{resolve_axis_pair, AlignAxis};
use crate::config::TraversalConfig;
use crate::easing::Easing;
use crate::error::TraversalError;
use crate::ids::SubscriptionId;
use crate::inputs::{LoopMode, Method, TraversalCommand};
use crate::math::{clamp01, AxisLocks, Quat, Vec3};
use crate::offset::OffsetResolver;
use crate::outputs::{Observers, Outputs, TraversalEvent};
use crate::path::CurvePath;
use crate::playback::PlaybackState;
use crate::pose::{evaluate_pose, AlignmentMode};
use crate::time::{fold_loop, TimeModel};
use crate::Result;

/// Receiver of applied poses (the host's transform).
pub trait TransformSink {
    /// Current rotation, used for pass-through alignment and axis locks.
    fn rotation(&self) -> Quat;

    fn apply(&mut self, position: Vec3, rotation: Quat);
}

/// Plain position/rotation pair usable as a sink.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl TransformSink for Transform {
    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn apply(&mut self, position: Vec3, rotation: Quat) {
        self.position = position;
        self.rotation = rotation;
    }
}

pub struct Traversal<S: TransformSink = Transform> {
    method: Method,
    loop_mode: LoopMode,
    easing: Easing,
    alignment: AlignmentMode,
    forward_axis: AlignAxis,
    up_axis: AlignAxis,
    locks: AxisLocks,
    start_offset: f32,

    time: TimeModel,
    offset: OffsetResolver,
    /// Timeline-driven progress in `[0, 1]`.
    progress: f32,
    state: PlaybackState,
    path: Option<Arc<dyn CurvePath>>,
    sink: S,

    outputs: Outputs,
    observers: Observers,
}

impl<S: TransformSink> Traversal<S> {
    /// Build a traversal from `cfg`. Out-of-range values are corrected, not rejected.
    pub fn new(cfg: TraversalConfig, sink: S) -> Self {
        let (forward_axis, up_axis) = if cfg.forward_axis.shares_physical_axis(cfg.up_axis) {
            let fallback = TraversalConfig::default();
            log::warn!(
                "forward axis {:?} and up axis {:?} share a physical axis; using {:?}/{:?}",
                cfg.forward_axis,
                cfg.up_axis,
                fallback.forward_axis,
                fallback.up_axis
            );
            (fallback.forward_axis, fallback.up_axis)
        } else {
            (cfg.forward_axis, cfg.up_axis)
        };
        Self {
            method: cfg.method,
            loop_mode: cfg.loop_mode,
            easing: cfg.easing,
            alignment: cfg.alignment,
            forward_axis,
            up_axis,
            locks: cfg.locks,
            start_offset: sanitize_offset(cfg.start_offset),
            time: TimeModel::new(cfg.duration),
            offset: OffsetResolver::new(),
            progress: 0.0,
            state: PlaybackState::Idle,
            path: None,
            sink,
            outputs: Outputs::default(),
            observers: Observers::default(),
        }
    }

    pub fn with_path(mut self, path: Arc<dyn CurvePath>) -> Self {
        self.set_container(Some(path));
        self
    }

    // ----- playback -----

    /// Start or resume playback.
    ///
    /// From the end of the path (or beyond it after a scrub) a new loop starts.
    pub fn play(&mut self) -> Result<()> {
        if self.current_path().is_none() {
            return Err(self.report_missing_path("play"));
        }
        if self.state.starts_new_loop() || self.time.at_loop_end() {
            self.time.begin_loop();
        }
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    pub fn pause(&mut self) {
        if self.state.can_pause() {
            self.set_state(PlaybackState::Paused);
        }
    }

    /// Return to the start offset and re-apply the pose there.
    pub fn restart(&mut self, autoplay: bool) -> Result<()> {
        self.outputs.clear();
        let Some(path) = self.current_path() else {
            return Err(self.report_missing_path("restart"));
        };
        self.time.reset();
        self.progress = 0.0;
        self.apply_pose(&*path);
        self.set_state(if autoplay {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        });
        Ok(())
    }

    /// Advance by `dt` seconds while playing.
    ///
    /// Without a valid path the tick is skipped. In [`Method::Timeline`]
    /// progress only moves through [`set_progress`](Self::set_progress).
    pub fn tick(&mut self, dt: f32) -> &Outputs {
        self.outputs.clear();
        if !self.state.is_playing() || self.method == Method::Timeline {
            return &self.outputs;
        }
        let Some(path) = self.current_path() else {
            log::debug!("tick skipped: no valid path");
            return &self.outputs;
        };

        // a loop scrubbed onto its end restarts from that boundary; in
        // `LoopMode::Once` the advance reports the end instead
        let looping = self.loop_mode == LoopMode::Loop;
        if looping && self.time.at_loop_end() {
            self.time.begin_loop();
        }
        let crossings = self.time.advance(dt);
        if looping {
            self.time.wrap();
        }

        self.apply_pose(&*path);

        if self.time.take_end_reached() {
            let loops = self.time.loop_count();
            match self.loop_mode {
                LoopMode::Once => {
                    self.set_state(PlaybackState::StoppedAtEnd);
                    self.emit(TraversalEvent::Completed { loops });
                }
                LoopMode::Loop => {
                    let first = loops.saturating_sub(crossings) + 1;
                    for loops in first..=loops {
                        self.emit(TraversalEvent::Completed { loops });
                    }
                }
            }
        }
        &self.outputs
    }

    /// Apply a queued command.
    pub fn apply(&mut self, cmd: TraversalCommand) -> Result<()> {
        match cmd {
            TraversalCommand::Play => return self.play(),
            TraversalCommand::Pause => self.pause(),
            TraversalCommand::Restart { autoplay } => return self.restart(autoplay),
            TraversalCommand::SetNormalizedTime { time } => self.set_normalized_time(time),
            TraversalCommand::SetElapsedTime { time } => self.set_elapsed_time(time),
            TraversalCommand::SetProgress { progress } => self.set_progress(progress),
            TraversalCommand::SetStartOffset { offset } => self.set_start_offset(offset),
            TraversalCommand::SetDuration { duration } => self.set_duration(duration),
            TraversalCommand::SetForwardAxis { axis } => self.set_forward_axis(axis),
            TraversalCommand::SetUpAxis { axis } => self.set_up_axis(axis),
            TraversalCommand::SetLoopMode { mode } => self.set_loop_mode(mode),
        }
        Ok(())
    }

    // ----- time scrubbing -----

    /// Set normalized time; re-applies the pose without completing.
    pub fn set_normalized_time(&mut self, normalized: f32) {
        self.outputs.clear();
        self.time.set_normalized_time(normalized);
        self.refresh_pose();
    }

    /// Set elapsed time; re-applies the pose without completing.
    pub fn set_elapsed_time(&mut self, elapsed: f32) {
        self.outputs.clear();
        self.time.set_elapsed_time(elapsed);
        self.refresh_pose();
    }

    /// Set timeline progress in `[0, 1]`.
    ///
    /// Under [`Method::Time`] this scrubs normalized time within the current loop.
    pub fn set_progress(&mut self, progress: f32) {
        let progress = sanitize_offset(progress);
        match self.method {
            Method::Timeline => {
                self.outputs.clear();
                self.progress = progress;
                self.refresh_pose();
            }
            Method::Time => {
                let base = self.time.loop_count() as f32;
                self.set_normalized_time(base + progress);
            }
        }
    }

    /// Pause, then scrub normalized time.
    pub fn scrub_normalized_time(&mut self, normalized: f32) {
        self.pause();
        self.set_normalized_time(normalized);
    }

    /// Pause, then scrub elapsed time.
    pub fn scrub_elapsed_time(&mut self, elapsed: f32) {
        self.pause();
        self.set_elapsed_time(elapsed);
    }

    // ----- configuration -----

    pub fn set_start_offset(&mut self, offset: f32) {
        self.outputs.clear();
        self.start_offset = sanitize_offset(offset);
        self.offset.invalidate();
        self.recalculate();
        self.refresh_pose();
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.time.set_duration(duration);
        self.offset.invalidate();
    }

    /// Set the object's forward axis, swapping with or rejecting against the up axis.
    pub fn set_forward_axis(&mut self, axis: AlignAxis) {
        let (forward, up) = resolve_axis_pair(axis, self.forward_axis, self.up_axis);
        if forward != axis {
            log::debug!("forward axis {axis:?} rejected against up axis {up:?}");
        }
        self.forward_axis = forward;
        self.up_axis = up;
    }

    /// Set the object's up axis, swapping with or rejecting against the forward axis.
    pub fn set_up_axis(&mut self, axis: AlignAxis) {
        let (up, forward) = resolve_axis_pair(axis, self.up_axis, self.forward_axis);
        if up != axis {
            log::debug!("up axis {axis:?} rejected against forward axis {forward:?}");
        }
        self.up_axis = up;
        self.forward_axis = forward;
    }

    pub fn set_alignment(&mut self, alignment: AlignmentMode) {
        self.alignment = alignment;
    }

    pub fn set_locks(&mut self, locks: AxisLocks) {
        self.locks = locks;
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    /// Replace the path. The offset cache is rebuilt against the new geometry.
    pub fn set_container(&mut self, path: Option<Arc<dyn CurvePath>>) {
        self.path = path;
        self.offset.invalidate();
        self.recalculate();
    }

    /// Invalidate cached length/offset after the host changed the geometry.
    pub fn notify_path_changed(&mut self) {
        self.offset.invalidate();
    }

    /// Recompute cached path length and start-offset parameter now.
    pub fn recalculate(&mut self) {
        self.offset.recompute(self.path.as_deref(), self.start_offset);
    }

    // ----- observers -----

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&TraversalEvent) + 'static,
    {
        self.observers.subscribe(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    // ----- getters -----

    #[inline]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing()
    }

    #[inline]
    pub fn normalized_time(&self) -> f32 {
        self.time.normalized_time()
    }

    #[inline]
    pub fn elapsed_time(&self) -> f32 {
        self.time.elapsed_time()
    }

    #[inline]
    pub fn duration(&self) -> f32 {
        self.time.duration()
    }

    /// In-loop progress in `[0, 1]`, before easing and offset.
    pub fn progress(&self) -> f32 {
        match self.method {
            Method::Time => self.time.loop_interpolation(0.0),
            Method::Timeline => self.progress,
        }
    }

    #[inline]
    pub fn start_offset(&self) -> f32 {
        self.start_offset
    }

    /// Cached curve parameter of the start offset.
    #[inline]
    pub fn start_offset_param(&self) -> f32 {
        self.offset.param()
    }

    #[inline]
    pub fn offset_resolver(&self) -> &OffsetResolver {
        &self.offset
    }

    /// Cached path length; `None` until computed against a valid path.
    #[inline]
    pub fn path_length(&self) -> Option<f32> {
        self.offset.length()
    }

    #[inline]
    pub fn forward_axis(&self) -> AlignAxis {
        self.forward_axis
    }

    #[inline]
    pub fn up_axis(&self) -> AlignAxis {
        self.up_axis
    }

    #[inline]
    pub fn alignment(&self) -> AlignmentMode {
        self.alignment
    }

    #[inline]
    pub fn locks(&self) -> AxisLocks {
        self.locks
    }

    #[inline]
    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    #[inline]
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    #[inline]
    pub fn container(&self) -> Option<&Arc<dyn CurvePath>> {
        self.path.as_ref()
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[inline]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Events emitted by the most recent tick or mutating call.
    #[inline]
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    // ----- internals -----

    fn current_path(&self) -> Option<Arc<dyn CurvePath>> {
        self.path.as_ref().filter(|p| !p.is_empty()).cloned()
    }

    fn report_missing_path(&self, op: &str) -> TraversalError {
        log::error!("traversal {op}: no valid path set");
        TraversalError::MissingPath
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            log::debug!("traversal {} -> {}", self.state.name(), state.name());
            self.state = state;
        }
    }

    /// Re-apply the pose for the current time if a valid path is set.
    fn refresh_pose(&mut self) {
        if let Some(path) = self.current_path() {
            self.apply_pose(&*path);
        }
    }

    /// Curve parameter for the current progress, shifted by the start offset.
    fn curve_parameter(&self, offset_param: f32) -> f32 {
        fold_loop(self.easing.apply(self.progress()) + offset_param)
    }

    fn apply_pose(&mut self, path: &dyn CurvePath) {
        let offset_param = self.offset.resolve(path, self.start_offset);
        let t = self.curve_parameter(offset_param);
        let current = self.sink.rotation();
        let mut pose = evaluate_pose(
            path,
            t,
            self.alignment,
            self.forward_axis,
            self.up_axis,
            &current,
        );
        if self.alignment != AlignmentMode::None {
            pose.rotation = self.locks.apply(&pose.rotation, &current);
        }
        self.sink.apply(pose.position, pose.rotation);
        self.emit(TraversalEvent::Updated {
            position: pose.position,
            rotation: pose.rotation,
        });
    }

    fn emit(&mut self, event: TraversalEvent) {
        self.observers.notify(&event);
        self.outputs.push_event(event);
    }
}

fn sanitize_offset(value: f32) -> f32 {
    if value.is_finite() {
        clamp01(value)
    } else {
        0.0
    }
}

impl<S: TransformSink + fmt::Debug> fmt::Debug for Traversal<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("state", &self.state)
            .field("time", &self.time)
            .field("offset", &self.offset)
            .field("start_offset", &self.start_offset)
            .field("alignment", &self.alignment)
            .field("forward_axis", &self.forward_axis)
            .field("up_axis", &self.up_axis)
            .field("has_path", &self.path.is_some())
            .field("sink", &self.sink)
            .field("has_observers", &!self.observers.is_empty())
            .finish()
    }
}
