use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use vizij_traversal_core::{
    AlignAxis, AlignmentMode, CurvePath, Easing, LoopMode, Method, PlaybackState, PolylinePath,
    Quat, Transform, Traversal, TraversalCommand, TraversalConfig, TraversalError, TraversalEvent,
    Vec3,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn approx_vec(a: Vec3, b: Vec3, eps: f32) {
    assert!((a - b).norm() <= eps, "left={a:?} right={b:?} eps={eps}");
}

/// Straight 10-unit path along +Z.
fn line10() -> Arc<dyn CurvePath> {
    Arc::new(PolylinePath::new(vec![
        Vec3::zeros(),
        Vec3::new(0.0, 0.0, 10.0),
    ]))
}

/// L-shaped path: +Z for 5 units, then +X for 5 units.
fn corner() -> Arc<dyn CurvePath> {
    Arc::new(PolylinePath::new(vec![
        Vec3::zeros(),
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::new(5.0, 0.0, 5.0),
    ]))
}

fn mk(cfg: TraversalConfig, path: Arc<dyn CurvePath>) -> Traversal {
    Traversal::new(cfg, Transform::default()).with_path(path)
}

fn with_duration(duration: f32) -> TraversalConfig {
    TraversalConfig {
        duration,
        ..TraversalConfig::default()
    }
}

/// Record every event seen by an observer.
fn record(t: &mut Traversal) -> Rc<RefCell<Vec<TraversalEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    t.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    seen
}

#[test]
fn completes_once_after_final_update() {
    let mut t = mk(with_duration(2.0), line10());
    let seen = record(&mut t);
    t.play().unwrap();

    for _ in 0..3 {
        let out = t.tick(0.5);
        assert_eq!(out.completed_count(), 0);
    }
    let out = t.tick(0.5);
    assert_eq!(out.events.len(), 2);
    assert!(matches!(out.events[0], TraversalEvent::Updated { .. }));
    assert_eq!(out.events[1], TraversalEvent::Completed { loops: 1 });

    approx(t.elapsed_time(), 2.0, 1e-6);
    approx(t.normalized_time(), 1.0, 1e-6);
    assert_eq!(t.state(), PlaybackState::StoppedAtEnd);
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 10.0), 1e-4);

    // observers see the same order
    let seen = seen.borrow();
    assert_eq!(seen.len(), 5);
    assert!(seen[4].is_completed());
    assert!(!seen[3].is_completed());

    // further ticks do nothing until played again
    assert!(t.tick(0.5).is_empty());
}

#[test]
fn restart_without_autoplay_suppresses_completion() {
    let mut t = mk(with_duration(1.0), line10());
    t.play().unwrap();
    t.tick(1.0);
    assert_eq!(t.state(), PlaybackState::StoppedAtEnd);

    t.restart(false).unwrap();
    approx(t.normalized_time(), 0.0, 0.0);
    approx(t.elapsed_time(), 0.0, 0.0);
    assert_eq!(t.state(), PlaybackState::Idle);
    assert_eq!(t.outputs().completed_count(), 0);
    approx_vec(t.sink().position, Vec3::zeros(), 1e-5);

    for _ in 0..4 {
        assert!(t.tick(0.5).is_empty());
    }

    t.restart(true).unwrap();
    assert!(t.is_playing());
    t.tick(0.5);
    assert_eq!(t.outputs().completed_count(), 0);
    t.tick(0.5);
    assert_eq!(t.outputs().completed_count(), 1);
}

#[test]
fn restart_lands_on_start_offset() {
    let mut t = mk(
        TraversalConfig {
            start_offset: 0.3,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.restart(false).unwrap();
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 3.0), 1e-4);
}

#[test]
fn none_alignment_keeps_rotation() {
    let initial = Quat::from_euler_angles(0.3, -0.2, 1.1);
    let sink = Transform {
        position: Vec3::zeros(),
        rotation: initial,
    };
    let mut t = Traversal::new(
        TraversalConfig {
            alignment: AlignmentMode::None,
            ..with_duration(1.0)
        },
        sink,
    )
    .with_path(corner());
    t.play().unwrap();
    for _ in 0..10 {
        t.tick(0.1);
        assert_eq!(t.sink().rotation, initial);
    }
    // position still follows the path
    approx_vec(t.sink().position, Vec3::new(5.0, 0.0, 5.0), 1e-4);
}

#[test]
fn curve_alignment_follows_corner() {
    let mut t = mk(
        TraversalConfig {
            forward_axis: AlignAxis::ZAxis,
            ..with_duration(1.0)
        },
        corner(),
    );
    t.set_normalized_time(0.25);
    approx_vec(t.sink().rotation * Vec3::z(), Vec3::z(), 1e-4);
    t.set_normalized_time(0.75);
    approx_vec(t.sink().rotation * Vec3::z(), Vec3::x(), 1e-4);
    approx_vec(t.sink().rotation * Vec3::y(), Vec3::y(), 1e-4);
}

#[test]
fn normalized_time_round_trip_never_completes() {
    let mut t = mk(with_duration(3.0), line10());
    let seen = record(&mut t);
    for x in [0.0, 0.4, 1.0, 2.5] {
        t.set_normalized_time(x);
        approx(t.elapsed_time(), 3.0 * x, 1e-5);
        assert_eq!(t.outputs().completed_count(), 0);
    }
    assert!(seen.borrow().iter().all(|e| !e.is_completed()));
}

#[test]
fn elapsed_time_scrub_updates_pose() {
    let mut t = mk(with_duration(4.0), line10());
    t.set_elapsed_time(1.0);
    approx(t.normalized_time(), 0.25, 1e-6);
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 2.5), 1e-4);
}

#[test]
fn scrubbing_pauses_playback() {
    let mut t = mk(with_duration(1.0), line10());
    t.play().unwrap();
    t.tick(0.2);
    t.scrub_normalized_time(0.6);
    assert_eq!(t.state(), PlaybackState::Paused);
    t.tick(0.2);
    approx(t.normalized_time(), 0.6, 1e-6);
    t.scrub_elapsed_time(0.1);
    approx(t.normalized_time(), 0.1, 1e-6);
}

#[test]
fn play_after_end_starts_next_loop() {
    let mut t = mk(with_duration(1.0), line10());
    t.play().unwrap();
    t.tick(1.0);
    assert_eq!(t.state(), PlaybackState::StoppedAtEnd);

    t.play().unwrap();
    approx(t.elapsed_time(), 0.0, 0.0);
    approx(t.normalized_time(), 1.0, 0.0);
    t.tick(0.25);
    approx(t.normalized_time(), 1.25, 1e-6);
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 2.5), 1e-4);
    t.tick(0.75);
    assert_eq!(t.outputs().events.last(), Some(&TraversalEvent::Completed { loops: 2 }));
}

#[test]
fn large_step_completes_once_in_once_mode() {
    let mut t = mk(with_duration(1.0), line10());
    t.play().unwrap();
    let out = t.tick(3.5);
    assert_eq!(out.completed_count(), 1);
    assert_eq!(t.state(), PlaybackState::StoppedAtEnd);
}

#[test]
fn loop_mode_keeps_playing_and_counts_each_crossing() {
    let mut t = mk(
        TraversalConfig {
            loop_mode: LoopMode::Loop,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.play().unwrap();
    t.tick(0.5);
    let out = t.tick(0.5);
    assert_eq!(out.events.last(), Some(&TraversalEvent::Completed { loops: 1 }));
    assert!(t.is_playing());
    approx(t.elapsed_time(), 0.0, 1e-6);

    t.tick(0.25);
    approx(t.normalized_time(), 1.25, 1e-6);
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 2.5), 1e-4);

    let out = t.tick(2.0);
    let completed: Vec<_> = out.events.iter().filter(|e| e.is_completed()).cloned().collect();
    assert_eq!(
        completed,
        vec![
            TraversalEvent::Completed { loops: 2 },
            TraversalEvent::Completed { loops: 3 },
        ]
    );
    approx(t.normalized_time(), 3.25, 1e-5);
}

#[test]
fn missing_path_is_reported() {
    let mut t: Traversal = Traversal::new(TraversalConfig::default(), Transform::default());
    assert!(matches!(t.play(), Err(TraversalError::MissingPath)));
    assert!(matches!(t.restart(true), Err(TraversalError::MissingPath)));
    assert_eq!(t.state(), PlaybackState::Idle);
    assert!(t.tick(0.5).is_empty());

    let empty: Arc<dyn CurvePath> = Arc::new(PolylinePath::new(vec![Vec3::zeros()]));
    t.set_container(Some(empty));
    assert!(t.play().is_err());
    assert_eq!(t.path_length(), None);
}

#[test]
fn axis_setter_rejects_same_axis() {
    let mut t = mk(
        TraversalConfig {
            forward_axis: AlignAxis::XAxis,
            up_axis: AlignAxis::YAxis,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.set_forward_axis(AlignAxis::NegativeYAxis);
    assert_eq!(t.forward_axis(), AlignAxis::XAxis);
    assert_eq!(t.up_axis(), AlignAxis::YAxis);

    t.set_forward_axis(AlignAxis::YAxis);
    assert_eq!(t.forward_axis(), AlignAxis::YAxis);
    assert_eq!(t.up_axis(), AlignAxis::XAxis);

    t.set_up_axis(AlignAxis::NegativeZAxis);
    assert_eq!(t.up_axis(), AlignAxis::NegativeZAxis);
    assert_eq!(t.forward_axis(), AlignAxis::YAxis);
}

#[test]
fn locked_axes_keep_current_angles() {
    let initial = Quat::from_euler_angles(0.0, 0.0, 0.4);
    let sink = Transform {
        position: Vec3::zeros(),
        rotation: initial,
    };
    let mut t = Traversal::new(
        TraversalConfig {
            locks: vizij_traversal_core::AxisLocks {
                x: false,
                y: false,
                z: true,
            },
            forward_axis: AlignAxis::ZAxis,
            ..with_duration(1.0)
        },
        sink,
    )
    .with_path(corner());
    t.set_normalized_time(0.25);
    let (roll, pitch, yaw) = t.sink().rotation.euler_angles();
    approx(roll, 0.0, 1e-4);
    approx(pitch, 0.0, 1e-4);
    approx(yaw, 0.4, 1e-4);

    t.set_locks(vizij_traversal_core::AxisLocks::default());
    t.set_normalized_time(0.25);
    approx(t.sink().rotation.angle(), 0.0, 1e-4);
}

#[test]
fn easing_reshapes_progress() {
    let mut t = mk(
        TraversalConfig {
            easing: Easing::EaseIn,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.set_normalized_time(0.25);
    assert!(t.sink().position.z < 2.5);
    t.set_easing(Easing::Linear);
    t.set_normalized_time(0.25);
    approx(t.sink().position.z, 2.5, 1e-4);
}

#[test]
fn timeline_progress_drives_pose() {
    let mut t = mk(
        TraversalConfig {
            method: Method::Timeline,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.play().unwrap();
    assert!(t.tick(1.0).is_empty());
    approx(t.elapsed_time(), 0.0, 0.0);

    t.set_progress(0.4);
    approx(t.progress(), 0.4, 1e-6);
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 4.0), 1e-4);
    assert_eq!(t.outputs().completed_count(), 0);
}

#[test]
fn commands_drive_playback() {
    let mut t = mk(with_duration(2.0), line10());
    t.apply(TraversalCommand::SetStartOffset { offset: 0.5 }).unwrap();
    t.apply(TraversalCommand::Play).unwrap();
    t.tick(1.0);
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 10.0), 1e-4);
    t.apply(TraversalCommand::Pause).unwrap();
    assert_eq!(t.state(), PlaybackState::Paused);
    t.apply(TraversalCommand::SetDuration { duration: 4.0 }).unwrap();
    approx(t.elapsed_time(), 2.0, 1e-6);
    t.apply(TraversalCommand::Restart { autoplay: false }).unwrap();
    approx_vec(t.sink().position, Vec3::new(0.0, 0.0, 5.0), 1e-4);
}

#[test]
fn unsubscribed_observer_stops_receiving() {
    let mut t = mk(with_duration(1.0), line10());
    let count = Rc::new(RefCell::new(0usize));
    let c = Rc::clone(&count);
    let id = t.subscribe(move |_| *c.borrow_mut() += 1);
    t.set_normalized_time(0.5);
    assert!(t.unsubscribe(id));
    t.set_normalized_time(0.6);
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn scrubbing_to_end_while_playing_completes_once() {
    let mut t = mk(with_duration(1.0), line10());
    t.play().unwrap();
    t.tick(0.2);
    t.set_normalized_time(1.0);
    assert_eq!(t.outputs().completed_count(), 0);

    let mut completed = 0;
    for _ in 0..20 {
        completed += t.tick(0.1).completed_count();
    }
    assert_eq!(completed, 1);
    assert_eq!(t.state(), PlaybackState::StoppedAtEnd);
    approx(t.normalized_time(), 1.0, 0.0);

    // an elapsed scrub past the end behaves the same way
    t.restart(true).unwrap();
    t.tick(0.2);
    t.set_elapsed_time(5.0);
    approx(t.normalized_time(), 1.0, 0.0);
    let out = t.tick(0.1);
    assert_eq!(out.events.last(), Some(&TraversalEvent::Completed { loops: 1 }));
    assert_eq!(t.state(), PlaybackState::StoppedAtEnd);
}

#[test]
fn scrubbing_mid_loop_while_looping_keeps_loop_count() {
    let mut t = mk(
        TraversalConfig {
            loop_mode: LoopMode::Loop,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.play().unwrap();
    t.tick(0.2);
    t.set_normalized_time(2.5);

    let out = t.tick(0.1);
    assert_eq!(out.completed_count(), 0);
    approx(t.normalized_time(), 2.6, 1e-5);

    let out = t.tick(0.5);
    assert_eq!(out.events.last(), Some(&TraversalEvent::Completed { loops: 3 }));
    approx(t.normalized_time(), 3.1, 1e-5);
    assert!(t.is_playing());
}

enum Step {
    Tick(f32),
    Normalized(f32),
    Elapsed(f32),
}

#[test]
fn loop_count_tracks_completions_across_scrubs() {
    let mut t = mk(
        TraversalConfig {
            loop_mode: LoopMode::Loop,
            ..with_duration(1.0)
        },
        line10(),
    );
    t.play().unwrap();

    let steps = [
        Step::Tick(0.3),
        Step::Tick(0.3),
        Step::Tick(0.3),
        Step::Tick(0.3),
        Step::Tick(0.3),
        Step::Normalized(2.5),
        Step::Tick(0.3),
        Step::Tick(0.3),
        Step::Tick(0.3),
        Step::Elapsed(0.9),
        Step::Tick(0.3),
        Step::Normalized(4.0),
        Step::Tick(0.3),
        Step::Elapsed(3.0),
        Step::Tick(0.3),
        Step::Tick(2.5),
    ];

    let mut loops = 0u32;
    let mut total_completed = 0usize;
    for step in steps {
        match step {
            Step::Tick(dt) => {
                let out = t.tick(dt);
                for event in out.events.iter().filter(|e| e.is_completed()) {
                    loops += 1;
                    total_completed += 1;
                    assert_eq!(event, &TraversalEvent::Completed { loops });
                }
            }
            Step::Normalized(x) => {
                t.set_normalized_time(x);
                assert_eq!(t.outputs().completed_count(), 0);
                loops = t.normalized_time().floor() as u32;
            }
            Step::Elapsed(e) => {
                t.set_elapsed_time(e);
                assert_eq!(t.outputs().completed_count(), 0);
                loops = t.normalized_time().floor() as u32;
            }
        }
        let n = t.normalized_time();
        assert_eq!(n.floor() as u32, loops, "normalized={n}");
        assert!(n - n.floor() < 1.0);
    }
    assert!(t.is_playing());
    assert!(total_completed >= 4);
}
