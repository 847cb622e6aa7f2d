//! Integration tests for the playback contract
//!
//! These tests verify that:
//! - Ticking carries time across children and directions
//! - Pausing and seeking never resume playback on their own
//! - Stopping is idempotent and reports completion exactly once
//! - An interrupted child fails its parents according to their policy

use choreo_animation::{Animation, AnimationOptions, Leaf, Phase, Position, Timeline};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<bool>>>;

fn recorder() -> (Calls, impl FnMut(bool) + 'static) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    (calls, move |done| sink.borrow_mut().push(done))
}

fn seconds(s: f64) -> Animation {
    Animation::wait().seconds(s)
}

fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// A leaf that reports an interruption once its flag is raised
struct Fragile {
    broken: Rc<Cell<bool>>,
}

impl Leaf for Fragile {
    fn update(&mut self, _progress: f64) {}

    fn is_interrupted(&self) -> bool {
        self.broken.get()
    }
}

#[test]
fn test_stop_at_end_is_idempotent() {
    let (calls, callback) = recorder();
    let mut timeline = Timeline::new(Animation::sequential([seconds(1.0), seconds(1.0)]));
    timeline.on_complete(callback);
    timeline.play(AnimationOptions::default());
    timeline.tick(0.5);

    timeline.stop(Some(Position::End));
    timeline.stop(Some(Position::End));

    assert_eq!(timeline.position(), Position::End);
    assert_eq!(timeline.phase(), Phase::Completed);
    assert_eq!(*calls.borrow(), vec![true]);
    for child in timeline.root().children() {
        assert_eq!(child.position(), Position::End);
    }
}

type Log = Rc<RefCell<Vec<(&'static str, bool)>>>;

fn logged(log: &Log, name: &'static str, node: Animation) -> Animation {
    let sink = log.clone();
    node.on_complete(move |done| sink.borrow_mut().push((name, done)))
}

/// Children that already finished keep their single completion when the
/// parent is stopped at the end
#[test]
fn test_stop_at_end_skips_finished_parallel_children() {
    let log: Log = Rc::default();
    let tree = Animation::parallel([
        logged(&log, "a", seconds(1.0)),
        logged(&log, "b", seconds(1.0)),
        logged(&log, "c", seconds(2.0)),
    ]);
    let mut timeline = Timeline::new(logged(&log, "root", tree));
    timeline.play(AnimationOptions::default());
    timeline.tick(1.0);
    assert_eq!(*log.borrow(), vec![("a", true), ("b", true)]);

    timeline.stop(Some(Position::End));
    assert_eq!(
        *log.borrow(),
        vec![("a", true), ("b", true), ("c", true), ("root", true)]
    );
    for child in timeline.root().children() {
        assert_eq!(child.position(), Position::End);
        assert_eq!(child.phase(), Phase::Completed);
    }
}

#[test]
fn test_stop_at_end_skips_finished_sequential_children() {
    let log: Log = Rc::default();
    let inner = Animation::sequential([
        logged(&log, "a", seconds(1.0)),
        logged(&log, "b", seconds(1.0)),
    ]);
    let tree = Animation::parallel([logged(&log, "seq", inner), logged(&log, "c", seconds(3.0))]);
    let mut timeline = Timeline::new(tree);
    timeline.play(AnimationOptions::default());
    timeline.tick(1.5);
    assert_eq!(*log.borrow(), vec![("a", true)]);

    timeline.stop(Some(Position::End));
    let fired = |name| log.borrow().iter().filter(|(n, _)| *n == name).count();
    for name in ["a", "b", "seq", "c"] {
        assert_eq!(fired(name), 1, "{name}");
    }
    assert!(log.borrow().iter().all(|(_, done)| *done));
}

/// Zero-width children at the tail of a sequence land on their final frame
#[test]
fn test_stop_at_end_fires_trailing_instant() {
    let fired = Rc::new(Cell::new(0));
    let sink = fired.clone();
    let (calls, callback) = recorder();
    let tree = Animation::sequential([
        seconds(1.0),
        Animation::instant(move || sink.set(sink.get() + 1)).on_complete(callback),
        seconds(0.0),
    ]);
    let mut timeline = Timeline::new(tree);
    timeline.play(AnimationOptions::default());
    timeline.tick(0.5);

    timeline.stop(Some(Position::End));
    assert_eq!(fired.get(), 1);
    assert_eq!(*calls.borrow(), vec![true]);
    let positions: Vec<_> = timeline.root().children().iter().map(Animation::position).collect();
    assert_eq!(positions, [Position::End; 3]);
}

/// Stopping in place short of the end reports an incomplete run
#[test]
fn test_stop_in_place_reports_incomplete() {
    let (calls, callback) = recorder();
    let mut timeline = Timeline::new(seconds(2.0));
    timeline.on_complete(callback);
    timeline.play(AnimationOptions::default());
    timeline.tick(1.0);
    timeline.stop(None);

    assert_eq!(timeline.position(), Position::Progress(0.5));
    assert_eq!(*calls.borrow(), vec![false]);

    // Nothing fires after the stop
    timeline.tick(5.0);
    assert_eq!(*calls.borrow(), vec![false]);
    assert_eq!(timeline.position(), Position::Progress(0.5));
}

#[test]
fn test_stop_before_play_fires_once() {
    let (calls, callback) = recorder();
    let mut timeline = Timeline::new(seconds(1.0));
    timeline.on_complete(callback);
    timeline.stop(Some(Position::End));
    timeline.stop(Some(Position::Start));
    assert_eq!(timeline.position(), Position::End);
    assert_eq!(*calls.borrow(), vec![true]);
}

#[test]
fn test_natural_completion_fires_once() {
    let (calls, callback) = recorder();
    let (first_calls, first_callback) = recorder();
    let tree = Animation::sequential([seconds(1.0).on_complete(first_callback), seconds(1.0)]);
    let mut timeline = Timeline::new(tree);
    timeline.on_complete(callback);
    timeline.play(AnimationOptions::default());

    timeline.tick(1.25);
    assert_eq!(*first_calls.borrow(), vec![true]);
    assert!(calls.borrow().is_empty());

    timeline.tick(1.0);
    timeline.tick(1.0);
    assert_eq!(*calls.borrow(), vec![true]);
    assert_eq!(timeline.position(), Position::End);
}

/// Seeking while paused stays paused, and play picks up exactly there
#[test]
fn test_pause_then_seek_does_not_resume() {
    let mut timeline = Timeline::new(seconds(1.0));
    timeline.play(AnimationOptions::default());
    timeline.tick(0.25);
    timeline.pause();

    timeline.set_position(Position::Progress(0.8));
    assert_eq!(timeline.phase(), Phase::Paused);
    timeline.tick(0.1);
    assert_eq!(timeline.position(), Position::Progress(0.8));

    timeline.play(AnimationOptions::default());
    assert_eq!(timeline.position(), Position::Progress(0.8));
    timeline.tick(0.1);
    assert_near(timeline.position().progress(), 0.9);
}

#[test]
fn test_play_resumes_from_manual_position() {
    let mut timeline = Timeline::new(Animation::sequential([seconds(1.0), seconds(1.0)]));
    timeline.set_position(Position::Progress(0.6));
    assert_eq!(timeline.phase(), Phase::Idle);

    timeline.play(AnimationOptions::default());
    timeline.tick(0.2);
    assert_near(timeline.position().progress(), 0.7);
    assert_eq!(timeline.root().children()[0].position(), Position::End);
}

/// Seeking a playing timeline keeps it playing from the new position
#[test]
fn test_seek_while_playing_keeps_playing() {
    let mut timeline = Timeline::new(seconds(2.0));
    timeline.play(AnimationOptions::default());
    timeline.tick(0.5);
    timeline.set_position(Position::Progress(0.5));
    assert!(timeline.phase().is_playing());
    timeline.tick(0.5);
    assert_near(timeline.position().progress(), 0.75);
}

/// Reversed parallel children are delayed so they all reach the start together
#[test]
fn test_reversed_parallel_delays() {
    let (calls, callback) = recorder();
    let mut timeline = Timeline::new(Animation::parallel([seconds(2.0), seconds(4.0)]));
    timeline.on_complete(callback);
    timeline.set_position(Position::End);
    timeline.play(AnimationOptions::new().reverse(true));

    timeline.tick(1.0);
    let children = timeline.root().children();
    assert_eq!(children[0].position(), Position::End);
    assert_near(children[1].progress(), 0.75);

    timeline.tick(1.5);
    let children = timeline.root().children();
    assert_near(children[0].progress(), 0.75);
    assert_near(children[1].progress(), 0.375);

    timeline.tick(2.5);
    assert_eq!(timeline.position(), Position::Start);
    assert_eq!(*calls.borrow(), vec![true]);
}

/// Time left over when one child finishes runs into the next one
#[test]
fn test_tick_carries_leftover_time() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let tree = Animation::sequential([
        seconds(0.5),
        Animation::instant(move || counter.set(counter.get() + 1)),
        seconds(1.0),
        seconds(0.5),
    ]);
    let mut timeline = Timeline::new(tree);
    assert_eq!(timeline.duration(), 2.0);
    timeline.play(AnimationOptions::default());

    timeline.tick(1.75);
    assert_eq!(fired.get(), 1);
    let children = timeline.root().children();
    assert_eq!(children[2].position(), Position::End);
    assert_near(children[3].progress(), 0.5);
    assert_near(timeline.position().progress(), 0.875);
}

/// A tree without duration completes as soon as it starts
#[test]
fn test_empty_and_instant_trees_complete_synchronously() {
    for tree in [
        Animation::sequential([]),
        Animation::parallel([]),
        Animation::sequential([Animation::instant(|| {}), Animation::instant(|| {})]),
        Animation::parallel([Animation::instant(|| {})]).repeat(3),
    ] {
        let (calls, callback) = recorder();
        let mut timeline = Timeline::new(tree);
        assert_eq!(timeline.duration(), 0.0);
        timeline.on_complete(callback);
        timeline.play(AnimationOptions::default());
        assert_eq!(timeline.phase(), Phase::Completed);
        assert_eq!(*calls.borrow(), vec![true]);
    }
}

/// An interrupted child fails the parent, which stops its other children in place
#[test]
fn test_interrupted_child_stops_siblings() {
    let broken = Rc::new(Cell::new(false));
    let (root_calls, root_callback) = recorder();
    let (sibling_calls, sibling_callback) = recorder();
    let tree = Animation::parallel([
        Animation::leaf(Fragile {
            broken: broken.clone(),
        })
        .seconds(2.0),
        seconds(2.0).on_complete(sibling_callback),
    ]);
    let mut timeline = Timeline::new(tree);
    timeline.on_complete(root_callback);
    timeline.play(AnimationOptions::default());
    timeline.tick(0.5);

    broken.set(true);
    timeline.tick(0.5);

    assert_eq!(*root_calls.borrow(), vec![false]);
    assert_eq!(*sibling_calls.borrow(), vec![false]);
    let sibling = &timeline.root().children()[1];
    assert_eq!(sibling.phase(), Phase::Completed);
    assert_near(sibling.progress(), 0.25);
}

/// Opting out of completion forwards the failure and leaves siblings alone
#[test]
fn test_interrupted_child_without_complete_policy() {
    let broken = Rc::new(Cell::new(false));
    let (root_calls, root_callback) = recorder();
    let (sibling_calls, sibling_callback) = recorder();
    let tree = Animation::sequential([
        Animation::parallel([
            Animation::leaf(Fragile {
                broken: broken.clone(),
            })
            .seconds(2.0),
            seconds(2.0).on_complete(sibling_callback),
        ]),
        seconds(1.0),
    ])
    .completes(false);
    let mut timeline = Timeline::new(tree);
    timeline.on_complete(root_callback);
    timeline.play(AnimationOptions::default());
    timeline.tick(0.5);

    broken.set(true);
    timeline.tick(0.5);

    assert_eq!(*root_calls.borrow(), vec![false]);
    assert!(sibling_calls.borrow().is_empty());
    let parallel = &timeline.root().children()[0];
    assert_eq!(parallel.phase(), Phase::Completed);
    assert_eq!(parallel.children()[1].phase(), Phase::Playing);
    assert_eq!(timeline.root().children()[1].phase(), Phase::Idle);
}

/// Play options merge into the stored ones; repeating them changes nothing
#[test]
fn test_play_options_merge() {
    let mut timeline = Timeline::new(seconds(1.0));
    let options = AnimationOptions::new().seconds(2.0);
    assert_eq!(options.or(options), options);

    timeline.play(options);
    timeline.pause();
    timeline.play(options);
    assert_eq!(timeline.duration(), 2.0);
    assert_eq!(timeline.options(), options);

    timeline.pause();
    timeline.play(AnimationOptions::new().reverse(true));
    assert!(timeline.is_reversed());
    assert_eq!(timeline.options().duration, options.duration);
}

/// Repeating an autoreverse plays there and back every cycle
#[test]
fn test_repeated_autoreverse_plays_every_cycle() {
    let value = Rc::new(Cell::new(f64::NAN));
    let sink = value.clone();
    let tween = Animation::tween(0.0, 1.0, move |v: f64| sink.set(v)).seconds(0.5);
    let mut timeline = Timeline::new(tween.autoreverse().repeat(2));
    assert_eq!(timeline.duration(), 2.0);
    timeline.play(AnimationOptions::default());

    timeline.tick(0.5);
    assert_near(value.get(), 1.0);
    timeline.tick(0.75);
    assert_near(value.get(), 0.5);
    timeline.tick(0.75);
    assert_eq!(value.get(), 0.0);
    assert_eq!(timeline.phase(), Phase::Completed);
}
