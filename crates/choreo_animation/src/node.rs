//! Animation tree
//!
//! [`Animation`] is a closed sum over leaves and the four composites. Every
//! variant satisfies the same contract, so a composite is itself a valid
//! child of another composite.
//!
//! # Example
//!
//! ```
//! use choreo_animation::{Animation, Curve, Timeline};
//!
//! let fade = Animation::wait().seconds(1.0);
//! let slide = Animation::wait().seconds(1.0);
//! let tree = Animation::sequential([fade, slide]).curve(Curve::EASE_IN_OUT);
//!
//! let timeline = Timeline::new(tree);
//! assert_eq!(timeline.duration(), 2.0);
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use crate::autoreverse::Autoreverse;
use crate::context::TimingContext;
use crate::curve::Curve;
use crate::duration::{Demand, Duration};
use crate::leaf::{Instant, Leaf, LeafNode, Tween, Wait};
use crate::options::AnimationOptions;
use crate::parallel::Parallel;
use crate::phase::{Phase, PhaseEvent};
use crate::playback::{Playback, Step};
use crate::position::Position;
use crate::repeat::{Repeat, RepeatCount};
use crate::sequential::Sequential;
use crate::tween::Tweenable;

/// Variant tag of an [`Animation`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Leaf,
    Sequential,
    Parallel,
    Repeat,
    Autoreverse,
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnimationKind::Leaf => "leaf",
            AnimationKind::Sequential => "sequential",
            AnimationKind::Parallel => "parallel",
            AnimationKind::Repeat => "repeat",
            AnimationKind::Autoreverse => "autoreverse",
        })
    }
}

/// Resolved schedule entry of one child
#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    /// Sub-range of the parent's progress the child owns
    pub range: RangeInclusive<f64>,
    /// Resolved duration in seconds
    pub duration: f64,
    /// Slice of the parent's curve handed to the child
    pub curve: Option<Curve>,
}

/// A node of an animation tree
pub enum Animation {
    Leaf(LeafNode),
    Sequential(Sequential),
    Parallel(Parallel),
    Repeat(Repeat),
    Autoreverse(Autoreverse),
}

// ============================================================================
// Construction
// ============================================================================

impl Animation {
    /// Wrap an opaque leaf
    pub fn leaf(leaf: impl Leaf + 'static) -> Self {
        Animation::Leaf(LeafNode::new(Box::new(leaf)))
    }

    /// Interpolate from `from` to `to`, handing every value to `apply`
    pub fn tween<T, F>(from: T, to: T, apply: F) -> Self
    where
        T: Tweenable + 'static,
        F: FnMut(T) + 'static,
    {
        Animation::leaf(Tween::new(from, to, apply))
    }

    /// An interval with no effect
    pub fn wait() -> Self {
        Animation::leaf(Wait::new())
    }

    /// Zero-duration action
    pub fn instant(action: impl FnMut() + 'static) -> Self {
        Animation::leaf(Instant::new(action))
    }

    /// Play children one after another
    pub fn sequential(children: impl IntoIterator<Item = Animation>) -> Self {
        Animation::Sequential(Sequential::new(children.into_iter().collect()))
    }

    /// Play children together
    pub fn parallel(children: impl IntoIterator<Item = Animation>) -> Self {
        Animation::Parallel(Parallel::new(children.into_iter().collect()))
    }

    /// Play this animation `count` times (at least once)
    pub fn repeat(self, count: usize) -> Self {
        Animation::Repeat(Repeat::new(self, RepeatCount::Times(count.max(1))))
    }

    /// Play this animation until stopped
    pub fn repeat_forever(self) -> Self {
        Animation::Repeat(Repeat::new(self, RepeatCount::Forever))
    }

    /// Play this animation forward then backward
    pub fn autoreverse(self) -> Self {
        Animation::Autoreverse(Autoreverse::new(self))
    }

    /// Merge options into the declared ones, new values win
    pub fn with_options(mut self, options: AnimationOptions) -> Self {
        let playback = self.playback_mut();
        playback.declared = options.or(playback.declared);
        self
    }

    pub fn duration(self, duration: Duration) -> Self {
        self.with_options(AnimationOptions::new().with_duration(duration))
    }

    /// Absolute duration in seconds
    pub fn seconds(self, seconds: f64) -> Self {
        self.duration(Duration::seconds(seconds))
    }

    /// Fraction of the parent's duration
    pub fn relative(self, fraction: f64) -> Self {
        self.duration(Duration::relative(fraction))
    }

    pub fn curve(self, curve: Curve) -> Self {
        self.with_options(AnimationOptions::new().curve(curve))
    }

    /// Whether an interruption stops the children in place
    pub fn completes(self, complete: bool) -> Self {
        self.with_options(AnimationOptions::new().complete(complete))
    }

    /// Register a completion callback
    pub fn on_complete(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.add_completion(callback);
        self
    }

    pub fn add_completion(&mut self, callback: impl FnMut(bool) + 'static) {
        self.playback_mut().add_completion(Box::new(callback));
    }
}

// ============================================================================
// Queries
// ============================================================================

impl Animation {
    pub fn kind(&self) -> AnimationKind {
        match self {
            Animation::Leaf(_) => AnimationKind::Leaf,
            Animation::Sequential(_) => AnimationKind::Sequential,
            Animation::Parallel(_) => AnimationKind::Parallel,
            Animation::Repeat(_) => AnimationKind::Repeat,
            Animation::Autoreverse(_) => AnimationKind::Autoreverse,
        }
    }

    pub fn position(&self) -> Position {
        Position::from_progress(self.playback().progress)
    }

    /// Linear progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.playback().progress
    }

    pub fn phase(&self) -> Phase {
        self.playback().phase
    }

    pub fn is_reversed(&self) -> bool {
        self.playback().reversed
    }

    /// Options declared on this node
    pub fn options(&self) -> AnimationOptions {
        self.playback().declared
    }

    /// Duration declared on the node, falling back to a leaf's intrinsic one
    pub fn declared_duration(&self) -> Option<Duration> {
        let declared = self.playback().options().duration;
        match self {
            Animation::Leaf(node) => declared.or(node.intrinsic_duration()),
            _ => declared,
        }
    }

    /// Duration in seconds assigned by the last schedule resolution
    pub fn resolved_duration(&self) -> f64 {
        self.playback().duration
    }

    /// Curve in effect after composing the inherited slice with the node's own
    pub fn effective_curve(&self) -> Option<Curve> {
        self.playback().curve
    }

    pub fn children(&self) -> &[Animation] {
        match self {
            Animation::Leaf(_) => &[],
            Animation::Sequential(node) => &node.children,
            Animation::Parallel(node) => &node.children,
            Animation::Repeat(node) => std::slice::from_ref(node.child.as_ref()),
            Animation::Autoreverse(node) => std::slice::from_ref(node.child.as_ref()),
        }
    }

    /// Per-child schedule of a sequential or parallel node
    pub fn schedule(&self) -> &[Slot] {
        match self {
            Animation::Sequential(node) => &node.slots,
            Animation::Parallel(node) => &node.slots,
            _ => &[],
        }
    }
}

// ============================================================================
// Timing protocol
// ============================================================================

impl Animation {
    pub(crate) fn playback(&self) -> &Playback {
        match self {
            Animation::Leaf(node) => &node.playback,
            Animation::Sequential(node) => &node.playback,
            Animation::Parallel(node) => &node.playback,
            Animation::Repeat(node) => &node.playback,
            Animation::Autoreverse(node) => &node.playback,
        }
    }

    pub(crate) fn playback_mut(&mut self) -> &mut Playback {
        match self {
            Animation::Leaf(node) => &mut node.playback,
            Animation::Sequential(node) => &mut node.playback,
            Animation::Parallel(node) => &mut node.playback,
            Animation::Repeat(node) => &mut node.playback,
            Animation::Autoreverse(node) => &mut node.playback,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Animation] {
        match self {
            Animation::Leaf(_) => &mut [],
            Animation::Sequential(node) => &mut node.children,
            Animation::Parallel(node) => &mut node.children,
            Animation::Repeat(node) => std::slice::from_mut(node.child.as_mut()),
            Animation::Autoreverse(node) => std::slice::from_mut(node.child.as_mut()),
        }
    }

    /// Shortest duration fitting the subtree, `None` when it cannot be inferred
    pub(crate) fn natural_duration(&self) -> Option<f64> {
        match self {
            Animation::Leaf(_) => None,
            Animation::Sequential(node) => node.natural_duration(),
            Animation::Parallel(node) => node.natural_duration(),
            Animation::Repeat(node) => node.natural_duration(),
            Animation::Autoreverse(node) => node.natural_duration(),
        }
    }

    pub(crate) fn demand(&self) -> Demand {
        let declared = self.declared_duration();
        let natural = match declared {
            Some(_) => None,
            None => self.natural_duration(),
        };
        Demand::new(declared, natural)
    }

    /// Top-down schedule resolution
    pub(crate) fn resolve(
        &mut self,
        duration: f64,
        inherited_curve: Option<Curve>,
        inherited_complete: Option<bool>,
        cx: &mut TimingContext,
    ) {
        match self {
            Animation::Leaf(node) => node.resolve(duration, inherited_curve, inherited_complete),
            Animation::Sequential(node) => {
                node.resolve(duration, inherited_curve, inherited_complete, cx)
            }
            Animation::Parallel(node) => {
                node.resolve(duration, inherited_curve, inherited_complete, cx)
            }
            Animation::Repeat(node) => {
                node.resolve(duration, inherited_curve, inherited_complete, cx)
            }
            Animation::Autoreverse(node) => {
                node.resolve(duration, inherited_curve, inherited_complete, cx)
            }
        }
    }

    /// Jump to a progress value without animating
    pub(crate) fn seek(&mut self, progress: f64, cx: &mut TimingContext) {
        let pinned = cx.is_settling() && self.phase().is_finished();
        if !pinned && !self.playback_mut().apply(PhaseEvent::Seek) {
            return;
        }
        self.place(unit(progress), cx);
    }

    fn place(&mut self, progress: f64, cx: &mut TimingContext) {
        match self {
            Animation::Leaf(node) => node.place(progress),
            Animation::Sequential(node) => node.place(progress, cx),
            Animation::Parallel(node) => node.place(progress, cx),
            Animation::Repeat(node) => node.place(progress, cx),
            Animation::Autoreverse(node) => node.place(progress, cx),
        }
    }

    /// Begin or resume playing from the current position
    pub(crate) fn start(&mut self, reversed: bool) {
        let playback = self.playback_mut();
        if !playback.apply(PhaseEvent::Play) {
            return;
        }
        playback.reversed = reversed;
        match self {
            Animation::Leaf(_) => {}
            Animation::Sequential(node) => node.start(),
            Animation::Parallel(node) => node.start(),
            Animation::Repeat(node) => node.start(),
            Animation::Autoreverse(node) => node.start(),
        }
    }

    pub(crate) fn advance(&mut self, dt: f64, cx: &mut TimingContext) -> Step {
        if !self.phase().is_playing() {
            return Step::Running;
        }
        match self {
            Animation::Leaf(node) => node.advance(dt, cx),
            Animation::Sequential(node) => node.advance(dt, cx),
            Animation::Parallel(node) => node.advance(dt, cx),
            Animation::Repeat(node) => node.advance(dt, cx),
            Animation::Autoreverse(node) => node.advance(dt, cx),
        }
    }

    pub(crate) fn pause(&mut self) {
        if !self.playback_mut().apply(PhaseEvent::Pause) {
            return;
        }
        for child in self.children_mut() {
            child.pause();
        }
    }

    /// Stop at `at` (or in place) and report completion once
    pub(crate) fn halt(&mut self, at: Option<f64>, cx: &mut TimingContext) {
        if !self.playback_mut().apply(PhaseEvent::Stop) {
            return;
        }
        if let Some(progress) = at {
            cx.settle(|cx| self.place(unit(progress), cx));
        }
        for child in self.children_mut() {
            child.halt(None, cx);
        }
        let completed = self.playback().at_terminal();
        self.playback_mut().finish(completed);
    }
}

/// A child finished without completing: stop the siblings in place unless the
/// node opted out, then report the failure
pub(crate) fn interrupt(
    playback: &mut Playback,
    children: &mut [Animation],
    cx: &mut TimingContext,
) -> Step {
    tracing::debug!(
        progress = playback.progress,
        stop_children = playback.complete_policy(),
        "child interrupted"
    );
    if playback.complete_policy() && playback.apply(PhaseEvent::Stop) {
        for child in children.iter_mut() {
            child.halt(None, cx);
        }
    }
    playback.finish(false);
    Step::Finished {
        completed: false,
        leftover: 0.0,
    }
}

fn unit(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let playback = self.playback();
        f.debug_struct("Animation")
            .field("kind", &self.kind())
            .field("phase", &playback.phase)
            .field("progress", &playback.progress)
            .field("duration", &playback.duration)
            .field("children", &self.children())
            .finish()
    }
}
