//! Leaf animations
//!
//! A leaf is the opaque unit at the bottom of a tree. The engine only tells
//! it how far along it is; what it does with that (move a value, drive a
//! renderer) is up to the implementation.

use crate::context::TimingContext;
use crate::curve::Curve;
use crate::duration::{Duration, EPSILON};
use crate::playback::{Playback, Step};
use crate::tween::Tweenable;

/// An opaque animation driven by the engine
pub trait Leaf {
    /// Intrinsic duration, used when the node does not declare one
    fn duration(&self) -> Option<Duration> {
        None
    }

    /// Intrinsic curve, composed with the slice inherited from the parent
    fn curve(&self) -> Option<Curve> {
        None
    }

    /// Receive eased progress in `[0, 1]`
    fn update(&mut self, progress: f64);

    /// Report that the leaf was interrupted and cannot reach its end
    fn is_interrupted(&self) -> bool {
        false
    }
}

/// Interpolates a value and hands it to a sink on every update
pub struct Tween<T, F> {
    from: T,
    to: T,
    apply: F,
}

impl<T: Tweenable, F: FnMut(T)> Tween<T, F> {
    pub fn new(from: T, to: T, apply: F) -> Self {
        Self { from, to, apply }
    }
}

impl<T: Tweenable, F: FnMut(T)> Leaf for Tween<T, F> {
    fn update(&mut self, progress: f64) {
        (self.apply)(self.from.lerp(&self.to, progress));
    }
}

/// A pure interval, takes whatever time it is given unless sized
#[derive(Clone, Copy, Debug, Default)]
pub struct Wait {
    duration: Option<Duration>,
}

impl Wait {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seconds(seconds: f64) -> Self {
        Self {
            duration: Some(Duration::seconds(seconds)),
        }
    }
}

impl Leaf for Wait {
    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn update(&mut self, _progress: f64) {}
}

/// Zero-duration action, runs whenever the timeline passes it forward
pub struct Instant<F> {
    action: F,
    armed: bool,
}

impl<F: FnMut()> Instant<F> {
    pub fn new(action: F) -> Self {
        Self {
            action,
            armed: true,
        }
    }
}

impl<F: FnMut()> Leaf for Instant<F> {
    fn duration(&self) -> Option<Duration> {
        Some(Duration::Absolute(0.0))
    }

    fn update(&mut self, progress: f64) {
        if progress >= 1.0 {
            if self.armed {
                self.armed = false;
                (self.action)();
            }
        } else {
            self.armed = true;
        }
    }
}

// ============================================================================
// Tree node
// ============================================================================

pub struct LeafNode {
    pub(crate) playback: Playback,
    leaf: Box<dyn Leaf>,
}

impl LeafNode {
    pub(crate) fn new(leaf: Box<dyn Leaf>) -> Self {
        Self {
            playback: Playback::new(Default::default()),
            leaf,
        }
    }

    pub(crate) fn intrinsic_duration(&self) -> Option<Duration> {
        self.leaf.duration()
    }

    pub(crate) fn resolve(
        &mut self,
        duration: f64,
        inherited_curve: Option<Curve>,
        inherited_complete: Option<bool>,
    ) {
        let intrinsic = self.leaf.curve();
        self.playback
            .resolve(duration, inherited_curve, inherited_complete, intrinsic);
    }

    pub(crate) fn place(&mut self, progress: f64) {
        self.playback.progress = progress;
        self.render();
    }

    pub(crate) fn advance(&mut self, dt: f64, _cx: &mut TimingContext) -> Step {
        let remaining = self.playback.remaining();
        if dt + EPSILON >= remaining {
            self.playback.progress = self.playback.terminal();
            self.render();
            if self.leaf.is_interrupted() {
                return self.interrupted();
            }
            self.playback.finish(true);
            return Step::Finished {
                completed: true,
                leftover: (dt - remaining).max(0.0),
            };
        }

        self.playback.step(dt);
        self.render();
        if self.leaf.is_interrupted() {
            return self.interrupted();
        }
        Step::Running
    }

    fn interrupted(&mut self) -> Step {
        tracing::debug!(progress = self.playback.progress, "leaf interrupted");
        self.playback.finish(false);
        Step::Finished {
            completed: false,
            leftover: 0.0,
        }
    }

    fn render(&mut self) {
        let eased = self.playback.eased(self.playback.progress);
        self.leaf.update(eased);
    }
}
