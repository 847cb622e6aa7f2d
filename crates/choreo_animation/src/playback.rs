//! Per-node playback state
//!
//! Every node of an animation tree carries a [`Playback`]: its lifecycle
//! phase, linear progress, direction, declared options, resolved schedule
//! values and completion callbacks.

use smallvec::SmallVec;

use crate::curve::Curve;
use crate::duration::EPSILON;
use crate::options::AnimationOptions;
use crate::phase::{Phase, PhaseEvent};

/// Completion callback, receives whether the node reached its end normally
pub type Completion = Box<dyn FnMut(bool)>;

/// Outcome of advancing a node by some amount of time
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Step {
    Running,
    Finished {
        completed: bool,
        /// Time left over after the node reached its end
        leftover: f64,
    },
}

pub(crate) struct Playback {
    pub(crate) phase: Phase,
    /// Linear time progress in `[0, 1]`
    pub(crate) progress: f64,
    pub(crate) reversed: bool,
    /// Options set on the node itself
    pub(crate) declared: AnimationOptions,
    /// Options of the play request, only set on a timeline's root
    pub(crate) overrides: AnimationOptions,
    pub(crate) inherited_complete: Option<bool>,
    /// Resolved duration in seconds
    pub(crate) duration: f64,
    /// Effective curve after composing the inherited slice with our own
    pub(crate) curve: Option<Curve>,
    callbacks: SmallVec<[Completion; 1]>,
}

impl Playback {
    pub(crate) fn new(declared: AnimationOptions) -> Self {
        Self {
            phase: Phase::Idle,
            progress: 0.0,
            reversed: false,
            declared,
            overrides: AnimationOptions::default(),
            inherited_complete: None,
            duration: 0.0,
            curve: None,
            callbacks: SmallVec::new(),
        }
    }

    /// Play request options take precedence over declared ones
    pub(crate) fn options(&self) -> AnimationOptions {
        self.overrides.or(self.declared)
    }

    /// Apply a lifecycle event, returns false when it was illegal and ignored
    pub(crate) fn apply(&mut self, event: PhaseEvent) -> bool {
        match self.phase.transition(event) {
            Some(next) => {
                self.phase = next;
                true
            }
            None => {
                tracing::trace!(phase = ?self.phase, ?event, "ignored illegal transition");
                false
            }
        }
    }

    /// Report completion, exactly once per run
    pub(crate) fn finish(&mut self, completed: bool) -> bool {
        if !self.apply(PhaseEvent::Finish) {
            return false;
        }
        for callback in self.callbacks.iter_mut() {
            callback(completed);
        }
        true
    }

    pub(crate) fn add_completion(&mut self, callback: Completion) {
        self.callbacks.push(callback);
    }

    /// Store the schedule handed down by the parent
    pub(crate) fn resolve(
        &mut self,
        duration: f64,
        inherited_curve: Option<Curve>,
        inherited_complete: Option<bool>,
        intrinsic_curve: Option<Curve>,
    ) {
        self.duration = duration;
        self.inherited_complete = inherited_complete;
        self.curve = Curve::compose(inherited_curve, self.options().curve.or(intrinsic_curve));
    }

    pub(crate) fn complete_option(&self) -> Option<bool> {
        self.options().complete.or(self.inherited_complete)
    }

    /// Whether an interruption stops the children in place
    pub(crate) fn complete_policy(&self) -> bool {
        self.complete_option() != Some(false)
    }

    /// Progress reached at the end of the current direction
    pub(crate) fn terminal(&self) -> f64 {
        if self.reversed {
            0.0
        } else {
            1.0
        }
    }

    pub(crate) fn at_terminal(&self) -> bool {
        if self.reversed {
            self.progress <= EPSILON
        } else {
            self.progress >= 1.0 - EPSILON
        }
    }

    /// Seconds left before the end of the current direction
    pub(crate) fn remaining(&self) -> f64 {
        let left = if self.reversed {
            self.progress
        } else {
            1.0 - self.progress
        };
        left.max(0.0) * self.duration
    }

    /// Move progress by `dt` seconds in the current direction
    pub(crate) fn step(&mut self, dt: f64) {
        if self.duration <= EPSILON {
            self.progress = self.terminal();
            return;
        }
        let delta = dt / self.duration;
        let next = if self.reversed {
            self.progress - delta
        } else {
            self.progress + delta
        };
        self.progress = next.clamp(0.0, 1.0);
    }

    /// Eased progress as seen through the effective curve
    pub(crate) fn eased(&self, progress: f64) -> f64 {
        self.curve.map_or(progress, |curve| curve.evaluate(progress))
    }
}
