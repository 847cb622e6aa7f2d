//! Forward-then-backward playback
//!
//! The first half of the parent's progress plays the child forward, the
//! second half plays it back: `[0, 0.5] -> 2k` and `[0.5, 1] -> 2 - 2k`.

use crate::context::TimingContext;
use crate::curve::Curve;
use crate::duration::Demand;
use crate::node::{interrupt, Animation};
use crate::playback::{Playback, Step};

/// Half of an autoreverse cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Half {
    Forward,
    Backward,
}

pub struct Autoreverse {
    pub(crate) playback: Playback,
    pub(crate) child: Box<Animation>,
    half: Half,
}

impl Autoreverse {
    pub(crate) fn new(child: Animation) -> Self {
        Self {
            playback: Playback::new(Default::default()),
            child: Box::new(child),
            half: Half::Forward,
        }
    }

    /// Half in progress
    pub fn half(&self) -> Half {
        self.half
    }

    pub(crate) fn natural_duration(&self) -> Option<f64> {
        match self.child.demand() {
            Demand::Fixed(seconds) => Some(seconds * 2.0),
            _ => None,
        }
    }

    pub(crate) fn resolve(
        &mut self,
        duration: f64,
        inherited_curve: Option<Curve>,
        inherited_complete: Option<bool>,
        cx: &mut TimingContext,
    ) {
        self.playback
            .resolve(duration, inherited_curve, inherited_complete, None);
        self.retarget(cx);
    }

    /// Hand the child half the duration and the curve of the current half.
    ///
    /// The backward half is traversed with the child's progress running from
    /// 1 to 0, so its slice is reflected.
    fn retarget(&mut self, cx: &mut TimingContext) {
        let curve = match self.half {
            Half::Forward => cx.split(self.playback.curve, 0.0..=0.5),
            Half::Backward => cx
                .split(self.playback.curve, 0.5..=1.0)
                .map(|curve| curve.reversed()),
        };
        let complete = self.playback.complete_option();
        self.child
            .resolve(self.playback.duration / 2.0, curve, complete, cx);
    }

    fn set_half(&mut self, half: Half, cx: &mut TimingContext) {
        if self.half != half {
            self.half = half;
            self.retarget(cx);
        }
    }

    /// Direction the child plays in during the current half
    fn child_reversed(&self) -> bool {
        (self.half == Half::Backward) != self.playback.reversed
    }

    pub(crate) fn place(&mut self, progress: f64, cx: &mut TimingContext) {
        self.playback.progress = progress;
        let (half, local) = if progress <= 0.5 {
            (Half::Forward, progress * 2.0)
        } else {
            (Half::Backward, 2.0 - progress * 2.0)
        };
        self.set_half(half, cx);
        self.child.seek(local, cx);
    }

    pub(crate) fn start(&mut self) {
        let reversed = self.child_reversed();
        self.child.start(reversed);
    }

    pub(crate) fn advance(&mut self, dt: f64, cx: &mut TimingContext) -> Step {
        let mut dt = dt;

        loop {
            match self.child.advance(dt, cx) {
                Step::Running => {
                    self.sync_progress();
                    return Step::Running;
                }
                Step::Finished {
                    completed: false, ..
                } => {
                    self.sync_progress();
                    let children = std::slice::from_mut(self.child.as_mut());
                    return interrupt(&mut self.playback, children, cx);
                }
                Step::Finished {
                    completed: true,
                    leftover,
                } => {
                    let turn = match (self.half, self.playback.reversed) {
                        (Half::Forward, false) => Some(Half::Backward),
                        (Half::Backward, true) => Some(Half::Forward),
                        _ => None,
                    };
                    let Some(half) = turn else {
                        self.playback.progress = self.playback.terminal();
                        self.playback.finish(true);
                        return Step::Finished {
                            completed: true,
                            leftover,
                        };
                    };

                    tracing::trace!(?half, leftover, "autoreverse turning");
                    self.set_half(half, cx);
                    let local = self.child.progress();
                    self.child.seek(local, cx);
                    let reversed = self.child_reversed();
                    self.child.start(reversed);
                    dt = leftover;
                }
            }
        }
    }

    fn sync_progress(&mut self) {
        let local = self.child.progress();
        self.playback.progress = match self.half {
            Half::Forward => local / 2.0,
            Half::Backward => 1.0 - local / 2.0,
        };
    }
}
