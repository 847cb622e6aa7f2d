//! Repetition
//!
//! Plays one child several times in a row. Global progress `k` maps to
//! cycle `floor(k * n)` and local progress `(k * n) mod 1`, except that the
//! very end maps to the end of the last cycle rather than a fresh start.

use crate::context::TimingContext;
use crate::curve::Curve;
use crate::duration::{Demand, EPSILON};
use crate::node::{interrupt, Animation};
use crate::playback::{Playback, Step};

/// How many times a [`Repeat`] plays its child
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepeatCount {
    Times(usize),
    /// Never completes until stopped; one cycle is scheduled
    Forever,
}

pub struct Repeat {
    pub(crate) playback: Playback,
    pub(crate) child: Box<Animation>,
    count: RepeatCount,
    cycle: usize,
}

impl Repeat {
    pub(crate) fn new(child: Animation, count: RepeatCount) -> Self {
        Self {
            playback: Playback::new(Default::default()),
            child: Box::new(child),
            count,
            cycle: 0,
        }
    }

    pub fn count(&self) -> RepeatCount {
        self.count
    }

    /// Zero-based index of the cycle in progress
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub(crate) fn natural_duration(&self) -> Option<f64> {
        match (self.child.demand(), self.count) {
            (Demand::Fixed(seconds), RepeatCount::Times(n)) => Some(seconds * n as f64),
            (Demand::Fixed(seconds), RepeatCount::Forever) => Some(seconds),
            _ => None,
        }
    }

    fn cycles(&self) -> usize {
        match self.count {
            RepeatCount::Times(n) => n.max(1),
            RepeatCount::Forever => 1,
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
        tracing::debug!(duration, count = ?self.count, "resolved repeat schedule");
    }

    /// Hand the child its cycle duration and the current cycle's curve slice
    fn retarget(&mut self, cx: &mut TimingContext) {
        let n = self.cycles();
        let lower = self.cycle as f64 / n as f64;
        let upper = (self.cycle + 1) as f64 / n as f64;
        let curve = cx.split(self.playback.curve, lower..=upper);
        let complete = self.playback.complete_option();
        self.child
            .resolve(self.playback.duration / n as f64, curve, complete, cx);
    }

    pub(crate) fn place(&mut self, progress: f64, cx: &mut TimingContext) {
        self.playback.progress = progress;
        let n = self.cycles();
        let (cycle, local) = if progress >= 1.0 {
            (n - 1, 1.0)
        } else {
            let scaled = progress * n as f64;
            let cycle = (scaled.floor() as usize).min(n - 1);
            (cycle, (scaled - cycle as f64).clamp(0.0, 1.0))
        };
        if cycle != self.cycle {
            self.cycle = cycle;
            self.retarget(cx);
        }
        self.child.seek(local, cx);
    }

    pub(crate) fn start(&mut self) {
        self.child.start(self.playback.reversed);
    }

    pub(crate) fn advance(&mut self, dt: f64, cx: &mut TimingContext) -> Step {
        let reversed = self.playback.reversed;
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
                    let next = match (self.count, reversed) {
                        (RepeatCount::Forever, _) => Some(self.cycle),
                        (RepeatCount::Times(n), false) => {
                            Some(self.cycle + 1).filter(|cycle| *cycle < n)
                        }
                        (RepeatCount::Times(_), true) => self.cycle.checked_sub(1),
                    };
                    let Some(next) = next else {
                        self.playback.progress = self.playback.terminal();
                        self.playback.finish(true);
                        return Step::Finished {
                            completed: true,
                            leftover,
                        };
                    };

                    tracing::trace!(cycle = next, leftover, "repeat cycle");
                    if next != self.cycle {
                        self.cycle = next;
                        self.retarget(cx);
                    }
                    self.child.seek(if reversed { 1.0 } else { 0.0 }, cx);
                    self.child.start(reversed);
                    dt = leftover;

                    // An empty endless cycle would spin forever within one tick
                    if self.count == RepeatCount::Forever
                        && self.child.resolved_duration() <= EPSILON
                    {
                        self.sync_progress();
                        return Step::Running;
                    }
                }
            }
        }
    }

    fn sync_progress(&mut self) {
        let n = self.cycles() as f64;
        let progress = (self.cycle as f64 + self.child.progress()) / n;
        self.playback.progress = progress.clamp(0.0, 1.0);
    }
}
