//! Parallel composition
//!
//! Children play together. Every child's progress range is anchored at 0
//! and spans its share of the parent's duration. Played backwards, shorter
//! children are delayed so that all of them reach the start together.

use crate::context::TimingContext;
use crate::curve::Curve;
use crate::duration::{parallel_layout, parallel_natural, parallel_ranges, Demand, EPSILON};
use crate::node::{interrupt, Animation, Slot};
use crate::playback::{Playback, Step};

/// Run state of one child during playback
#[derive(Clone, Copy, Debug, Default)]
struct Lane {
    /// Seconds before the child starts
    delay: f64,
    started: bool,
    done: bool,
}

pub struct Parallel {
    pub(crate) playback: Playback,
    pub(crate) children: Vec<Animation>,
    pub(crate) slots: Vec<Slot>,
    lanes: Vec<Lane>,
}

impl Parallel {
    pub(crate) fn new(children: Vec<Animation>) -> Self {
        Self {
            playback: Playback::new(Default::default()),
            children,
            slots: Vec::new(),
            lanes: Vec::new(),
        }
    }

    fn demands(&self) -> Vec<Demand> {
        self.children.iter().map(Animation::demand).collect()
    }

    pub(crate) fn natural_duration(&self) -> Option<f64> {
        parallel_natural(&self.demands())
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

        let durations = parallel_layout(duration, &self.demands());
        let ranges = parallel_ranges(duration, &durations);
        let curve = self.playback.curve;
        self.slots = durations
            .into_iter()
            .zip(ranges)
            .map(|(duration, range)| Slot {
                curve: cx.split(curve, range.clone()),
                range,
                duration,
            })
            .collect();

        let complete = self.playback.complete_option();
        for (child, slot) in self.children.iter_mut().zip(&self.slots) {
            child.resolve(slot.duration, slot.curve, complete, cx);
        }
        tracing::debug!(
            duration,
            children = self.children.len(),
            "resolved parallel schedule"
        );
    }

    pub(crate) fn place(&mut self, progress: f64, cx: &mut TimingContext) {
        self.playback.progress = progress;
        self.lanes.clear();
        for (child, slot) in self.children.iter_mut().zip(&self.slots) {
            let (lower, upper) = (*slot.range.start(), *slot.range.end());
            if upper <= progress {
                child.seek(1.0, cx);
            } else if lower >= progress {
                child.seek(0.0, cx);
            } else {
                child.seek(progress / upper, cx);
            }
        }
    }

    pub(crate) fn start(&mut self) {
        let reversed = self.playback.reversed;
        let progress = self.playback.progress;
        let duration = self.playback.duration;

        self.lanes = self
            .children
            .iter()
            .zip(&self.slots)
            .map(|(child, slot)| {
                if reversed {
                    Lane {
                        delay: ((progress - slot.range.end()) * duration).max(0.0),
                        started: false,
                        done: child.progress() <= EPSILON,
                    }
                } else {
                    Lane {
                        delay: 0.0,
                        started: false,
                        done: child.progress() >= 1.0 - EPSILON,
                    }
                }
            })
            .collect();

        for (child, lane) in self.children.iter_mut().zip(&mut self.lanes) {
            if !lane.done && lane.delay <= 0.0 {
                lane.started = true;
                child.start(reversed);
            }
        }
    }

    pub(crate) fn advance(&mut self, dt: f64, cx: &mut TimingContext) -> Step {
        let reversed = self.playback.reversed;
        let remaining = self.playback.remaining();
        let mut interrupted = false;

        for (child, lane) in self.children.iter_mut().zip(&mut self.lanes) {
            if lane.done {
                continue;
            }
            let mut local = dt;
            if !lane.started {
                if lane.delay > local {
                    lane.delay -= local;
                    continue;
                }
                local -= lane.delay;
                lane.delay = 0.0;
                lane.started = true;
                child.start(reversed);
            }
            if let Step::Finished { completed, .. } = child.advance(local, cx) {
                lane.done = true;
                if !completed {
                    interrupted = true;
                    break;
                }
            }
        }

        self.playback.step(dt);
        if interrupted {
            return interrupt(&mut self.playback, &mut self.children, cx);
        }

        let all_done = self.lanes.iter().all(|lane| lane.done);
        if all_done && dt + EPSILON >= remaining {
            self.playback.progress = self.playback.terminal();
            self.playback.finish(true);
            return Step::Finished {
                completed: true,
                leftover: (dt - remaining).max(0.0),
            };
        }
        if all_done {
            tracing::trace!(remaining = remaining - dt, "parallel children done, holding");
        }
        Step::Running
    }
}
