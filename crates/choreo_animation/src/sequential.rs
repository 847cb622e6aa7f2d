//! Sequential composition
//!
//! Children play end to end. Each child owns a contiguous slice of the
//! parent's progress proportional to its duration, and the slice of the
//! parent's curve that falls inside it.

use crate::context::TimingContext;
use crate::curve::Curve;
use crate::duration::{
    sequential_layout, sequential_natural, sequential_ranges, Demand, EPSILON,
};
use crate::node::{interrupt, Animation, Slot};
use crate::playback::{Playback, Step};

pub struct Sequential {
    pub(crate) playback: Playback,
    pub(crate) children: Vec<Animation>,
    pub(crate) slots: Vec<Slot>,
    /// Child currently driven by `advance`
    active: Option<usize>,
}

impl Sequential {
    pub(crate) fn new(children: Vec<Animation>) -> Self {
        Self {
            playback: Playback::new(Default::default()),
            children,
            slots: Vec::new(),
            active: None,
        }
    }

    fn demands(&self) -> Vec<Demand> {
        self.children.iter().map(Animation::demand).collect()
    }

    pub(crate) fn natural_duration(&self) -> Option<f64> {
        sequential_natural(&self.demands())
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

        let durations = sequential_layout(duration, &self.demands());
        let ranges = sequential_ranges(&durations);
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
            "resolved sequential schedule"
        );
    }

    /// Index of the child whose range contains `progress`, interior ties go to the
    /// earlier child
    fn locate(&self, progress: f64) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        let index = self
            .slots
            .iter()
            .position(|slot| progress <= *slot.range.end())
            .unwrap_or(self.slots.len() - 1);
        Some(index)
    }

    pub(crate) fn place(&mut self, progress: f64, cx: &mut TimingContext) {
        self.playback.progress = progress;
        self.active = None;
        if self.slots.len() != self.children.len() {
            return;
        }
        if progress >= 1.0 {
            // The end settles every child, trailing zero-width ones included
            for child in &mut self.children {
                child.seek(1.0, cx);
            }
            return;
        }
        let Some(index) = self.locate(progress) else {
            return;
        };

        for child in &mut self.children[..index] {
            child.seek(1.0, cx);
        }
        // Later children reset back to front so the nearest one settles last
        for child in self.children[index + 1..].iter_mut().rev() {
            child.seek(0.0, cx);
        }

        let local = local_progress(&self.slots[index], progress);
        self.children[index].seek(local, cx);
    }

    pub(crate) fn start(&mut self) {
        let reversed = self.playback.reversed;
        self.active = if reversed {
            self.children
                .iter()
                .rposition(|child| child.progress() > EPSILON)
        } else {
            self.children
                .iter()
                .position(|child| child.progress() < 1.0 - EPSILON)
        };
        if let Some(index) = self.active {
            self.children[index].start(reversed);
        }
    }

    fn next(&self, index: usize) -> Option<usize> {
        if self.playback.reversed {
            index.checked_sub(1)
        } else {
            Some(index + 1).filter(|next| *next < self.children.len())
        }
    }

    pub(crate) fn advance(&mut self, dt: f64, cx: &mut TimingContext) -> Step {
        let reversed = self.playback.reversed;
        let mut dt = dt;

        loop {
            let Some(index) = self.active else {
                self.playback.progress = self.playback.terminal();
                self.playback.finish(true);
                return Step::Finished {
                    completed: true,
                    leftover: dt,
                };
            };

            match self.children[index].advance(dt, cx) {
                Step::Running => {
                    self.sync_progress();
                    return Step::Running;
                }
                Step::Finished {
                    completed: false, ..
                } => {
                    self.sync_progress();
                    self.active = None;
                    return interrupt(&mut self.playback, &mut self.children, cx);
                }
                Step::Finished {
                    completed: true,
                    leftover,
                } => {
                    tracing::trace!(index, leftover, "sequential child finished");
                    dt = leftover;
                    self.active = self.next(index);
                    if let Some(next) = self.active {
                        self.children[next].start(reversed);
                    }
                }
            }
        }
    }

    fn sync_progress(&mut self) {
        if let Some(index) = self.active {
            let range = &self.slots[index].range;
            let (lo, hi) = (*range.start(), *range.end());
            self.playback.progress = lo + (hi - lo) * self.children[index].progress();
        }
    }
}

fn local_progress(slot: &Slot, progress: f64) -> f64 {
    let (lo, hi) = (*slot.range.start(), *slot.range.end());
    let width = hi - lo;
    if width <= EPSILON {
        return if progress > lo { 1.0 } else { 0.0 };
    }
    ((progress - lo) / width).clamp(0.0, 1.0)
}
