//! Animation scheduler
//!
//! Holds every live timeline and advances the playing ones each frame.
//! Completion callbacks fire synchronously from [`AnimationScheduler::tick`].

use slotmap::{new_key_type, SlotMap};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::timeline::Timeline;

new_key_type! {
    pub struct TimelineId;
}

/// The animation scheduler that ticks all playing timelines
pub struct AnimationScheduler {
    timelines: SlotMap<TimelineId, Timeline>,
    last_frame: Option<Instant>,
    frame_interval: f64,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            timelines: SlotMap::with_key(),
            last_frame: None,
            frame_interval: config.frame_interval(),
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.frame_interval = 1.0 / f64::from(fps.max(1));
    }

    /// Seconds advanced by [`step`](Self::step)
    pub fn frame_interval(&self) -> f64 {
        self.frame_interval
    }

    pub fn add(&mut self, timeline: Timeline) -> TimelineId {
        self.timelines.insert(timeline)
    }

    pub fn get(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(id)
    }

    pub fn get_mut(&mut self, id: TimelineId) -> Option<&mut Timeline> {
        self.timelines.get_mut(id)
    }

    pub fn remove(&mut self, id: TimelineId) -> Option<Timeline> {
        self.timelines.remove(id)
    }

    /// Advance every playing timeline by `dt` seconds
    pub fn tick(&mut self, dt: f64) {
        for (_, timeline) in self.timelines.iter_mut() {
            timeline.tick(dt);
        }
    }

    /// Advance by one frame at the target frame rate
    pub fn step(&mut self) {
        self.tick(self.frame_interval);
    }

    /// Advance by the wall-clock time elapsed since the previous call
    pub fn tick_elapsed(&mut self) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map_or(0.0, |last| (now - last).as_secs_f64());
        self.last_frame = Some(now);
        self.tick(dt);
    }

    /// Check if any timeline is still playing
    pub fn has_active_animations(&self) -> bool {
        self.timelines
            .iter()
            .any(|(_, timeline)| timeline.phase().is_playing())
    }

    /// Drop every completed timeline, returns how many were removed
    pub fn remove_finished(&mut self) -> usize {
        let before = self.timelines.len();
        self.timelines
            .retain(|_, timeline| !timeline.phase().is_finished());
        let removed = before - self.timelines.len();
        if removed > 0 {
            tracing::trace!(removed, "removed finished timelines");
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimelineId, &Timeline)> {
        self.timelines.iter()
    }

    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
