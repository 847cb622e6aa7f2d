//! Engine configuration

use crate::curve::DEFAULT_SPLIT_STEP;
use crate::error::ConfigError;

/// Tunables shared by every node of a timeline
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Duration in seconds used for a root whose duration cannot be inferred
    pub default_duration: f64,
    /// Step of the coarse parametric search used when splitting curves
    pub split_step: f64,
    /// Number of curve slices kept in the per-timeline cache
    pub curve_cache_capacity: usize,
    /// Frame rate used by [`AnimationScheduler::step`](crate::AnimationScheduler::step)
    pub frame_rate: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_duration: 0.25,
            split_step: DEFAULT_SPLIT_STEP,
            curve_cache_capacity: 64,
            frame_rate: 60,
        }
    }
}

impl EngineConfig {
    /// Builder: set the fallback root duration (seconds)
    pub fn with_default_duration(mut self, seconds: f64) -> Self {
        self.default_duration = seconds;
        self
    }

    /// Builder: set the curve split search step
    pub fn with_split_step(mut self, step: f64) -> Self {
        self.split_step = step;
        self
    }

    /// Builder: set the curve cache capacity
    pub fn with_curve_cache_capacity(mut self, capacity: usize) -> Self {
        self.curve_cache_capacity = capacity;
        self
    }

    /// Builder: set the frame rate
    pub fn with_frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps;
        self
    }

    /// Seconds between two frames at the configured frame rate
    pub fn frame_interval(&self) -> f64 {
        1.0 / f64::from(self.frame_rate.max(1))
    }

    /// Check every field for a usable value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_duration.is_finite() || self.default_duration < 0.0 {
            return Err(ConfigError::DefaultDuration(self.default_duration));
        }
        if !(self.split_step > 0.0 && self.split_step <= 0.5) {
            return Err(ConfigError::SplitStep(self.split_step));
        }
        if self.curve_cache_capacity == 0 {
            return Err(ConfigError::CacheCapacity);
        }
        if self.frame_rate == 0 {
            return Err(ConfigError::FrameRate);
        }
        Ok(())
    }
}
