//! Timing context threaded through schedule resolution and playback

use std::ops::RangeInclusive;

use crate::cache::CurveCache;
use crate::config::EngineConfig;
use crate::curve::Curve;

/// Configuration and curve cache owned by a timeline
#[derive(Debug)]
pub struct TimingContext {
    config: EngineConfig,
    cache: CurveCache,
    /// Set while a stopping node positions its subtree
    settling: bool,
}

impl TimingContext {
    pub fn new(config: EngineConfig) -> Self {
        let cache = CurveCache::new(config.curve_cache_capacity, config.split_step);
        Self {
            config,
            cache,
            settling: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &CurveCache {
        &self.cache
    }

    pub(crate) fn is_settling(&self) -> bool {
        self.settling
    }

    /// Run `f` with finished nodes pinned to `Completed`, so placing a
    /// stopping subtree never re-arms them
    pub(crate) fn settle<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let outer = std::mem::replace(&mut self.settling, true);
        let result = f(self);
        self.settling = outer;
        result
    }

    /// The piece of `curve` covering `range`, renormalized
    pub(crate) fn split(
        &mut self,
        curve: Option<Curve>,
        range: RangeInclusive<f64>,
    ) -> Option<Curve> {
        let curve = curve?;
        if *range.start() <= 0.0 && *range.end() >= 1.0 {
            return Some(curve);
        }
        Some(self.cache.split(&curve, range).curve)
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
