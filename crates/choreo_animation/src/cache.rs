//! Curve slice cache
//!
//! Splitting a curve walks its parametric axis, so composites that re-split
//! the same curve (repeat cycles, autoreverse halves, re-resolved schedules)
//! go through a small bounded LRU owned by the timeline.

use std::fmt;
use std::num::NonZeroUsize;
use std::ops::RangeInclusive;

use lru::LruCache;

use crate::curve::{Curve, CurveSlice};

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct SliceKey {
    curve: [u64; 4],
    start: u64,
    end: u64,
}

impl SliceKey {
    fn new(curve: &Curve, range: &RangeInclusive<f64>) -> Self {
        Self {
            curve: [
                curve.x1.to_bits(),
                curve.y1.to_bits(),
                curve.x2.to_bits(),
                curve.y2.to_bits(),
            ],
            start: range.start().to_bits(),
            end: range.end().to_bits(),
        }
    }
}

/// Bounded cache of [`Curve::split`] results
pub struct CurveCache {
    slices: LruCache<SliceKey, CurveSlice>,
    step: f64,
    hits: u64,
    misses: u64,
}

impl CurveCache {
    /// Create a cache holding at most `capacity` slices (at least one)
    pub fn new(capacity: usize, step: f64) -> Self {
        Self {
            slices: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
            step,
            hits: 0,
            misses: 0,
        }
    }

    /// Split `curve` at `range`, reusing a cached slice when possible
    pub fn split(&mut self, curve: &Curve, range: RangeInclusive<f64>) -> CurveSlice {
        let key = SliceKey::new(curve, &range);
        if let Some(slice) = self.slices.get(&key) {
            self.hits += 1;
            return slice.clone();
        }

        self.misses += 1;
        tracing::trace!(
            %curve,
            start = *range.start(),
            end = *range.end(),
            "curve slice cache miss"
        );
        let slice = curve.split(range, self.step);
        self.slices.put(key, slice.clone());
        slice
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.slices.cap().get()
    }

    /// Drop every cached slice and reset the counters
    pub fn clear(&mut self) {
        self.slices.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

impl fmt::Debug for CurveCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveCache")
            .field("len", &self.slices.len())
            .field("capacity", &self.capacity())
            .field("step", &self.step)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish()
    }
}
