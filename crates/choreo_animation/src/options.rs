//! Animation options
//!
//! Partially specified overrides that travel from the caller down the tree.
//! Every level fills in what its parent left unset.

use crate::curve::Curve;
use crate::duration::Duration;

/// Partial override record for a play request or a node
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationOptions {
    /// Overall duration
    pub duration: Option<Duration>,
    /// Easing applied over the node's whole timeline
    pub curve: Option<Curve>,
    /// Whether an interrupted node forces its children to a resting position
    pub complete: Option<bool>,
    /// Play towards the start instead of the end
    pub is_reversed: Option<bool>,
}

impl AnimationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge field by field, preferring `self` and falling back to `other`
    pub fn or(self, other: AnimationOptions) -> AnimationOptions {
        AnimationOptions {
            duration: self.duration.or(other.duration),
            curve: self.curve.or(other.curve),
            complete: self.complete.or(other.complete),
            is_reversed: self.is_reversed.or(other.is_reversed),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == AnimationOptions::default()
    }

    pub fn reversed(&self) -> bool {
        self.is_reversed.unwrap_or(false)
    }

    /// Builder: set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Builder: absolute duration in seconds
    pub fn seconds(self, seconds: f64) -> Self {
        self.with_duration(Duration::seconds(seconds))
    }

    /// Builder: duration relative to the parent
    pub fn relative(self, fraction: f64) -> Self {
        self.with_duration(Duration::relative(fraction))
    }

    /// Builder: set the curve
    pub fn curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }

    /// Builder: set the interruption policy
    pub fn complete(mut self, complete: bool) -> Self {
        self.complete = Some(complete);
        self
    }

    /// Builder: set the playback direction
    pub fn reverse(mut self, reversed: bool) -> Self {
        self.is_reversed = Some(reversed);
        self
    }
}
