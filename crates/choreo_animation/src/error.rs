//! Error types
//!
//! The timing maths itself is total; only parsing and configuration can fail.

use thiserror::Error;

/// Errors produced when parsing a [`Curve`](crate::Curve) from text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveParseError {
    #[error("unknown curve: {0:?}")]
    UnknownName(String),

    #[error("cubic-bezier() expects 4 numbers, got {0}")]
    Arity(usize),

    #[error("invalid number in cubic-bezier(): {0:?}")]
    Number(String),

    #[error("control point x must lie in [0, 1], got {0}")]
    OutOfRange(f64),
}

/// Errors produced by [`EngineConfig::validate`](crate::EngineConfig::validate)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("default duration must be finite and non-negative, got {0}")]
    DefaultDuration(f64),

    #[error("curve split step must lie in (0, 0.5], got {0}")]
    SplitStep(f64),

    #[error("curve cache capacity must be at least 1")]
    CacheCapacity,

    #[error("frame rate must be at least 1")]
    FrameRate,
}
