//! Choreo Animation Engine
//!
//! Timeline composition and timing resolution for nested animations.
//!
//! # Features
//!
//! - **Composition**: sequential, parallel, repeat and autoreverse nodes over opaque leaves
//! - **Relative Durations**: children sized as a share of a parent solved from its absolute children
//! - **Curve Splitting**: a parent's bezier easing distributed across its children's slots
//! - **Scrubbing**: jump to any progress and resume, pause or reverse from there
//! - **Single Completion**: an explicit lifecycle machine reports each run's end exactly once

pub mod autoreverse;
pub mod cache;
pub mod config;
pub mod context;
pub mod curve;
pub mod duration;
pub mod error;
pub mod leaf;
pub mod node;
pub mod options;
pub mod parallel;
pub mod phase;
pub mod playback;
pub mod position;
pub mod repeat;
pub mod scheduler;
pub mod sequential;
pub mod timeline;
pub mod tween;

pub use autoreverse::{Autoreverse, Half};
pub use cache::CurveCache;
pub use config::EngineConfig;
pub use context::TimingContext;
pub use curve::{Curve, CurveSlice, DEFAULT_SPLIT_STEP};
pub use duration::{Demand, Duration};
pub use error::{ConfigError, CurveParseError};
pub use leaf::{Instant, Leaf, LeafNode, Tween, Wait};
pub use node::{Animation, AnimationKind, Slot};
pub use options::AnimationOptions;
pub use parallel::Parallel;
pub use phase::{Phase, PhaseEvent};
pub use playback::Completion;
pub use position::Position;
pub use repeat::{Repeat, RepeatCount};
pub use scheduler::{AnimationScheduler, TimelineId};
pub use sequential::Sequential;
pub use timeline::Timeline;
pub use tween::{lerp, Tweenable};
