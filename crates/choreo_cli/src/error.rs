//! Scene description errors

use choreo_animation::CurveParseError;
use thiserror::Error;

/// A scene file that parses as TOML but does not describe a valid tree
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("invalid curve at {path}: {source}")]
    Curve {
        path: String,
        #[source]
        source: CurveParseError,
    },

    #[error("{0}: set either `duration` or `relative`, not both")]
    ConflictingDuration(String),

    #[error("{0}: set either `count` or `forever`, not both")]
    ConflictingCount(String),

    #[error("{path}: a {kind} node needs exactly one `child` table")]
    WrapperChild { path: String, kind: &'static str },

    #[error("{path}: a {kind} node takes `children`, not `child`")]
    GroupChild { path: String, kind: &'static str },

    #[error("{path}: a {kind} node cannot have children")]
    LeafChildren { path: String, kind: &'static str },
}
