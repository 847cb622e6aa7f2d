//! Animation position

use std::fmt;

/// How far an animation has advanced
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    #[default]
    Start,
    /// Progress strictly between 0 and 1
    Progress(f64),
    End,
}

impl Position {
    /// Normalize a raw progress value, `<= 0` is the start and `>= 1` the end
    pub fn from_progress(progress: f64) -> Self {
        if progress.is_nan() || progress <= 0.0 {
            Position::Start
        } else if progress >= 1.0 {
            Position::End
        } else {
            Position::Progress(progress)
        }
    }

    /// Progress in `[0, 1]`
    pub fn progress(&self) -> f64 {
        match *self {
            Position::Start => 0.0,
            Position::Progress(p) => p.clamp(0.0, 1.0),
            Position::End => 1.0,
        }
    }

    /// Position reached when playing in the opposite direction
    pub fn reversed(&self) -> Self {
        Position::from_progress(1.0 - self.progress())
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Position::Start | Position::End)
    }
}

impl From<f64> for Position {
    fn from(progress: f64) -> Self {
        Position::from_progress(progress)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Start => f.write_str("start"),
            Position::Progress(p) => write!(f, "{p:.4}"),
            Position::End => f.write_str("end"),
        }
    }
}
