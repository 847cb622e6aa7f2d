//! Playback lifecycle
//!
//! Every node runs the same small state machine. Completion callbacks fire
//! only on a legal `Finish` transition, so a node that was already stopped or
//! completed cannot report completion a second time.

use std::fmt;

/// Lifecycle phase of a node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not running, position may be anywhere
    #[default]
    Idle,
    Playing,
    Paused,
    /// Halting, completion about to be reported
    Stopping,
    /// Completion reported
    Completed,
}

/// Input of the lifecycle state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    Play,
    Pause,
    Stop,
    Finish,
    Seek,
}

impl Phase {
    /// Next phase for `event`, `None` when the transition is illegal
    pub fn transition(self, event: PhaseEvent) -> Option<Phase> {
        use Phase::*;
        use PhaseEvent as E;

        match (self, event) {
            (Idle | Paused | Completed | Playing, E::Play) => Some(Playing),
            (Playing, E::Pause) => Some(Paused),
            (Idle | Playing | Paused, E::Stop) => Some(Stopping),
            (Playing | Stopping, E::Finish) => Some(Completed),
            (Completed, E::Seek) => Some(Idle),
            (Playing, E::Seek) => Some(Paused),
            (Idle | Paused, E::Seek) => Some(self),
            _ => None,
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing)
    }

    /// Running or waiting to be resumed
    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Playing | Phase::Paused)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Idle => "idle",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Stopping => "stopping",
            Phase::Completed => "completed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_pause_finish() {
        let phase = Phase::Idle;
        let phase = phase.transition(PhaseEvent::Play).unwrap();
        assert_eq!(phase, Phase::Playing);
        let phase = phase.transition(PhaseEvent::Pause).unwrap();
        assert_eq!(phase, Phase::Paused);
        assert_eq!(phase.transition(PhaseEvent::Finish), None);
        let phase = phase.transition(PhaseEvent::Play).unwrap();
        assert_eq!(phase.transition(PhaseEvent::Finish), Some(Phase::Completed));
    }

    #[test]
    fn test_finish_only_once() {
        let completed = Phase::Completed;
        assert_eq!(completed.transition(PhaseEvent::Finish), None);
        assert_eq!(completed.transition(PhaseEvent::Stop), None);
        assert_eq!(completed.transition(PhaseEvent::Pause), None);
    }

    #[test]
    fn test_stop_then_finish() {
        for phase in [Phase::Idle, Phase::Playing, Phase::Paused] {
            let stopping = phase.transition(PhaseEvent::Stop).unwrap();
            assert_eq!(stopping, Phase::Stopping);
            assert_eq!(stopping.transition(PhaseEvent::Stop), None);
            assert_eq!(stopping.transition(PhaseEvent::Play), None);
            assert_eq!(stopping.transition(PhaseEvent::Finish), Some(Phase::Completed));
        }
    }

    #[test]
    fn test_seek_never_resumes() {
        assert_eq!(Phase::Playing.transition(PhaseEvent::Seek), Some(Phase::Paused));
        assert_eq!(Phase::Paused.transition(PhaseEvent::Seek), Some(Phase::Paused));
        assert_eq!(Phase::Idle.transition(PhaseEvent::Seek), Some(Phase::Idle));
        assert_eq!(Phase::Completed.transition(PhaseEvent::Seek), Some(Phase::Idle));
        assert_eq!(Phase::Stopping.transition(PhaseEvent::Seek), None);
    }
}
