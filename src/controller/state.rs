/// The controller's single-flow machine state.
///
/// Exactly one value at any instant; it drives the status indicator and
/// gates which user intents are accepted. Initial state is `Idle` and there
/// is no terminal state: the machine loops until the session is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Recording,
    Transcribing,
    Thinking,
    Synthesizing,
    Speaking,
    Evaluating,
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState::Idle
    }
}

impl ControllerState {
    pub fn label(self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Recording => "recording",
            ControllerState::Transcribing => "transcribing",
            ControllerState::Thinking => "thinking",
            ControllerState::Synthesizing => "synthesizing",
            ControllerState::Speaking => "speaking",
            ControllerState::Evaluating => "evaluating",
        }
    }

    /// Whether a Remote Turn Service call may be outstanding in this state.
    /// Used to serialize evaluation against the main turn cycle.
    pub fn has_outstanding_call(self) -> bool {
        matches!(
            self,
            ControllerState::Transcribing
                | ControllerState::Thinking
                | ControllerState::Synthesizing
                | ControllerState::Evaluating
        )
    }

    /// Outward status vocabulary for the indicator badge
    pub fn status(self, session_active: bool) -> StatusKind {
        match self {
            ControllerState::Idle => {
                if session_active {
                    StatusKind::Active
                } else {
                    StatusKind::Ready
                }
            }
            ControllerState::Recording => StatusKind::Recording,
            ControllerState::Transcribing
            | ControllerState::Thinking
            | ControllerState::Synthesizing
            | ControllerState::Evaluating => StatusKind::Processing,
            ControllerState::Speaking => StatusKind::Speaking,
        }
    }
}

/// Status vocabulary shown on the user-facing indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Ready,
    Active,
    Recording,
    Processing,
    Speaking,
    Error,
}

impl StatusKind {
    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Ready => "ready",
            StatusKind::Active => "active",
            StatusKind::Recording => "recording",
            StatusKind::Processing => "processing",
            StatusKind::Speaking => "speaking",
            StatusKind::Error => "error",
        }
    }
}

/// Input surface currently offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Voice,
    Code,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::Voice
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_status_depends_on_session_presence() {
        assert_eq!(ControllerState::Idle.status(false), StatusKind::Ready);
        assert_eq!(ControllerState::Idle.status(true), StatusKind::Active);
    }

    #[test]
    fn busy_states_map_to_processing() {
        for state in [
            ControllerState::Transcribing,
            ControllerState::Thinking,
            ControllerState::Synthesizing,
            ControllerState::Evaluating,
        ] {
            assert_eq!(state.status(true), StatusKind::Processing);
            assert!(state.has_outstanding_call());
        }
    }

    #[test]
    fn recording_and_speaking_have_no_outstanding_call() {
        assert!(!ControllerState::Recording.has_outstanding_call());
        assert!(!ControllerState::Speaking.has_outstanding_call());
        assert!(!ControllerState::Idle.has_outstanding_call());
        assert_eq!(ControllerState::Speaking.status(true), StatusKind::Speaking);
    }
}
