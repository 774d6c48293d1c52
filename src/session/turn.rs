use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    User,
    Assistant,
}

/// One rendered exchange unit in the transcript.
///
/// Produced once per exchange and handed to the presentation sink; only its
/// rendered projection survives, the controller does not keep turns around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: SpeakerRole,

    /// Text that was (or will be) spoken aloud
    pub spoken_text: Option<String>,

    /// Markdown code block accompanying the turn
    pub code_block: Option<String>,

    /// Whether this turn was submitted through the code input
    pub is_code: bool,
}

impl Turn {
    /// A user turn produced by transcribing recorded speech
    pub fn user_speech(text: impl Into<String>) -> Self {
        Self {
            speaker: SpeakerRole::User,
            spoken_text: Some(text.into()),
            code_block: None,
            is_code: false,
        }
    }

    /// A user turn submitted through the code input
    pub fn user_code(code: impl Into<String>) -> Self {
        Self {
            speaker: SpeakerRole::User,
            spoken_text: None,
            code_block: Some(code.into()),
            is_code: true,
        }
    }

    /// An assistant reply; either part may be absent
    pub fn assistant(spoken_text: Option<String>, code_block: Option<String>) -> Self {
        Self {
            speaker: SpeakerRole::Assistant,
            spoken_text,
            code_block,
            is_code: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_code_turn_is_flagged() {
        let turn = Turn::user_code("def f(): pass");
        assert_eq!(turn.speaker, SpeakerRole::User);
        assert!(turn.is_code);
        assert!(turn.spoken_text.is_none());
        assert_eq!(turn.code_block.as_deref(), Some("def f(): pass"));
    }

    #[test]
    fn assistant_turn_can_be_code_only() {
        let turn = Turn::assistant(None, Some("```rust\nfn main() {}\n```".into()));
        assert_eq!(turn.speaker, SpeakerRole::Assistant);
        assert!(turn.spoken_text.is_none());
        assert!(!turn.is_code);
    }
}
