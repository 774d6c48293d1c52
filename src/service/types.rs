//! Wire types for the interview backend.
//!
//! The backend speaks Portuguese on the wire: `falar` carries the text meant
//! to be spoken aloud and `codigo` an optional markdown code block. Domain
//! types normalize those into `TurnReply`, collapsing blank strings to
//! `None` so a code-only reply is unambiguous.

use crate::session::{Profile, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct StartRequest<'a> {
    pub profile: Profile,
    pub stack: &'a str,
}

#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub session_id: &'a SessionId,
    pub text: &'a str,
    pub is_code: bool,
}

#[derive(Debug, Serialize)]
pub struct SynthesizeRequest<'a> {
    pub session_id: &'a SessionId,
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EvaluateRequest<'a> {
    pub session_id: &'a SessionId,
}

#[derive(Debug, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    #[serde(default)]
    pub falar: Option<String>,
    #[serde(default)]
    pub codigo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TranscribeResponse {
    #[serde(default)]
    pub transcription: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub falar: Option<String>,
    #[serde(default)]
    pub codigo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateResponse {
    pub evaluation: String,
}

/// One assistant reply as the controller sees it
#[derive(Debug, Clone)]
pub struct TurnReply {
    /// Text to speak aloud; `None` for a code-only reply
    pub spoken_text: Option<String>,

    /// Markdown code block accompanying the reply
    pub code_block: Option<String>,
}

impl TurnReply {
    pub fn from_wire(falar: Option<String>, codigo: Option<String>) -> Self {
        let clean = |field: Option<String>| {
            field
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        Self {
            spoken_text: clean(falar),
            code_block: clean(codigo),
        }
    }
}

impl From<MessageResponse> for TurnReply {
    fn from(res: MessageResponse) -> Self {
        TurnReply::from_wire(res.falar, res.codigo)
    }
}

/// Result of a successful start call: the new session id plus the opening reply
#[derive(Debug)]
pub struct SessionStart {
    pub session_id: SessionId,
    pub reply: TurnReply,
}

impl From<StartResponse> for SessionStart {
    fn from(res: StartResponse) -> Self {
        Self {
            session_id: SessionId::new(res.session_id),
            reply: TurnReply::from_wire(res.falar, res.codigo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_wire_fields_collapse_to_none() {
        let reply = TurnReply::from_wire(Some("   ".into()), Some("".into()));
        assert!(reply.spoken_text.is_none());
        assert!(reply.code_block.is_none());
    }

    #[test]
    fn wire_fields_are_trimmed() {
        let reply = TurnReply::from_wire(Some("  Olá  ".into()), None);
        assert_eq!(reply.spoken_text.as_deref(), Some("Olá"));
    }

    #[test]
    fn start_response_deserializes_without_optional_fields() {
        let res: StartResponse = serde_json::from_str(r#"{"session_id":"abc"}"#).unwrap();
        let start: SessionStart = res.into();
        assert_eq!(start.session_id.as_str(), "abc");
        assert!(start.reply.spoken_text.is_none());
    }

    #[test]
    fn message_request_serializes_wire_names() {
        let id = SessionId::new("abc");
        let req = MessageRequest {
            session_id: &id,
            text: "def f(): pass",
            is_code: true,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["is_code"], true);
    }
}
