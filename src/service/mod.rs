//! Remote Turn Service boundary.
//!
//! The backend exposes five independent request/response operations; each is
//! fallible and the controller never issues two of them concurrently for one
//! session. Transcription, language-model and speech-synthesis internals
//! live entirely behind this boundary.

pub mod http;
pub mod types;

use crate::audio::AudioClip;
use crate::error::ClientResult;
use crate::session::{Profile, SessionId};
use async_trait::async_trait;

pub use http::HttpTurnService;
pub use types::{SessionStart, TurnReply};

#[async_trait]
pub trait TurnService: Send + Sync {
    /// Open a new interview for the given profile and stack
    async fn start_session(&self, profile: Profile, stack: &str) -> ClientResult<SessionStart>;

    /// Transcribe a recorded clip; an empty string means no speech detected
    async fn transcribe(&self, session: &SessionId, clip: AudioClip) -> ClientResult<String>;

    /// Send one user turn and receive the assistant's reply
    async fn advance_turn(
        &self,
        session: &SessionId,
        text: &str,
        is_code: bool,
    ) -> ClientResult<TurnReply>;

    /// Convert reply text into a playable audio clip
    async fn synthesize_speech(&self, session: &SessionId, text: &str) -> ClientResult<AudioClip>;

    /// Produce the final evaluation report (markdown)
    async fn evaluate(&self, session: &SessionId) -> ClientResult<String>;
}
