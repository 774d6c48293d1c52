use thiserror::Error;

/// Failures surfaced to the controller.
///
/// Remote and device failures are terminal for the action that triggered
/// them: the controller notifies the user and returns to idle, it never
/// retries on its own.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("microphone permission denied")]
    PermissionDenied,

    #[error("no capture device available")]
    DeviceUnavailable,

    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    #[error("audio stream error: {0}")]
    AudioStream(String),

    #[error("backend request failed: {0}")]
    Transport(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ClientResult<T> = Result<T, ClientError>;
