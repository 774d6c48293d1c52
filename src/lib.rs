pub mod audio;
pub mod config;
pub mod controller;
pub mod error;
pub mod service;
pub mod session;

pub use audio::{AudioClip, CaptureUnit, MicrophoneCapture, RodioPlayer, SpeechPlayer};
pub use config::Config;
pub use controller::{
    ChannelSink, ControllerState, InputMode, PresentationSink, Severity, StatusKind,
    TurnController, UiEvent, UserIntent,
};
pub use error::{ClientError, ClientResult};
pub use service::{HttpTurnService, SessionStart, TurnReply, TurnService};
pub use session::{Profile, Session, SessionId, SpeakerRole, Turn};
