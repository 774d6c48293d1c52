pub mod capture;
pub mod microphone;
pub mod playback;

pub use capture::{AudioClip, CaptureUnit};
pub use microphone::MicrophoneCapture;
pub use playback::{RodioPlayer, SpeechPlayer};
