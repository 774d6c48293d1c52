//! The session turn-taking controller and its outward event surface.

pub mod controller;
pub mod events;
pub mod state;

pub use controller::{TurnController, UserIntent};
pub use events::{ChannelSink, PresentationSink, Severity, UiEvent};
pub use state::{ControllerState, InputMode, StatusKind};
