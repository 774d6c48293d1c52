//! Interview session identity and transcript value types
//!
//! This module provides the `Session` value that binds all remote calls for
//! one interview, plus the transient `Turn` produced once per exchange.

mod session;
mod turn;

pub use session::{Profile, Session, SessionId};
pub use turn::{SpeakerRole, Turn};
