//! Outward event interface between the controller and the renderer.

use crate::controller::state::{ControllerState, StatusKind};
use crate::session::Turn;
use tokio::sync::mpsc;
use tracing::warn;

/// Message severity for user-visible notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// Sink for everything the controller wants shown to the user.
///
/// Implementations must not block: the controller fires and forgets, and
/// there is no feedback channel back into it other than user intents.
pub trait PresentationSink: Send + Sync {
    fn turn_rendered(&self, turn: &Turn);
    fn status_changed(&self, state: ControllerState, status: StatusKind);
    fn notify(&self, message: &str, severity: Severity);
    fn evaluation_ready(&self, report: &str);
    fn transcript_cleared(&self);
}

/// Controller-to-renderer events, one per sink callback
#[derive(Debug, Clone)]
pub enum UiEvent {
    TurnRendered(Turn),
    StatusChanged {
        state: ControllerState,
        status: StatusKind,
    },
    Notify {
        message: String,
        severity: Severity,
    },
    EvaluationReady {
        report: String,
    },
    TranscriptCleared,
}

/// Sink that forwards events over an unbounded channel.
///
/// The renderer drains the receiver on its own schedule, so emitting never
/// blocks the controller.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            warn!("presentation sink receiver dropped, event lost");
        }
    }
}

impl PresentationSink for ChannelSink {
    fn turn_rendered(&self, turn: &Turn) {
        self.send(UiEvent::TurnRendered(turn.clone()));
    }

    fn status_changed(&self, state: ControllerState, status: StatusKind) {
        self.send(UiEvent::StatusChanged { state, status });
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.send(UiEvent::Notify {
            message: message.to_string(),
            severity,
        });
    }

    fn evaluation_ready(&self, report: &str) {
        self.send(UiEvent::EvaluationReady {
            report: report.to_string(),
        });
    }

    fn transcript_cleared(&self) {
        self.send(UiEvent::TranscriptCleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::new();
        sink.notify("hello", Severity::Info);
        sink.transcript_cleared();

        match rx.try_recv().unwrap() {
            UiEvent::Notify { message, severity } => {
                assert_eq!(message, "hello");
                assert_eq!(severity, Severity::Info);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.try_recv().unwrap(), UiEvent::TranscriptCleared));
    }

    #[test]
    fn emitting_after_receiver_drop_does_not_panic() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.notify("late", Severity::Warning);
    }
}
