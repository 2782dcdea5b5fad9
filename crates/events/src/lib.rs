#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for the gantry pipeline
//!
//! All user-visible progress flows through events - no direct printing is
//! allowed outside the CLI. Stages emit, the CLI renders. Senders are
//! optional everywhere so library consumers and tests can run silently.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use gantry_types::StageId;
use tokio::sync::mpsc::UnboundedSender;

/// Events emitted while the pipeline runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    StageStarted {
        stage: StageId,
    },
    StageCompleted {
        stage: StageId,
        duration_ms: u64,
    },
    /// A fatal stage failed; the run is about to abort
    StageFailed {
        stage: StageId,
        message: String,
        report: Option<PathBuf>,
    },
    /// A best-effort stage failed; the run continues
    StageTolerated {
        stage: StageId,
        message: String,
        report: Option<PathBuf>,
    },
    CommandStarted {
        command: String,
    },
    ArchiveCreated {
        path: PathBuf,
        checksum: String,
    },
    Warning {
        message: String,
    },
    Debug {
        message: String,
    },
}

/// Type alias for the pipeline event sender
pub type EventSender = UnboundedSender<PipelineEvent>;

/// Type alias for the pipeline event receiver
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<PipelineEvent>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout the pipeline
///
/// Provides a single, consistent API for emitting events regardless of
/// whether the caller holds a raw `EventSender` or a struct containing one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: PipelineEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if the receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug event, mirrored into tracing
    fn emit_debug(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!("{message}");
        self.emit(PipelineEvent::Debug { message });
    }

    /// Emit a warning event, mirrored into tracing
    fn emit_warning(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.emit(PipelineEvent::Warning { message });
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_channel() {
        let (tx, mut rx) = channel();
        tx.emit(PipelineEvent::StageStarted {
            stage: StageId::Lint,
        });

        match rx.recv().await {
            Some(PipelineEvent::StageStarted { stage }) => assert_eq!(stage, StageId::Lint),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_sender_is_silent() {
        let none: Option<EventSender> = None;
        // Must not panic or block
        none.emit_warning("nobody listening");
    }

    #[tokio::test]
    async fn dropped_receiver_does_not_error() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_debug("receiver already gone");
    }
}
