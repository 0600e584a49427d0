//! Typed session-progress events.
//!
//! The controller never calls into UI code; every observable outcome is
//! published on an event channel that the embedding application consumes at
//! its own pace.

use crate::types::CapturedFrame;
use serde::Serialize;
use tokio::sync::mpsc;

/// Progress and outcome events emitted by a capture session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    /// A session began for the given person.
    CaptureStarted { person_label: String },
    /// Raw scorer output for one evaluated frame, emitted regardless of the
    /// admission outcome. Cooldown-discarded frames produce no event.
    RealTimeFeedback { feedback: String, score: f32 },
    /// A frame was admitted. `capture_index` is 1-based.
    SuccessfulCapture { capture_index: usize, message: String },
    /// Capture-count progress toward the minimum target.
    ProgressUpdate {
        current_count: usize,
        target_count: usize,
        message: String,
    },
    /// Terminal: the session gathered enough evidence. Captures are ordered
    /// by descending score, ties in original capture order.
    CaptureCompleted {
        person_label: String,
        captures: Vec<CapturedFrame>,
    },
    /// Terminal: the session was stopped before completing.
    CaptureStopped { reason: String },
    /// Infrastructure failure of the scorer dependency. Quality failures are
    /// reported through `RealTimeFeedback`, never here.
    Error { message: String },
}

/// Sending half of the session event channel.
///
/// A dropped receiver must never wedge the session, so emission is
/// fire-and-forget.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<CaptureEvent>,
}

impl EventSender {
    /// Create a sender/receiver pair for one controller.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CaptureEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: CaptureEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("event receiver dropped; discarding session event");
        }
    }
}
