//! Testing utilities - synthetic frames and scripted collaborators for
//! offline testing without a camera or a real face detector.

mod synthetic_frames;

pub use synthetic_frames::{checkerboard_frame, gradient_frame, solid_frame};

use crate::errors::ScorerError;
use crate::scorer::{FaceDetector, FrameScorer};
use crate::types::{FaceObservation, FrameData, QualityResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Detector that reports the same faces for every frame.
pub struct StaticDetector {
    faces: Vec<FaceObservation>,
}

impl StaticDetector {
    pub fn new(faces: Vec<FaceObservation>) -> Self {
        Self { faces }
    }
}

impl FaceDetector for StaticDetector {
    fn detect(&self, _frame: &FrameData) -> Result<Vec<FaceObservation>, ScorerError> {
        Ok(self.faces.clone())
    }
}

/// Detector that always fails, for exercising the infrastructure error path.
pub struct FailingDetector;

impl FaceDetector for FailingDetector {
    fn detect(&self, _frame: &FrameData) -> Result<Vec<FaceObservation>, ScorerError> {
        Err(ScorerError::detector("face detector unavailable"))
    }
}

/// Scorer that replays a queue of prepared results.
///
/// Once the queue runs dry it returns a failing result. An optional per-call
/// delay makes in-flight evaluations observable for cancellation tests.
pub struct ScriptedScorer {
    results: Mutex<VecDeque<QualityResult>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub fn new(results: Vec<QualityResult>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(results: Vec<QualityResult>, delay: Duration) -> Self {
        Self {
            results: Mutex::new(results.into()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of evaluations requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FrameScorer for ScriptedScorer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn evaluate(&self, _frame: &FrameData) -> Result<QualityResult, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        let next = self.results.lock().expect("lock poisoned").pop_front();
        Ok(next.unwrap_or_else(|| QualityResult::failing("script exhausted")))
    }
}

/// Scorer whose evaluation panics, for exercising the panic-isolation path.
pub struct PanickingScorer;

impl FrameScorer for PanickingScorer {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn evaluate(&self, _frame: &FrameData) -> Result<QualityResult, ScorerError> {
        panic!("scripted panic");
    }
}
