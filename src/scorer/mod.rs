//! Frame quality scoring strategies.
//!
//! Two interchangeable scorers sit behind [`FrameScorer`]: a vision-backed
//! scorer driven by a face-detector collaborator, and a simulated scorer for
//! environments without a real detector. Both are selected at construction
//! time via [`ScorerConfig`], never by subclassing.

pub mod simulated;
pub mod vision;

use crate::config::{ScorerConfig, ScorerKind};
use crate::errors::{EnrollError, ScorerError};
use crate::types::{FaceObservation, FrameData, QualityResult};
use std::sync::Arc;

pub use simulated::SimulatedScorer;
pub use vision::VisionScorer;

/// Capability interface for scoring a single frame.
///
/// Evaluations are stateless with respect to one another and may run
/// concurrently on a worker pool; implementations must be `Send + Sync`.
/// `Err` is reserved for the scorer dependency being unavailable. A frame
/// that merely scores badly returns `Ok` with a failing [`QualityResult`].
pub trait FrameScorer: Send + Sync {
    /// Short strategy name for logging.
    fn name(&self) -> &'static str;

    /// Score one frame.
    fn evaluate(&self, frame: &FrameData) -> Result<QualityResult, ScorerError>;

    /// Release scorer resources. Idempotent; default is a no-op.
    fn cleanup(&self) {}
}

/// Face-detection collaborator consumed by the vision scorer.
///
/// The detector itself (ML model, remote service) is out of scope; this
/// trait is the narrow seam it is invoked through.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, frame: &FrameData) -> Result<Vec<FaceObservation>, ScorerError>;
}

/// Build the configured scorer strategy.
///
/// The vision strategy needs a detector; constructing it without one is a
/// configuration error, not a per-frame failure.
pub fn build_scorer(
    config: &ScorerConfig,
    detector: Option<Arc<dyn FaceDetector>>,
) -> Result<Arc<dyn FrameScorer>, EnrollError> {
    match config.kind {
        ScorerKind::Vision => {
            let detector = detector.ok_or_else(|| {
                EnrollError::ScorerUnavailable(
                    "vision scorer selected but no face detector was provided".to_string(),
                )
            })?;
            Ok(Arc::new(VisionScorer::new(detector, config.vision.clone())))
        }
        ScorerKind::Simulated => Ok(Arc::new(SimulatedScorer::new(config.simulated.clone()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatedScorerConfig;

    #[test]
    fn test_build_simulated_scorer() {
        let config = ScorerConfig {
            kind: ScorerKind::Simulated,
            simulated: SimulatedScorerConfig {
                seed: Some(1),
                ..Default::default()
            },
            ..Default::default()
        };
        let scorer = build_scorer(&config, None).unwrap();
        assert_eq!(scorer.name(), "simulated");
    }

    #[test]
    fn test_build_vision_scorer_requires_detector() {
        let config = ScorerConfig::default();
        assert!(build_scorer(&config, None).is_err());
    }
}
