//! EnrollCam: intelligent face-enrollment capture for live camera feeds
//!
//! This crate selects a small, diverse, high-quality subset of frames from a
//! video feed to enroll a person's face, without a human picking photos.
//! Frames flow one way: frame in, quality score out of a scorer strategy,
//! admission decision in the controller, progress events out, and finally a
//! completion event carrying the ranked capture set.
//!
//! # Features
//! - Weighted frame quality scoring (face size, position, pose, brightness,
//!   sharpness, eye openness)
//! - Interchangeable vision-backed and simulated scorer strategies
//! - Admission control with cooldown, angle/position diversity, and
//!   force-accept rules that keep sessions from stalling
//! - Completion policy over capture count, angle coverage, and timeouts
//! - Typed session events, no UI coupling
//!
//! # Usage
//! ```rust,no_run
//! use enrollcam::{CaptureConfig, CaptureController, SimulatedScorer};
//! use enrollcam::config::SimulatedScorerConfig;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let scorer = Arc::new(SimulatedScorer::new(SimulatedScorerConfig::default()));
//!     let (controller, mut events) = CaptureController::new(CaptureConfig::default(), scorer);
//!     controller.start("Alice");
//!     // feed frames with controller.process_frame(&frame), drain `events`
//! }
//! ```

pub mod config;
pub mod errors;
pub mod events;
pub mod scorer;
pub mod session;
pub mod timing;
pub mod types;

// Testing utilities - synthetic data and scripted collaborators for
// offline tests.
pub mod testing;

// Re-exports for convenience
pub use config::{CaptureConfig, EnrollConfig, ScorerKind};
pub use errors::{EnrollError, ScorerError};
pub use events::CaptureEvent;
pub use scorer::{build_scorer, FaceDetector, FrameScorer, SimulatedScorer, VisionScorer};
pub use session::{CaptureController, CaptureStats};
pub use types::{
    AngleBucket, CapturedFrame, FaceObservation, FrameData, NormalizedPosition, QualityResult,
    SessionStatus,
};

/// Initialize logging for the capture pipeline
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "enrollcam=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_metadata() {
        assert_eq!(NAME, "enrollcam");
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(EnrollConfig::default().validate().is_ok());
    }
}
