//! Simulated frame scoring.
//!
//! Drop-in replacement for the vision scorer in environments without a real
//! face detector. Emulates detection with a fixed hit probability and builds
//! the score from sampled brightness, a frame-size bonus, and bounded noise.
//! Seed it for reproducible test runs.

use crate::config::SimulatedScorerConfig;
use crate::errors::ScorerError;
use crate::scorer::FrameScorer;
use crate::types::{AngleBucket, FrameData, NormalizedPosition, QualityResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Brightness sampling stride over the whole frame.
const LUMA_STEP: u32 = 16;
/// Ideal mean luma; distance from it degrades the brightness component.
const IDEAL_BRIGHTNESS: f32 = 140.0;
const BRIGHTNESS_WEIGHT: f32 = 0.6;
/// Bonus for frames at or above VGA resolution.
const SIZE_BONUS: f32 = 0.15;
const SIZE_BONUS_WIDTH: u32 = 640;
const SIZE_BONUS_HEIGHT: u32 = 480;
/// Upper bound (exclusive) of the random score component.
const NOISE_SPAN: f32 = 0.25;

/// Detector-free scorer with a front-biased angle distribution.
pub struct SimulatedScorer {
    config: SimulatedScorerConfig,
    rng: Mutex<StdRng>,
}

impl SimulatedScorer {
    pub fn new(config: SimulatedScorerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Construct with an explicit seed, overriding the config.
    pub fn with_seed(mut config: SimulatedScorerConfig, seed: u64) -> Self {
        config.seed = Some(seed);
        Self::new(config)
    }

    fn sample_brightness(frame: &FrameData) -> Option<f32> {
        let luma = frame.to_luma()?;
        let mut total: u64 = 0;
        let mut samples: u32 = 0;
        let mut y = 0;
        while y < luma.height() {
            let mut x = 0;
            while x < luma.width() {
                total += luma.get_pixel(x, y)[0] as u64;
                samples += 1;
                x += LUMA_STEP;
            }
            y += LUMA_STEP;
        }
        if samples == 0 {
            return None;
        }
        Some(total as f32 / samples as f32)
    }

    /// Angle distribution biased toward the frontal bucket.
    fn draw_angle(roll: f32) -> AngleBucket {
        if roll < 0.5 {
            AngleBucket::Front
        } else if roll < 0.65 {
            AngleBucket::SlightLeft
        } else if roll < 0.8 {
            AngleBucket::SlightRight
        } else if roll < 0.9 {
            AngleBucket::LeftProfile
        } else {
            AngleBucket::RightProfile
        }
    }
}

impl FrameScorer for SimulatedScorer {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn evaluate(&self, frame: &FrameData) -> Result<QualityResult, ScorerError> {
        let mut rng = self.rng.lock().expect("lock poisoned");

        if rng.gen::<f64>() >= self.config.face_hit_probability {
            return Ok(QualityResult::failing("No face detected"));
        }

        let brightness = Self::sample_brightness(frame).ok_or_else(|| {
            ScorerError::internal(format!(
                "frame buffer size {} does not match {}x{}",
                frame.size_bytes(),
                frame.width,
                frame.height
            ))
        })?;
        let brightness_score =
            (1.0 - (brightness - IDEAL_BRIGHTNESS).abs() / IDEAL_BRIGHTNESS).clamp(0.0, 1.0);

        let size_bonus = if frame.width >= SIZE_BONUS_WIDTH && frame.height >= SIZE_BONUS_HEIGHT {
            SIZE_BONUS
        } else {
            0.0
        };

        let noise: f32 = rng.gen_range(0.0..NOISE_SPAN);
        let score = (brightness_score * BRIGHTNESS_WEIGHT + size_bonus + noise).clamp(0.0, 1.0);
        let passed = score >= self.config.pass_threshold;

        let angle_bucket = Self::draw_angle(rng.gen::<f32>());
        let position = NormalizedPosition::new(
            0.5 + rng.gen_range(-0.2..0.2),
            0.5 + rng.gen_range(-0.2..0.2),
        );

        let feedback = if passed {
            "Excellent quality".to_string()
        } else {
            "Adjust position and lighting for better quality".to_string()
        };

        Ok(QualityResult {
            score,
            passed,
            feedback,
            angle_bucket,
            position: Some(position),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::solid_frame;

    fn seeded(seed: u64) -> SimulatedScorer {
        SimulatedScorer::with_seed(SimulatedScorerConfig::default(), seed)
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let frame = solid_frame(640, 480, 140);
        let a: Vec<QualityResult> = {
            let scorer = seeded(42);
            (0..20).map(|_| scorer.evaluate(&frame).unwrap()).collect()
        };
        let b: Vec<QualityResult> = {
            let scorer = seeded(42);
            (0..20).map(|_| scorer.evaluate(&frame).unwrap()).collect()
        };
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.score, y.score);
            assert_eq!(x.angle_bucket, y.angle_bucket);
            assert_eq!(x.position.unwrap(), y.position.unwrap());
        }
    }

    #[test]
    fn test_scores_in_range() {
        let scorer = seeded(7);
        let frame = solid_frame(320, 240, 90);
        for _ in 0..50 {
            let result = scorer.evaluate(&frame).unwrap();
            assert!((0.0..=1.0).contains(&result.score));
            if let Some(position) = result.position {
                assert!((0.0..=1.0).contains(&position.x));
                assert!((0.0..=1.0).contains(&position.y));
            }
        }
    }

    #[test]
    fn test_front_bias() {
        let scorer = seeded(123);
        let frame = solid_frame(640, 480, 140);
        let mut front = 0;
        let mut total = 0;
        for _ in 0..200 {
            let result = scorer.evaluate(&frame).unwrap();
            if result.position.is_some() {
                total += 1;
                if result.angle_bucket == AngleBucket::Front {
                    front += 1;
                }
            }
        }
        // Roughly half of the detected frames should be frontal.
        assert!(front * 3 > total, "front={} total={}", front, total);
    }

    #[test]
    fn test_bright_large_frame_usually_passes() {
        let scorer = seeded(9);
        let frame = solid_frame(640, 480, 140);
        let mut passed = 0;
        for _ in 0..100 {
            if scorer.evaluate(&frame).unwrap().passed {
                passed += 1;
            }
        }
        assert!(passed > 60, "passed {} of 100", passed);
    }

    #[test]
    fn test_mismatched_buffer_is_internal_error() {
        use crate::errors::ScorerErrorKind;
        let config = SimulatedScorerConfig {
            face_hit_probability: 1.0,
            ..Default::default()
        };
        let scorer = SimulatedScorer::with_seed(config, 1);
        let frame = FrameData::new(vec![0u8; 5], 320, 240);
        let err = scorer.evaluate(&frame).unwrap_err();
        assert_eq!(err.kind, ScorerErrorKind::Internal);
    }

    #[test]
    fn test_miss_produces_failing_result() {
        let config = SimulatedScorerConfig {
            face_hit_probability: 0.0,
            ..Default::default()
        };
        let scorer = SimulatedScorer::with_seed(config, 1);
        let frame = solid_frame(320, 240, 140);
        let result = scorer.evaluate(&frame).unwrap();
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
    }
}
