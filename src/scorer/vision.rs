//! Vision-backed frame scoring.
//!
//! Combines the detector's geometric signals with photometric measurements
//! taken directly from the frame into a weighted quality score. Weights are
//! fixed: face size 25%, position 20%, pose 20%, brightness 15%,
//! sharpness 15%, eye openness 5%.

use crate::config::VisionScorerConfig;
use crate::errors::ScorerError;
use crate::scorer::{FaceDetector, FrameScorer};
use crate::types::{AngleBucket, FaceObservation, FrameData, NormalizedPosition, QualityResult};
use image::GrayImage;
use std::sync::Arc;

const WEIGHT_FACE_SIZE: f32 = 0.25;
const WEIGHT_POSITION: f32 = 0.20;
const WEIGHT_POSE: f32 = 0.20;
const WEIGHT_BRIGHTNESS: f32 = 0.15;
const WEIGHT_SHARPNESS: f32 = 0.15;
const WEIGHT_EYES: f32 = 0.05;

/// Offset from frame center beyond which a centering hint is flagged.
const CENTER_OFFSET_LIMIT: f32 = 0.3;
/// Eye-open probability below which the subject is asked to keep eyes open.
const EYE_OPEN_FLOOR: f32 = 0.5;
/// Laplacian variance normalization scale.
const SHARPNESS_SCALE: f32 = 10_000.0;
/// Sampling strides for the photometric grids.
const BRIGHTNESS_STEP: u32 = 10;
const SHARPNESS_STEP: u32 = 5;

/// Scorer backed by a face detector plus photometric heuristics.
pub struct VisionScorer {
    detector: Arc<dyn FaceDetector>,
    config: VisionScorerConfig,
}

impl VisionScorer {
    pub fn new(detector: Arc<dyn FaceDetector>, config: VisionScorerConfig) -> Self {
        Self { detector, config }
    }

    fn evaluate_face(
        &self,
        frame: &FrameData,
        luma: &GrayImage,
        face: &FaceObservation,
    ) -> QualityResult {
        let mut issues: Vec<&'static str> = Vec::new();

        let size_score = self.face_size_score(frame, face, &mut issues);
        let position_score = self.position_score(frame, face, &mut issues);
        let pose_score = self.pose_score(face, &mut issues);
        let brightness_score = self.brightness_score(luma, face, &mut issues);
        let sharpness_score = self.sharpness_score(luma, face, &mut issues);
        let eye_score = self.eye_openness_score(face, &mut issues);

        let score = size_score * WEIGHT_FACE_SIZE
            + position_score * WEIGHT_POSITION
            + pose_score * WEIGHT_POSE
            + brightness_score * WEIGHT_BRIGHTNESS
            + sharpness_score * WEIGHT_SHARPNESS
            + eye_score * WEIGHT_EYES;

        let passed = score >= self.config.quality_pass_threshold;
        let feedback = if passed {
            "Excellent quality".to_string()
        } else if issues.is_empty() {
            "Adjust position and lighting for better quality".to_string()
        } else {
            issues.join(" ")
        };

        let (center_x, center_y) = face.center();
        let position = NormalizedPosition::new(
            center_x / frame.width as f32,
            center_y / frame.height as f32,
        );

        QualityResult {
            score,
            passed,
            feedback,
            angle_bucket: AngleBucket::from_yaw(face.euler_y),
            position: Some(position),
        }
    }

    fn face_size_score(
        &self,
        frame: &FrameData,
        face: &FaceObservation,
        issues: &mut Vec<&'static str>,
    ) -> f32 {
        let frame_area = (frame.width * frame.height) as f32;
        if frame_area <= 0.0 {
            return 0.0;
        }
        let ratio = (face.area() / frame_area).clamp(0.0, 1.0);

        if ratio < self.config.min_face_ratio {
            issues.push("Person is too far away.");
            (ratio / self.config.min_face_ratio).max(0.0)
        } else if ratio > self.config.max_face_ratio {
            issues.push("Person is too close.");
            ((1.0 - ratio) / (1.0 - self.config.max_face_ratio)).max(0.0)
        } else {
            1.0
        }
    }

    fn position_score(
        &self,
        frame: &FrameData,
        face: &FaceObservation,
        issues: &mut Vec<&'static str>,
    ) -> f32 {
        let (center_x, center_y) = face.center();
        let half_width = frame.width as f32 / 2.0;
        let half_height = frame.height as f32 / 2.0;

        let horizontal_offset = ((center_x - half_width).abs() / half_width).min(1.0);
        let vertical_offset = ((center_y - half_height).abs() / half_height).min(1.0);

        if horizontal_offset > CENTER_OFFSET_LIMIT {
            issues.push("Please center the person horizontally.");
        }
        if vertical_offset > CENTER_OFFSET_LIMIT {
            issues.push("Please center the person vertically.");
        }

        (1.0 - (horizontal_offset + vertical_offset) / 2.0).max(0.0)
    }

    fn pose_score(&self, face: &FaceObservation, issues: &mut Vec<&'static str>) -> f32 {
        let yaw = face.euler_y.abs();
        let roll = face.euler_z.abs();
        let pitch = face.euler_x.abs();
        let limit = self.config.max_head_rotation;

        if yaw > limit {
            issues.push("Please face the camera more directly.");
        }
        if roll > limit {
            issues.push("Please keep head level.");
        }
        if pitch > limit {
            issues.push("Please look straight ahead.");
        }

        let max_rotation = yaw.max(roll).max(pitch);
        (1.0 - max_rotation / limit).max(0.0)
    }

    fn brightness_score(
        &self,
        luma: &GrayImage,
        face: &FaceObservation,
        issues: &mut Vec<&'static str>,
    ) -> f32 {
        let (x0, y0, x1, y1) = face_bounds(luma, face, 0);

        let mut total: u64 = 0;
        let mut samples: u32 = 0;
        let mut y = y0;
        while y < y1 {
            let mut x = x0;
            while x < x1 {
                total += luma.get_pixel(x, y)[0] as u64;
                samples += 1;
                x += BRIGHTNESS_STEP;
            }
            y += BRIGHTNESS_STEP;
        }

        if samples == 0 {
            return 0.0;
        }
        let average = total as f32 / samples as f32;

        if average < self.config.min_brightness {
            issues.push("Too dark - please move to better lighting.");
            average / self.config.min_brightness
        } else if average > self.config.max_brightness {
            issues.push("Too bright - please avoid direct light.");
            ((255.0 - average) / (255.0 - self.config.max_brightness)).max(0.0)
        } else {
            1.0
        }
    }

    fn sharpness_score(
        &self,
        luma: &GrayImage,
        face: &FaceObservation,
        issues: &mut Vec<&'static str>,
    ) -> f32 {
        let (x0, y0, x1, y1) = face_bounds(luma, face, 1);

        let mut total_variance: f64 = 0.0;
        let mut samples: u32 = 0;
        let mut y = y0.max(1);
        while y + 1 < y1.max(1) {
            let mut x = x0.max(1);
            while x + 1 < x1.max(1) {
                let center = luma.get_pixel(x, y)[0] as i32;
                let left = luma.get_pixel(x - 1, y)[0] as i32;
                let right = luma.get_pixel(x + 1, y)[0] as i32;
                let top = luma.get_pixel(x, y - 1)[0] as i32;
                let bottom = luma.get_pixel(x, y + 1)[0] as i32;

                let laplacian = (4 * center - left - right - top - bottom).abs() as f64;
                total_variance += laplacian * laplacian;
                samples += 1;
                x += SHARPNESS_STEP;
            }
            y += SHARPNESS_STEP;
        }

        if samples == 0 {
            return 0.0;
        }
        let normalized = ((total_variance / samples as f64) as f32 / SHARPNESS_SCALE).min(1.0);

        if normalized < self.config.min_sharpness {
            issues.push("Image is blurry - please hold steady.");
            normalized / self.config.min_sharpness
        } else {
            1.0
        }
    }

    fn eye_openness_score(
        &self,
        face: &FaceObservation,
        issues: &mut Vec<&'static str>,
    ) -> f32 {
        match (face.left_eye_open, face.right_eye_open) {
            (Some(left), Some(right)) => {
                let average = (left + right) / 2.0;
                if average < EYE_OPEN_FLOOR {
                    issues.push("Please keep eyes open.");
                }
                average
            }
            // No classification signal available: no penalty.
            _ => 1.0,
        }
    }
}

impl FrameScorer for VisionScorer {
    fn name(&self) -> &'static str {
        "vision"
    }

    fn evaluate(&self, frame: &FrameData) -> Result<QualityResult, ScorerError> {
        // A buffer that contradicts its declared dimensions is a broken
        // frame-source contract, not a per-frame quality problem.
        let luma = frame.to_luma().ok_or_else(|| {
            ScorerError::internal(format!(
                "frame buffer size {} does not match {}x{}",
                frame.size_bytes(),
                frame.width,
                frame.height
            ))
        })?;
        let faces = self.detector.detect(frame)?;

        if faces.is_empty() {
            return Ok(QualityResult::failing("No face detected"));
        }
        if faces.len() > 1 {
            return Ok(QualityResult::failing(
                "Multiple faces detected - please ensure only one subject is visible",
            ));
        }

        Ok(self.evaluate_face(frame, &luma, &faces[0]))
    }
}

/// Clamp the face bounding box to the image, shrunk by `margin` pixels on
/// each side for kernels that read neighbors.
fn face_bounds(luma: &GrayImage, face: &FaceObservation, margin: u32) -> (u32, u32, u32, u32) {
    let width = luma.width();
    let height = luma.height();

    let x0 = (face.bbox_x.max(0.0) as u32).min(width).max(margin);
    let y0 = (face.bbox_y.max(0.0) as u32).min(height).max(margin);
    let x1 = (((face.bbox_x + face.bbox_width).max(0.0) as u32).min(width))
        .saturating_sub(margin);
    let y1 = (((face.bbox_y + face.bbox_height).max(0.0) as u32).min(height))
        .saturating_sub(margin);

    (x0, y0, x1.max(x0), y1.max(y0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{checkerboard_frame, solid_frame, StaticDetector};

    fn centered_face(frame: &FrameData) -> FaceObservation {
        FaceObservation {
            bbox_x: frame.width as f32 * 0.25,
            bbox_y: frame.height as f32 * 0.25,
            bbox_width: frame.width as f32 * 0.5,
            bbox_height: frame.height as f32 * 0.5,
            euler_x: 0.0,
            euler_y: 0.0,
            euler_z: 0.0,
            left_eye_open: Some(0.95),
            right_eye_open: Some(0.95),
        }
    }

    fn scorer_with(faces: Vec<FaceObservation>) -> VisionScorer {
        VisionScorer::new(
            Arc::new(StaticDetector::new(faces)),
            VisionScorerConfig::default(),
        )
    }

    // A single weak component rarely drags the weighted total under the
    // default threshold; a strict one makes the issue text observable.
    fn strict_scorer_with(faces: Vec<FaceObservation>) -> VisionScorer {
        let config = VisionScorerConfig {
            quality_pass_threshold: 0.9,
            ..Default::default()
        };
        VisionScorer::new(Arc::new(StaticDetector::new(faces)), config)
    }

    #[test]
    fn test_no_face_fails() {
        let frame = solid_frame(160, 120, 128);
        let result = scorer_with(vec![]).evaluate(&frame).unwrap();
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
        assert!(result.feedback.contains("No face"));
    }

    #[test]
    fn test_multiple_faces_fail() {
        let frame = solid_frame(160, 120, 128);
        let face = centered_face(&frame);
        let result = scorer_with(vec![face.clone(), face]).evaluate(&frame).unwrap();
        assert!(!result.passed);
        assert_eq!(result.score, 0.0);
        assert!(result.feedback.contains("one subject"));
    }

    #[test]
    fn test_good_frame_passes() {
        let frame = checkerboard_frame(160, 120, 4);
        let face = centered_face(&frame);
        let result = scorer_with(vec![face]).evaluate(&frame).unwrap();
        assert!(result.passed, "score was {}: {}", result.score, result.feedback);
        assert_eq!(result.angle_bucket, AngleBucket::Front);
        let position = result.position.unwrap();
        assert!((position.x - 0.5).abs() < 0.01);
        assert!((position.y - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_dark_frame_flagged() {
        let frame = solid_frame(160, 120, 20);
        let face = centered_face(&frame);
        let result = strict_scorer_with(vec![face]).evaluate(&frame).unwrap();
        assert!(!result.passed);
        assert!(result.feedback.contains("Too dark"));
    }

    #[test]
    fn test_flat_frame_flagged_blurry() {
        // A featureless frame has zero Laplacian variance.
        let frame = solid_frame(160, 120, 128);
        let face = centered_face(&frame);
        let result = strict_scorer_with(vec![face]).evaluate(&frame).unwrap();
        assert!(!result.passed);
        assert!(result.feedback.contains("blurry"), "{}", result.feedback);
    }

    #[test]
    fn test_turned_head_buckets_profile() {
        let frame = checkerboard_frame(160, 120, 4);
        let mut face = centered_face(&frame);
        face.euler_y = 32.0;
        let result = scorer_with(vec![face]).evaluate(&frame).unwrap();
        assert_eq!(result.angle_bucket, AngleBucket::LeftProfile);
        assert!(result.feedback.contains("face the camera") || result.passed);
    }

    #[test]
    fn test_tiny_face_flagged_far() {
        let frame = checkerboard_frame(160, 120, 4);
        let face = FaceObservation {
            bbox_x: 70.0,
            bbox_y: 50.0,
            bbox_width: 16.0,
            bbox_height: 16.0,
            euler_x: 0.0,
            euler_y: 0.0,
            euler_z: 0.0,
            left_eye_open: None,
            right_eye_open: None,
        };
        let result = strict_scorer_with(vec![face]).evaluate(&frame).unwrap();
        assert!(result.feedback.contains("too far away"), "{}", result.feedback);
    }

    #[test]
    fn test_closed_eyes_flagged() {
        let frame = checkerboard_frame(160, 120, 4);
        let mut face = centered_face(&frame);
        face.left_eye_open = Some(0.1);
        face.right_eye_open = Some(0.2);
        let result = scorer_with(vec![face]).evaluate(&frame).unwrap();
        assert!(result.feedback.contains("eyes open") || result.passed);
    }

    #[test]
    fn test_mismatched_buffer_is_internal_error() {
        use crate::errors::ScorerErrorKind;
        let frame = FrameData::new(vec![0u8; 12], 160, 120);
        let face = FaceObservation {
            bbox_x: 40.0,
            bbox_y: 30.0,
            bbox_width: 80.0,
            bbox_height: 60.0,
            euler_x: 0.0,
            euler_y: 0.0,
            euler_z: 0.0,
            left_eye_open: None,
            right_eye_open: None,
        };
        let err = scorer_with(vec![face]).evaluate(&frame).unwrap_err();
        assert_eq!(err.kind, ScorerErrorKind::Internal);
    }

    #[test]
    fn test_detector_failure_propagates_as_error() {
        let frame = solid_frame(160, 120, 128);
        let scorer = VisionScorer::new(
            Arc::new(crate::testing::FailingDetector),
            VisionScorerConfig::default(),
        );
        assert!(scorer.evaluate(&frame).is_err());
    }
}
