//! Core value types for the enrollment capture pipeline.

use serde::{Deserialize, Serialize};

/// One video frame handed over by the frame source.
///
/// The buffer is tightly-packed RGB24. The pipeline owns its copy: the frame
/// source is free to reuse its own buffers immediately after handoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameData {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl FrameData {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Convert to an 8-bit grayscale image for photometric analysis.
    ///
    /// Returns `None` when the buffer length does not match the declared
    /// dimensions.
    pub fn to_luma(&self) -> Option<image::GrayImage> {
        let rgb = image::RgbImage::from_raw(self.width, self.height, self.data.clone())?;
        Some(image::DynamicImage::ImageRgb8(rgb).to_luma8())
    }
}

/// Coarse head-yaw classification for a detected face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleBucket {
    Front,
    SlightLeft,
    SlightRight,
    LeftProfile,
    RightProfile,
    Unknown,
}

impl AngleBucket {
    /// Bucket a head yaw angle in degrees.
    ///
    /// A 10 degree deadband around zero maps to `Front`; beyond 25 degrees
    /// the face counts as a full profile, in between as a slight turn.
    pub fn from_yaw(yaw_degrees: f32) -> Self {
        if !yaw_degrees.is_finite() {
            return AngleBucket::Unknown;
        }
        if yaw_degrees.abs() < 10.0 {
            AngleBucket::Front
        } else if yaw_degrees >= 25.0 {
            AngleBucket::LeftProfile
        } else if yaw_degrees > 0.0 {
            AngleBucket::SlightLeft
        } else if yaw_degrees <= -25.0 {
            AngleBucket::RightProfile
        } else {
            AngleBucket::SlightRight
        }
    }

    /// Human-readable description used in capture affirmations.
    pub fn description(&self) -> &'static str {
        match self {
            AngleBucket::Front => "frontal view",
            AngleBucket::SlightLeft => "slight left angle",
            AngleBucket::SlightRight => "slight right angle",
            AngleBucket::LeftProfile => "left profile",
            AngleBucket::RightProfile => "right profile",
            AngleBucket::Unknown => "good angle",
        }
    }
}

/// Face-center position normalized to [0, 1] in both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f32,
    pub y: f32,
}

impl NormalizedPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &NormalizedPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are finite and comparable.
    pub fn is_comparable(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A single detected face as reported by the detector collaborator.
///
/// Bounding box coordinates are in frame pixels; euler angles in degrees
/// (x = pitch, y = yaw, z = roll). Eye-open probabilities are optional
/// because not every detector backend reports them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bbox_x: f32,
    pub bbox_y: f32,
    pub bbox_width: f32,
    pub bbox_height: f32,
    pub euler_x: f32,
    pub euler_y: f32,
    pub euler_z: f32,
    pub left_eye_open: Option<f32>,
    pub right_eye_open: Option<f32>,
}

impl FaceObservation {
    pub fn center(&self) -> (f32, f32) {
        (
            self.bbox_x + self.bbox_width / 2.0,
            self.bbox_y + self.bbox_height / 2.0,
        )
    }

    pub fn area(&self) -> f32 {
        self.bbox_width * self.bbox_height
    }
}

/// Immutable outcome of scoring one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityResult {
    /// Normalized quality score, 0.0 to 1.0.
    pub score: f32,
    /// Whether the frame cleared the scorer's pass threshold.
    pub passed: bool,
    /// Human-readable diagnostic for real-time feedback.
    pub feedback: String,
    /// Estimated head-yaw bucket.
    pub angle_bucket: AngleBucket,
    /// Normalized face-center position, when a face was located.
    pub position: Option<NormalizedPosition>,
}

impl QualityResult {
    /// A score-zero failing result with the given diagnostic.
    pub fn failing(feedback: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            passed: false,
            feedback: feedback.into(),
            angle_bucket: AngleBucket::Unknown,
            position: None,
        }
    }
}

/// A frame admitted into the enrollment set.
///
/// Owns an independent copy of the image buffer; never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedFrame {
    pub frame: FrameData,
    pub angle_bucket: AngleBucket,
    pub position: Option<NormalizedPosition>,
    pub score: f32,
    pub captured_at_millis: i64,
}

/// Lifecycle of one capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Capturing,
    Completed,
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_bucket_from_yaw() {
        assert_eq!(AngleBucket::from_yaw(0.0), AngleBucket::Front);
        assert_eq!(AngleBucket::from_yaw(9.9), AngleBucket::Front);
        assert_eq!(AngleBucket::from_yaw(-9.9), AngleBucket::Front);
        assert_eq!(AngleBucket::from_yaw(15.0), AngleBucket::SlightLeft);
        assert_eq!(AngleBucket::from_yaw(-15.0), AngleBucket::SlightRight);
        assert_eq!(AngleBucket::from_yaw(30.0), AngleBucket::LeftProfile);
        assert_eq!(AngleBucket::from_yaw(-30.0), AngleBucket::RightProfile);
        assert_eq!(AngleBucket::from_yaw(f32::NAN), AngleBucket::Unknown);
    }

    #[test]
    fn test_position_distance() {
        let a = NormalizedPosition::new(0.5, 0.5);
        let b = NormalizedPosition::new(0.5, 0.8);
        assert!((a.distance_to(&b) - 0.3).abs() < 1e-6);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn test_position_comparable() {
        assert!(NormalizedPosition::new(0.2, 0.9).is_comparable());
        assert!(!NormalizedPosition::new(f32::NAN, 0.5).is_comparable());
        assert!(!NormalizedPosition::new(0.5, f32::INFINITY).is_comparable());
    }

    #[test]
    fn test_failing_result() {
        let result = QualityResult::failing("no face detected");
        assert_eq!(result.score, 0.0);
        assert!(!result.passed);
        assert_eq!(result.angle_bucket, AngleBucket::Unknown);
        assert!(result.position.is_none());
    }

    #[test]
    fn test_frame_to_luma_size_mismatch() {
        let frame = FrameData::new(vec![0u8; 10], 64, 64);
        assert!(frame.to_luma().is_none());
    }

    #[test]
    fn test_frame_to_luma_ok() {
        let frame = FrameData::new(vec![128u8; 8 * 8 * 3], 8, 8);
        let luma = frame.to_luma().unwrap();
        assert_eq!(luma.dimensions(), (8, 8));
    }
}
