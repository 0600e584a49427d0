//! Configuration management for the enrollment capture pipeline.
//!
//! Provides configuration loading, saving, and validation for admission
//! thresholds, completion timing, and scorer selection. The strict and
//! lenient capture profiles are expressed purely as preset values; there is
//! exactly one admission code path.

use crate::errors::EnrollError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnrollConfig {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub scorer: ScorerConfig,
}

/// Admission and completion policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Minimum captures before the session may complete
    pub min_captures: usize,
    /// Hard cap; reaching it completes the session immediately
    pub max_captures: usize,
    /// Minimum time between two accepted captures in milliseconds
    pub cooldown_ms: i64,
    /// Euclidean distance in normalized position space below which two
    /// same-angle captures count as near-duplicates
    pub position_diversity_threshold: f32,
    /// Distinct angle buckets that force early completion
    pub angle_completion_count: usize,
    /// No-capture timeout once the minimum is met, in milliseconds
    pub idle_completion_timeout_ms: i64,
    /// Session age beyond which sub-threshold frames are force-accepted
    /// while below the minimum, in milliseconds
    pub long_wait_timeout_ms: i64,
    /// Absolute session cap in milliseconds
    pub hard_session_timeout_ms: i64,
    /// Floor for the minimum-backfill acceptance rule
    pub medium_quality_floor: f32,
    /// Floor for the cold-start and force-accept rules
    pub first_capture_quality_floor: f32,
    /// Consecutive rejections below the minimum before acceptance
    /// requirements are relaxed
    pub max_consecutive_rejections: u32,
    /// Score at or above which a capture counts as high quality in stats
    pub high_quality_threshold: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl CaptureConfig {
    /// Strict profile: 5-8 captures with wide duplicate spacing.
    pub fn strict() -> Self {
        Self {
            min_captures: 5,
            max_captures: 8,
            cooldown_ms: 2000,
            position_diversity_threshold: 0.2,
            angle_completion_count: 3,
            idle_completion_timeout_ms: 10_000,
            long_wait_timeout_ms: 15_000,
            hard_session_timeout_ms: 60_000,
            medium_quality_floor: 0.5,
            first_capture_quality_floor: 0.3,
            max_consecutive_rejections: 15,
            high_quality_threshold: 0.7,
        }
    }

    /// Lenient profile: 3-6 captures, tolerates closer duplicates.
    pub fn lenient() -> Self {
        Self {
            min_captures: 3,
            max_captures: 6,
            cooldown_ms: 1200,
            position_diversity_threshold: 0.1,
            angle_completion_count: 3,
            idle_completion_timeout_ms: 10_000,
            long_wait_timeout_ms: 15_000,
            hard_session_timeout_ms: 60_000,
            medium_quality_floor: 0.45,
            first_capture_quality_floor: 0.25,
            max_consecutive_rejections: 15,
            high_quality_threshold: 0.7,
        }
    }
}

/// Scorer strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    /// Face detector plus geometric and photometric heuristics
    Vision,
    /// Detector-free stand-in for environments without a real detector
    Simulated,
}

/// Scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    pub kind: ScorerKind,
    #[serde(default)]
    pub vision: VisionScorerConfig,
    #[serde(default)]
    pub simulated: SimulatedScorerConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            kind: ScorerKind::Vision,
            vision: VisionScorerConfig::default(),
            simulated: SimulatedScorerConfig::default(),
        }
    }
}

/// Vision scorer thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionScorerConfig {
    /// Overall score at or above which a frame passes
    pub quality_pass_threshold: f32,
    /// Ideal face-area window as a fraction of frame area
    pub min_face_ratio: f32,
    pub max_face_ratio: f32,
    /// Ideal mean-luma band on a 0-255 scale
    pub min_brightness: f32,
    pub max_brightness: f32,
    /// Normalized sharpness below which a frame is flagged blurry
    pub min_sharpness: f32,
    /// Head rotation magnitude in degrees above which pose scores zero
    pub max_head_rotation: f32,
}

impl Default for VisionScorerConfig {
    fn default() -> Self {
        Self {
            quality_pass_threshold: 0.7,
            min_face_ratio: 0.15,
            max_face_ratio: 0.8,
            min_brightness: 80.0,
            max_brightness: 200.0,
            min_sharpness: 0.3,
            max_head_rotation: 30.0,
        }
    }
}

/// Simulated scorer parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedScorerConfig {
    /// Probability that a frame is treated as containing a face
    pub face_hit_probability: f64,
    /// Pass threshold; lower than the vision scorer's since no geometric
    /// signal exists
    pub pass_threshold: f32,
    /// Fixed seed for reproducible runs; `None` uses system entropy
    pub seed: Option<u64>,
}

impl Default for SimulatedScorerConfig {
    fn default() -> Self {
        Self {
            face_hit_probability: 0.9,
            pass_threshold: 0.45,
            seed: None,
        }
    }
}

impl EnrollConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, EnrollError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            EnrollError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: EnrollConfig = toml::from_str(&contents).map_err(|e| {
            EnrollError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EnrollError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                EnrollError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            EnrollError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            EnrollError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("enrollcam.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let c = &self.capture;
        if c.min_captures == 0 {
            return Err("min_captures must be at least 1".to_string());
        }
        if c.max_captures < c.min_captures {
            return Err("max_captures must be >= min_captures".to_string());
        }
        if c.cooldown_ms < 0 {
            return Err("cooldown_ms must not be negative".to_string());
        }
        if !(0.0..=2.0_f32.sqrt()).contains(&c.position_diversity_threshold) {
            return Err(
                "position_diversity_threshold must be within normalized space".to_string(),
            );
        }
        if c.angle_completion_count == 0 {
            return Err("angle_completion_count must be at least 1".to_string());
        }
        if c.idle_completion_timeout_ms <= 0
            || c.long_wait_timeout_ms <= 0
            || c.hard_session_timeout_ms <= 0
        {
            return Err("timeouts must be positive".to_string());
        }
        for (name, value) in [
            ("medium_quality_floor", c.medium_quality_floor),
            ("first_capture_quality_floor", c.first_capture_quality_floor),
            ("high_quality_threshold", c.high_quality_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0.0 and 1.0", name));
            }
        }
        if c.first_capture_quality_floor > c.medium_quality_floor {
            return Err(
                "first_capture_quality_floor must not exceed medium_quality_floor".to_string(),
            );
        }

        let v = &self.scorer.vision;
        if !(0.0..=1.0).contains(&v.quality_pass_threshold) {
            return Err("quality_pass_threshold must be between 0.0 and 1.0".to_string());
        }
        if !(0.0 < v.min_face_ratio && v.min_face_ratio < v.max_face_ratio && v.max_face_ratio <= 1.0)
        {
            return Err("face ratio window must satisfy 0 < min < max <= 1".to_string());
        }
        if !(0.0 <= v.min_brightness
            && v.min_brightness < v.max_brightness
            && v.max_brightness <= 255.0)
        {
            return Err("brightness band must lie within 0-255".to_string());
        }
        if v.max_head_rotation <= 0.0 {
            return Err("max_head_rotation must be positive".to_string());
        }

        let s = &self.scorer.simulated;
        if !(0.0..=1.0).contains(&s.face_hit_probability) {
            return Err("face_hit_probability must be between 0.0 and 1.0".to_string());
        }
        if !(0.0..=1.0).contains(&s.pass_threshold) {
            return Err("simulated pass_threshold must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}
