use std::fmt;

/// Top-level crate error for configuration and infrastructure failures.
///
/// Per-frame quality problems are never errors; they surface as failing
/// `QualityResult`s and feedback events instead.
#[derive(Debug)]
pub enum EnrollError {
    ConfigError(String),
    ScorerUnavailable(String),
}

impl fmt::Display for EnrollError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EnrollError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            EnrollError::ScorerUnavailable(msg) => write!(f, "Scorer unavailable: {}", msg),
        }
    }
}

impl std::error::Error for EnrollError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScorerErrorKind {
    /// The face-detector dependency failed or is gone.
    Detector,
    /// Internal evaluation failure unrelated to the detector.
    Internal,
}

/// Infrastructure failure of a scorer dependency.
///
/// Returned only when evaluation could not run at all; a frame that merely
/// scores badly produces an `Ok` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorerError {
    pub kind: ScorerErrorKind,
    pub message: String,
}

impl ScorerError {
    pub fn detector(message: impl Into<String>) -> Self {
        Self {
            kind: ScorerErrorKind::Detector,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ScorerErrorKind::Internal,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScorerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = EnrollError::ConfigError("bad threshold".to_string());
        assert_eq!(e.to_string(), "Configuration error: bad threshold");

        let s = ScorerError::detector("model not loaded");
        assert_eq!(s.to_string(), "model not loaded");
        assert_eq!(s.kind, ScorerErrorKind::Detector);
    }
}
