//! Property tests for yaw bucketing and the position-diversity rule.

use enrollcam::session::is_candidate_diverse;
use enrollcam::types::{AngleBucket, CapturedFrame, FrameData, NormalizedPosition, QualityResult};
use proptest::prelude::*;
use std::collections::HashSet;

fn capture_at(x: f32, y: f32, bucket: AngleBucket) -> CapturedFrame {
    CapturedFrame {
        frame: FrameData::new(vec![0; 3], 1, 1),
        angle_bucket: bucket,
        position: Some(NormalizedPosition::new(x, y)),
        score: 0.8,
        captured_at_millis: 0,
    }
}

fn candidate_at(x: f32, y: f32, bucket: AngleBucket) -> QualityResult {
    QualityResult {
        score: 0.8,
        passed: true,
        feedback: String::new(),
        angle_bucket: bucket,
        position: Some(NormalizedPosition::new(x, y)),
    }
}

proptest! {
    #[test]
    fn prop_finite_yaw_never_unknown(yaw in -180.0f32..180.0) {
        prop_assert_ne!(AngleBucket::from_yaw(yaw), AngleBucket::Unknown);
    }

    #[test]
    fn prop_yaw_bucketing_is_piecewise(yaw in -90.0f32..90.0) {
        let bucket = AngleBucket::from_yaw(yaw);
        let expected = if yaw.abs() < 10.0 {
            AngleBucket::Front
        } else if yaw >= 25.0 {
            AngleBucket::LeftProfile
        } else if yaw <= -25.0 {
            AngleBucket::RightProfile
        } else if yaw > 0.0 {
            AngleBucket::SlightLeft
        } else {
            AngleBucket::SlightRight
        };
        prop_assert_eq!(bucket, expected);
    }

    #[test]
    fn prop_yaw_bucketing_mirrors(yaw in 10.0f32..90.0) {
        let left = AngleBucket::from_yaw(yaw);
        let right = AngleBucket::from_yaw(-yaw);
        let mirrored = match left {
            AngleBucket::SlightLeft => AngleBucket::SlightRight,
            AngleBucket::LeftProfile => AngleBucket::RightProfile,
            other => other,
        };
        prop_assert_eq!(right, mirrored);
    }

    #[test]
    fn prop_unseen_angle_always_diverse(
        positions in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0), 2..6),
        candidate in (0.0f32..1.0, 0.0f32..1.0),
        threshold in 0.01f32..0.5,
    ) {
        let captures: Vec<_> = positions
            .iter()
            .map(|&(x, y)| capture_at(x, y, AngleBucket::Front))
            .collect();
        let seen: HashSet<_> = [AngleBucket::Front].into_iter().collect();
        let result = candidate_at(candidate.0, candidate.1, AngleBucket::SlightLeft);
        prop_assert!(is_candidate_diverse(&captures, &seen, &result, threshold));
    }

    #[test]
    fn prop_repeated_angle_diverse_iff_spaced(
        positions in prop::collection::vec((0.0f32..1.0, 0.0f32..1.0), 2..6),
        candidate in (0.0f32..1.0, 0.0f32..1.0),
        threshold in 0.01f32..0.5,
    ) {
        let captures: Vec<_> = positions
            .iter()
            .map(|&(x, y)| capture_at(x, y, AngleBucket::Front))
            .collect();
        let seen: HashSet<_> = [AngleBucket::Front].into_iter().collect();
        let result = candidate_at(candidate.0, candidate.1, AngleBucket::Front);

        let candidate_pos = NormalizedPosition::new(candidate.0, candidate.1);
        let spaced = positions.iter().all(|&(x, y)| {
            candidate_pos.distance_to(&NormalizedPosition::new(x, y)) >= threshold
        });

        prop_assert_eq!(
            is_candidate_diverse(&captures, &seen, &result, threshold),
            spaced
        );
    }

    #[test]
    fn prop_fewer_than_two_captures_always_diverse(
        position in (0.0f32..1.0, 0.0f32..1.0),
        candidate in (0.0f32..1.0, 0.0f32..1.0),
        threshold in 0.01f32..0.5,
    ) {
        let captures = vec![capture_at(position.0, position.1, AngleBucket::Front)];
        let seen: HashSet<_> = [AngleBucket::Front].into_iter().collect();
        let result = candidate_at(candidate.0, candidate.1, AngleBucket::Front);
        prop_assert!(is_candidate_diverse(&captures, &seen, &result, threshold));
    }
}
