//! Spoken-style affirmation and progress messages.
//!
//! Message text is generated here so the controller never reaches into UI
//! or TTS code; the embedding application decides how to present it.

use crate::types::AngleBucket;

const ENTHUSIASTIC: [&str; 5] = [
    "Excellent!",
    "Perfect!",
    "Outstanding!",
    "Superb!",
    "Fantastic!",
];

const GOOD: [&str; 4] = ["Great!", "Nice!", "Good shot!", "Well done!"];

/// Affirmation for one accepted capture, keyed by 1-based capture index.
pub fn capture_message(
    capture_index: usize,
    angle_bucket: AngleBucket,
    score: f32,
    high_quality_threshold: f32,
) -> String {
    let words: &[&str] = if score >= high_quality_threshold {
        &ENTHUSIASTIC
    } else {
        &GOOD
    };
    let base = words[capture_index % words.len()];
    format!("{} Got {}.", base, angle_bucket.description())
}

/// Progress line toward the minimum capture target.
pub fn progress_message(current_count: usize, min_captures: usize) -> String {
    if current_count < min_captures {
        let remaining = min_captures - current_count;
        format!("Need {} more shots. Keep looking at the camera.", remaining)
    } else {
        "Getting bonus shots for better accuracy...".to_string()
    }
}

/// Opening line emitted when a session starts.
pub fn start_message(person_label: &str) -> String {
    format!("Looking for {}...", person_label)
}
