//! Capture session ownership and admission control.
//!
//! One [`CaptureController`] owns one session at a time: the accumulated
//! captures, seen angle buckets, and timing state. Frames are scored off the
//! caller's thread on the blocking pool, but admission decisions are applied
//! strictly one at a time under the session lock - the session state is
//! mutated across several fields and must never interleave.

pub mod messages;

use crate::config::CaptureConfig;
use crate::events::{CaptureEvent, EventSender};
use crate::scorer::FrameScorer;
use crate::timing::{elapsed_millis, now_millis};
use crate::types::{
    AngleBucket, CapturedFrame, FrameData, NormalizedPosition, QualityResult, SessionStatus,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

/// Which admission rule accepted a frame; used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdmissionRule {
    Passed,
    MinimumBackfill,
    ColdStart,
    TimePressure,
    RejectionPressure,
}

impl AdmissionRule {
    fn as_str(&self) -> &'static str {
        match self {
            AdmissionRule::Passed => "passed",
            AdmissionRule::MinimumBackfill => "minimum backfill",
            AdmissionRule::ColdStart => "cold start",
            AdmissionRule::TimePressure => "time pressure",
            AdmissionRule::RejectionPressure => "rejection pressure",
        }
    }
}

/// Aggregate statistics for the current session.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureStats {
    pub total_captures: usize,
    pub high_quality_captures: usize,
    pub unique_angles: usize,
    pub average_score: f32,
}

struct SessionState {
    session_id: Uuid,
    person_label: String,
    status: SessionStatus,
    /// Bumped on every `start()`; in-flight scoring results from an older
    /// session generation are discarded on arrival.
    generation: u64,
    captures: Vec<CapturedFrame>,
    seen_angles: HashSet<AngleBucket>,
    last_capture_at_millis: i64,
    session_started_at_millis: i64,
    consecutive_rejections: u32,
    relaxation_announced: bool,
}

impl SessionState {
    fn idle() -> Self {
        Self {
            session_id: Uuid::nil(),
            person_label: String::new(),
            status: SessionStatus::Idle,
            generation: 0,
            captures: Vec::new(),
            seen_angles: HashSet::new(),
            last_capture_at_millis: 0,
            session_started_at_millis: 0,
            consecutive_rejections: 0,
            relaxation_announced: false,
        }
    }
}

struct Inner {
    config: CaptureConfig,
    scorer: Arc<dyn FrameScorer>,
    events: EventSender,
    state: Mutex<SessionState>,
}

/// Admission controller for face-enrollment capture sessions.
///
/// Push frames in with [`process_frame`](CaptureController::process_frame);
/// consume progress and outcomes from the event receiver returned by
/// [`new`](CaptureController::new). Must be used inside a tokio runtime.
pub struct CaptureController {
    inner: Arc<Inner>,
}

impl CaptureController {
    /// Create a controller and the receiving half of its event channel.
    pub fn new(
        config: CaptureConfig,
        scorer: Arc<dyn FrameScorer>,
    ) -> (Self, UnboundedReceiver<CaptureEvent>) {
        let (events, rx) = EventSender::channel();
        let controller = Self {
            inner: Arc::new(Inner {
                config,
                scorer,
                events,
                state: Mutex::new(SessionState::idle()),
            }),
        };
        (controller, rx)
    }

    /// Begin a fresh session for `person_label`, discarding any prior state.
    pub fn start(&self, person_label: &str) {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        state.generation += 1;
        state.session_id = Uuid::new_v4();
        state.person_label = person_label.to_string();
        state.status = SessionStatus::Capturing;
        state.captures.clear();
        state.seen_angles.clear();
        state.last_capture_at_millis = 0;
        state.session_started_at_millis = now_millis();
        state.consecutive_rejections = 0;
        state.relaxation_announced = false;

        log::info!(
            "capture session {} started for '{}' with scorer '{}'",
            state.session_id,
            person_label,
            self.inner.scorer.name()
        );

        self.inner.events.emit(CaptureEvent::CaptureStarted {
            person_label: person_label.to_string(),
        });
        self.inner.events.emit(CaptureEvent::ProgressUpdate {
            current_count: 0,
            target_count: self.inner.config.min_captures,
            message: messages::start_message(person_label),
        });
    }

    /// Offer a candidate frame to the session.
    ///
    /// Returns immediately: scoring runs on the blocking pool and the
    /// admission decision is applied when the result arrives. Frames are
    /// silently dropped while not capturing, and discarded unscored inside
    /// the cooldown window after an accepted capture.
    pub fn process_frame(&self, frame: &FrameData) {
        let generation = {
            let state = self.inner.state.lock().expect("lock poisoned");
            if state.status != SessionStatus::Capturing {
                return;
            }
            if state.last_capture_at_millis > 0 {
                let since = elapsed_millis(state.last_capture_at_millis);
                if since < self.inner.config.cooldown_ms {
                    log::trace!("frame inside cooldown ({} ms since capture), discarded", since);
                    return;
                }
            }
            state.generation
        };

        let inner = Arc::clone(&self.inner);
        let frame = frame.clone();
        tokio::spawn(async move {
            let scorer = Arc::clone(&inner.scorer);
            let joined = tokio::task::spawn_blocking(move || {
                let result = scorer.evaluate(&frame);
                (frame, result)
            })
            .await;

            match joined {
                Ok((frame, Ok(result))) => {
                    inner.apply_scored_frame(generation, Some(frame), result);
                }
                Ok((_, Err(e))) => {
                    log::error!("frame scorer failed: {}", e);
                    inner.events.emit(CaptureEvent::Error {
                        message: format!("quality scoring unavailable: {}", e),
                    });
                }
                Err(e) => {
                    // A panicking scorer must not take the session down.
                    log::error!("scoring task aborted: {}", e);
                    inner.apply_scored_frame(
                        generation,
                        None,
                        QualityResult::failing("Quality evaluation failed"),
                    );
                }
            }
        });
    }

    /// Stop the session before completion. In-flight scoring results are
    /// discarded when they arrive.
    pub fn stop(&self, reason: &str) {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        if state.status != SessionStatus::Capturing {
            return;
        }
        state.status = SessionStatus::Stopped;
        log::info!("capture session {} stopped: {}", state.session_id, reason);
        self.inner.events.emit(CaptureEvent::CaptureStopped {
            reason: reason.to_string(),
        });
    }

    /// Reactive timeout tick for the idle-completion path.
    ///
    /// Timeouts are otherwise re-checked whenever a scoring result is
    /// applied; call this periodically if the frame source may go quiet
    /// after the minimum capture count is reached.
    pub fn poll_timeouts(&self) {
        let mut state = self.inner.state.lock().expect("lock poisoned");
        self.inner.maybe_complete(&mut state);
    }

    /// Release captured image buffers and scorer resources.
    ///
    /// Stops the session first if it is still capturing. Idempotent and
    /// safe in any state.
    pub fn cleanup(&self) {
        {
            let mut state = self.inner.state.lock().expect("lock poisoned");
            if state.status == SessionStatus::Capturing {
                state.status = SessionStatus::Stopped;
                self.inner.events.emit(CaptureEvent::CaptureStopped {
                    reason: "capture cleanup".to_string(),
                });
            }
            state.captures.clear();
            state.seen_angles.clear();
        }
        self.inner.scorer.cleanup();
    }

    pub fn status(&self) -> SessionStatus {
        self.inner.state.lock().expect("lock poisoned").status
    }

    pub fn is_capturing(&self) -> bool {
        self.status() == SessionStatus::Capturing
    }

    pub fn capture_count(&self) -> usize {
        self.inner.state.lock().expect("lock poisoned").captures.len()
    }

    /// Identifier of the current session, for log correlation.
    pub fn session_id(&self) -> Uuid {
        self.inner.state.lock().expect("lock poisoned").session_id
    }

    /// Aggregate statistics over the captures currently held.
    pub fn stats(&self) -> CaptureStats {
        let state = self.inner.state.lock().expect("lock poisoned");
        let total = state.captures.len();
        let high_quality = state
            .captures
            .iter()
            .filter(|c| c.score >= self.inner.config.high_quality_threshold)
            .count();
        let average = if total == 0 {
            0.0
        } else {
            state.captures.iter().map(|c| c.score).sum::<f32>() / total as f32
        };
        CaptureStats {
            total_captures: total,
            high_quality_captures: high_quality,
            unique_angles: state.seen_angles.len(),
            average_score: average,
        }
    }
}

impl Inner {
    /// Apply one scoring result against the session. This is the single
    /// writer for all admission state; callers hold no lock on entry.
    fn apply_scored_frame(
        &self,
        generation: u64,
        frame: Option<FrameData>,
        result: QualityResult,
    ) {
        let mut state = self.state.lock().expect("lock poisoned");

        // The session may have been stopped or restarted while scoring was
        // in flight; a stale result must never be applied.
        if state.status != SessionStatus::Capturing || state.generation != generation {
            log::debug!("discarding scoring result for inactive session");
            return;
        }

        self.events.emit(CaptureEvent::RealTimeFeedback {
            feedback: result.feedback.clone(),
            score: result.score,
        });

        let rule = self.admission_rule(&state, &result);
        match (rule, frame) {
            (Some(rule), Some(frame)) => self.accept(&mut state, frame, &result, rule),
            (Some(rule), None) => {
                // Only reachable if a rule matched a result whose frame was
                // lost to a scorer panic; score 0 cannot match any rule.
                log::warn!("admission rule '{}' matched without a frame", rule.as_str());
                self.reject(&mut state);
            }
            (None, _) => self.reject(&mut state),
        }

        self.maybe_complete(&mut state);
    }

    /// Evaluate the admission rules in order; first match wins.
    fn admission_rule(&self, state: &SessionState, result: &QualityResult) -> Option<AdmissionRule> {
        let config = &self.config;
        let count = state.captures.len();
        let elapsed = elapsed_millis(state.session_started_at_millis);
        let diverse = is_candidate_diverse(
            &state.captures,
            &state.seen_angles,
            result,
            config.position_diversity_threshold,
        );

        if result.passed && diverse {
            Some(AdmissionRule::Passed)
        } else if !result.passed
            && result.score > config.medium_quality_floor
            && count < config.min_captures
            && diverse
        {
            Some(AdmissionRule::MinimumBackfill)
        } else if count == 0 && result.score > config.first_capture_quality_floor {
            Some(AdmissionRule::ColdStart)
        } else if elapsed > config.long_wait_timeout_ms
            && count < config.min_captures
            && result.score > config.first_capture_quality_floor
        {
            Some(AdmissionRule::TimePressure)
        } else if state.consecutive_rejections > config.max_consecutive_rejections
            && count < config.min_captures
            && result.score > config.first_capture_quality_floor
        {
            Some(AdmissionRule::RejectionPressure)
        } else {
            None
        }
    }

    fn accept(
        &self,
        state: &mut SessionState,
        frame: FrameData,
        result: &QualityResult,
        rule: AdmissionRule,
    ) {
        let now = now_millis();
        state.captures.push(CapturedFrame {
            frame,
            angle_bucket: result.angle_bucket,
            position: result.position,
            score: result.score,
            captured_at_millis: now,
        });
        state.seen_angles.insert(result.angle_bucket);
        state.last_capture_at_millis = now;
        state.consecutive_rejections = 0;

        let index = state.captures.len();
        log::info!(
            "session {}: captured frame {} via {} (angle={:?}, score={:.2})",
            state.session_id,
            index,
            rule.as_str(),
            result.angle_bucket,
            result.score
        );

        self.events.emit(CaptureEvent::SuccessfulCapture {
            capture_index: index,
            message: messages::capture_message(
                index,
                result.angle_bucket,
                result.score,
                self.config.high_quality_threshold,
            ),
        });
        self.events.emit(CaptureEvent::ProgressUpdate {
            current_count: index,
            target_count: self.config.min_captures,
            message: messages::progress_message(index, self.config.min_captures),
        });
    }

    fn reject(&self, state: &mut SessionState) {
        state.consecutive_rejections += 1;
        if state.consecutive_rejections > self.config.max_consecutive_rejections
            && state.captures.len() < self.config.min_captures
            && !state.relaxation_announced
        {
            state.relaxation_announced = true;
            log::info!(
                "session {}: {} consecutive rejections, relaxing acceptance requirements",
                state.session_id,
                state.consecutive_rejections
            );
            self.events.emit(CaptureEvent::RealTimeFeedback {
                feedback: "Having trouble getting good shots. Accepting lower quality images now."
                    .to_string(),
                score: 0.4,
            });
        }
    }

    /// Completion policy, evaluated after every applied result and on each
    /// timeout poll. Time alone never completes a session below the
    /// minimum capture count.
    fn maybe_complete(&self, state: &mut SessionState) {
        if state.status != SessionStatus::Capturing {
            return;
        }
        let config = &self.config;
        let count = state.captures.len();

        let complete = if count >= config.max_captures {
            true
        } else if count >= config.min_captures {
            state.seen_angles.len() >= config.angle_completion_count
                || (state.last_capture_at_millis > 0
                    && elapsed_millis(state.last_capture_at_millis)
                        > config.idle_completion_timeout_ms)
                || elapsed_millis(state.session_started_at_millis)
                    > config.hard_session_timeout_ms
        } else {
            false
        };

        if complete {
            self.complete(state);
        }
    }

    fn complete(&self, state: &mut SessionState) {
        // Stable sort: ties keep their original capture order.
        state
            .captures
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        state.status = SessionStatus::Completed;

        let captures = std::mem::take(&mut state.captures);
        log::info!(
            "session {} completed for '{}': {} captures across {} angles",
            state.session_id,
            state.person_label,
            captures.len(),
            state.seen_angles.len()
        );

        self.events.emit(CaptureEvent::CaptureCompleted {
            person_label: state.person_label.clone(),
            captures,
        });
    }
}

/// Diversity rule for one candidate against the captures gathered so far.
///
/// Fewer than two captures are always diverse, as is an unseen angle
/// bucket. A repeated bucket must sit at least `threshold` away from every
/// stored capture with a comparable position; captures whose position
/// cannot be compared are skipped fail-open with a data-quality warning.
pub fn is_candidate_diverse(
    captures: &[CapturedFrame],
    seen_angles: &HashSet<AngleBucket>,
    result: &QualityResult,
    threshold: f32,
) -> bool {
    if captures.len() < 2 {
        return true;
    }
    if !seen_angles.contains(&result.angle_bucket) {
        return true;
    }

    let candidate: NormalizedPosition = match result.position {
        Some(position) if position.is_comparable() => position,
        _ => {
            log::warn!("candidate frame has no comparable position, treating as diverse");
            return true;
        }
    };

    for captured in captures {
        match captured.position {
            Some(position) if position.is_comparable() => {
                if candidate.distance_to(&position) < threshold {
                    return false;
                }
            }
            _ => {
                log::warn!("stored capture has no comparable position, skipping comparison");
            }
        }
    }
    true
}
