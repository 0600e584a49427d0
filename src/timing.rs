//! Wall-clock helpers for cooldown and timeout bookkeeping.
//!
//! All session timing is wall-clock based and re-evaluated reactively on
//! each event; no background timer is required.

/// Current wall-clock time in epoch milliseconds.
#[inline]
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds elapsed since `since_millis`, clamped at zero.
///
/// Wall clocks can step backwards; a negative delta must never unlock a
/// cooldown or fire a timeout early.
#[inline]
pub fn elapsed_millis(since_millis: i64) -> i64 {
    (now_millis() - since_millis).max(0)
}
