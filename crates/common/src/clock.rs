//! Timecode formatting and request pacing.

use std::time::Duration;

/// Format seconds as `MM:SS` (minutes are not wrapped at the hour).
pub fn format_timecode(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let mins = (secs / 60.0).floor() as u64;
    let rem = (secs % 60.0).floor() as u64;
    format!("{mins:02}:{rem:02}")
}

/// Format a duration in seconds the way labels show it: integers without
/// a fractional part, everything else with the shortest exact form.
pub fn format_seconds(secs: f64) -> String {
    format!("{secs}")
}

/// Fixed spacing between consecutive requests of a sequential loop.
///
/// The pause is inserted *between* units of work, never after the last
/// one, so `n` requests incur `n - 1` waits.
#[derive(Debug, Clone, Copy)]
pub struct RequestPacer {
    interval: Duration,
}

impl RequestPacer {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a pause is due after finishing item `index` of `total`.
    pub fn should_wait_after(&self, index: usize, total: usize) -> bool {
        !self.interval.is_zero() && index + 1 < total
    }

    /// Total time spent waiting for `total` items.
    pub fn total_wait(&self, total: usize) -> Duration {
        let waits = u32::try_from(total.saturating_sub(1)).unwrap_or(u32::MAX);
        self.interval.saturating_mul(waits)
    }
}
