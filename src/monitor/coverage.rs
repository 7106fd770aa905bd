//! Interval coverage calculator.
//!
//! Measures which fraction of an observation window is covered by at least
//! one container up-interval; the availability number.

use crate::core::Timestamp;
use crate::telemetry::ServiceContainerMetric;

/// Percentage of `[from, to]` covered by at least one up-interval.
///
/// The window is split into whole-second buckets, endpoints inclusive.
/// Intervals are clipped to the window before marking; an open-ended
/// interval covers through the window end, never beyond. Overlapping
/// intervals are idempotent. Linear in the window length.
pub fn availability(metrics: &[ServiceContainerMetric], from: Timestamp, to: Timestamp) -> f64 {
    let window = (to - from).num_seconds() + 1;
    if window <= 0 {
        return 0.0;
    }

    // A marked second means the container was up that second.
    // TODO: use a bitset for large windows
    let mut mask = vec![false; window as usize];

    for metric in metrics {
        let start = metric.start_time.max(from);
        let end = metric.stop_time.clip(to);
        if end < start {
            continue;
        }

        let lo = (start - from).num_seconds() as usize;
        let hi = (end - from).num_seconds() as usize;
        for covered in &mut mask[lo..=hi] {
            *covered = true;
        }
    }

    let uptime = mask.iter().filter(|covered| **covered).count();
    100.0 * uptime as f64 / window as f64
}
