//! Common types used across slamon modules.

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}

/// Calculates timestamps relative to a time origin.
///
/// Initialize the struct with `t0` as the desired origin. Used to build
/// assessment scenarios where only the distances between events matter.
///
/// ```
/// use slamon::core::{now, Timeline};
///
/// let tl = Timeline { t0: now() };
/// assert_eq!(tl.t(10) - tl.t(-5), chrono::Duration::seconds(15));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Timeline {
    /// Time origin
    pub t0: Timestamp,
}

impl Timeline {
    /// The timestamp `seconds` away from the origin (may be negative).
    pub fn t(&self, seconds: i64) -> Timestamp {
        self.t0 + chrono::Duration::seconds(seconds)
    }
}
