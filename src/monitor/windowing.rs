//! Windowing policy.
//!
//! Computes the lower bound of the time range to query for one variable.
//! Windowed variables always look back a fixed span from the evaluation
//! time; incremental variables pick up where the previous assessment pass
//! left off, so samples are never double-counted.

use crate::core::Timestamp;
use crate::model::Variable;
use chrono::Duration;

/// Lower bound of the retrieval range for `variable`.
///
/// A variable with a non-zero aggregation window `w` uses `as_of - w`,
/// independent of assessment history; re-running the assessment never
/// shrinks the window. Any other variable uses `default_from`.
pub fn retrieval_start(variable: &Variable, default_from: Timestamp, as_of: Timestamp) -> Timestamp {
    match variable.window() {
        Some(window) => as_of - Duration::seconds(window as i64),
        None => default_from,
    }
}
