//! Monitor Module
//!
//! The monitoring adapter and its leaf policies:
//! - Windowing (retrieval range per variable)
//! - Container selection (which uptime counts)
//! - Interval coverage (the availability number)

pub mod adapter;
pub mod coverage;
pub mod selection;
pub mod windowing;

pub use adapter::{MonitoringAdapter, AVAILABILITY, EXECUTION_TIME};
