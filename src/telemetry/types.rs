//! Telemetry entities.
//!
//! Shapes of the raw operational events pulled from a telemetry repository:
//! service instances and their agents, per-operation execution reports, and
//! container up-intervals.

use crate::core::Timestamp;
use serde::{Deserialize, Serialize};

/// Topology tag of a service instance.
///
/// Unrecognized tags deserialize to `Other`; the only behavioral split in
/// this crate is distributed-vs-everything-else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ServiceType {
    /// Master/worker execution model; only the master's uptime is
    /// SLA-relevant
    Distributed,
    /// Any other topology; every agent's uptime counts
    #[default]
    Other,
}

impl From<String> for ServiceType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "distributed" => ServiceType::Distributed,
            _ => ServiceType::Other,
        }
    }
}

/// One sub-component (container) of a service instance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Agent {
    /// Device the container runs on; may be empty
    #[serde(default)]
    pub device_id: String,
    /// Container identifier
    pub container_id: String,
    /// Master flag; meaningful only for [`ServiceType::Distributed`]
    #[serde(default)]
    pub master: bool,
}

/// A logical deployment of a service, bound to one agreement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Instance ID
    pub id: String,
    /// Deployed service ID
    #[serde(default)]
    pub service: String,
    /// Owning agreement ID
    pub agreement: String,
    /// Topology tag
    #[serde(default)]
    pub service_type: ServiceType,
    /// Sub-components of this instance
    #[serde(default)]
    pub agents: Vec<Agent>,
}

/// One record of an operation invocation: the source of the execution-time
/// variable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceOperationReport {
    /// Report ID
    #[serde(default)]
    pub id: String,
    /// Producing service instance ID
    pub service_instance: String,
    /// Invoked operation name
    pub operation: String,
    /// Measured execution time
    pub execution_time: f64,
    /// When the report was created
    pub created: Timestamp,
    /// When the report was last updated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,
}

/// Upper bound of a container up-interval.
///
/// `Unbounded` means the container is still running; it covers up to (never
/// beyond) whatever window it is measured against. The wire form is a
/// nullable timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Timestamp>", into = "Option<Timestamp>")]
pub enum IntervalEnd {
    /// The container stopped at this time
    Bounded(Timestamp),
    /// Still running
    #[default]
    Unbounded,
}

impl IntervalEnd {
    /// True if the interval is still open.
    pub fn is_unbounded(&self) -> bool {
        matches!(self, IntervalEnd::Unbounded)
    }

    /// The effective end within a window closing at `window_end`.
    pub fn clip(&self, window_end: Timestamp) -> Timestamp {
        match self {
            IntervalEnd::Bounded(t) => (*t).min(window_end),
            IntervalEnd::Unbounded => window_end,
        }
    }

    /// True if the interval extends past `t`.
    pub fn extends_past(&self, t: Timestamp) -> bool {
        match self {
            IntervalEnd::Bounded(end) => *end > t,
            IntervalEnd::Unbounded => true,
        }
    }
}

impl From<Option<Timestamp>> for IntervalEnd {
    fn from(t: Option<Timestamp>) -> Self {
        match t {
            Some(t) => IntervalEnd::Bounded(t),
            None => IntervalEnd::Unbounded,
        }
    }
}

impl From<IntervalEnd> for Option<Timestamp> {
    fn from(end: IntervalEnd) -> Self {
        match end {
            IntervalEnd::Bounded(t) => Some(t),
            IntervalEnd::Unbounded => None,
        }
    }
}

/// One observed up-interval for a container.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceContainerMetric {
    /// Device the container runs on; may be empty
    #[serde(default)]
    pub device: String,
    /// Container identifier
    pub container: String,
    /// When the container came up
    pub start_time: Timestamp,
    /// When the container went down, if it has
    #[serde(default)]
    pub stop_time: IntervalEnd,
}
