//! Assessment bookkeeping and value streams.
//!
//! The assessment record tracks when an agreement (and each of its
//! guarantees) was last evaluated; it is mutated by the external assessment
//! driver and read by the monitoring adapter to avoid double-counting
//! incremental data.

use crate::core::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-agreement assessment bookkeeping.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Assessment {
    /// When the agreement was first evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_execution: Option<Timestamp>,
    /// When the agreement was last evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution: Option<Timestamp>,
    /// Per-guarantee bookkeeping, keyed by guarantee name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub guarantees: HashMap<String, GuaranteeAssessment>,
}

impl Assessment {
    /// Bookkeeping for one guarantee, if it was ever evaluated.
    pub fn guarantee(&self, name: &str) -> Option<&GuaranteeAssessment> {
        self.guarantees.get(name)
    }

    /// Bookkeeping for one guarantee, created empty if absent.
    ///
    /// Intended for the assessment driver, which records execution times
    /// after each pass.
    pub fn guarantee_mut(&mut self, name: &str) -> &mut GuaranteeAssessment {
        self.guarantees.entry(name.to_string()).or_default()
    }
}

/// Assessment bookkeeping specific to one guarantee.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GuaranteeAssessment {
    /// When this guarantee was last evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_execution: Option<Timestamp>,
}

/// One observed sample of a variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    /// Variable name
    pub key: String,
    /// Sample value
    pub value: f64,
    /// When the sample was observed
    pub date_time: Timestamp,
}

impl MetricValue {
    /// Create a new sample.
    pub fn new(key: &str, value: f64, date_time: Timestamp) -> Self {
        Self {
            key: key.to_string(),
            value,
            date_time,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}: {} at {}}}", self.key, self.value, self.date_time)
    }
}

/// The value stream handed to the external constraint evaluator: one
/// variable-name → sample map per evaluation instance.
pub type GuaranteeData = Vec<HashMap<String, MetricValue>>;
