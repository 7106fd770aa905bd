//! In-memory telemetry repository.
//!
//! Vec-backed implementation of [`TelemetryRepository`] with the same filter
//! semantics as a real backend. Used by tests, doc examples and as a
//! development stand-in.

use crate::core::{Result, Timestamp};
use crate::telemetry::repository::TelemetryRepository;
use crate::telemetry::types::{ServiceContainerMetric, ServiceInstance, ServiceOperationReport};
use async_trait::async_trait;

/// A telemetry repository holding its events in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    reports: Vec<ServiceOperationReport>,
    instances: Vec<ServiceInstance>,
    container_metrics: Vec<ServiceContainerMetric>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed operation reports.
    pub fn with_reports(mut self, reports: Vec<ServiceOperationReport>) -> Self {
        self.reports = reports;
        self
    }

    /// Seed service instances.
    pub fn with_instances(mut self, instances: Vec<ServiceInstance>) -> Self {
        self.instances = instances;
        self
    }

    /// Seed container up-intervals.
    pub fn with_container_metrics(mut self, metrics: Vec<ServiceContainerMetric>) -> Self {
        self.container_metrics = metrics;
        self
    }
}

#[async_trait]
impl TelemetryRepository for MemoryRepository {
    async fn operation_reports_since(
        &self,
        service_instance: &str,
        from: Timestamp,
    ) -> Result<Vec<ServiceOperationReport>> {
        Ok(self
            .reports
            .iter()
            .filter(|r| r.service_instance == service_instance && r.created > from)
            .cloned()
            .collect())
    }

    async fn service_instances_by_agreement(
        &self,
        agreement_id: &str,
    ) -> Result<Vec<ServiceInstance>> {
        Ok(self
            .instances
            .iter()
            .filter(|si| si.agreement == agreement_id)
            .cloned()
            .collect())
    }

    async fn container_metrics(
        &self,
        device: Option<&str>,
        container: Option<&str>,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<ServiceContainerMetric>> {
        Ok(self
            .container_metrics
            .iter()
            .filter(|m| device.map_or(true, |d| m.device == d))
            .filter(|m| container.map_or(true, |c| m.container == c))
            .filter(|m| m.start_time <= end && m.stop_time.extends_past(start))
            .cloned()
            .collect())
    }
}
