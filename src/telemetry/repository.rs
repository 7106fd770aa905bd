//! TelemetryRepository trait definition.
//!
//! The seam between the monitoring adapter and whatever system stores the
//! raw operational events.

use crate::core::{Result, Timestamp};
use crate::telemetry::types::{ServiceContainerMetric, ServiceInstance, ServiceOperationReport};
use async_trait::async_trait;

/// Read-only access to the raw operational events behind the monitoring
/// adapter.
///
/// Implementations must be safe for concurrent use by independent adapter
/// instances; the adapter itself never writes. Methods fail with
/// [`Error::RepositoryUnavailable`](crate::core::Error::RepositoryUnavailable)
/// on transport failure and
/// [`Error::RepositoryData`](crate::core::Error::RepositoryData) on a
/// malformed response.
#[async_trait]
pub trait TelemetryRepository: Send + Sync {
    /// Operation reports produced by a service instance and created after
    /// `from`.
    async fn operation_reports_since(
        &self,
        service_instance: &str,
        from: Timestamp,
    ) -> Result<Vec<ServiceOperationReport>>;

    /// Every service instance bound to an agreement.
    async fn service_instances_by_agreement(
        &self,
        agreement_id: &str,
    ) -> Result<Vec<ServiceInstance>>;

    /// Container up-intervals overlapping `(start, end]`.
    ///
    /// `device` and `container` restrict the result when present; `None`
    /// means no restriction.
    async fn container_metrics(
        &self,
        device: Option<&str>,
        container: Option<&str>,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<ServiceContainerMetric>>;
}
