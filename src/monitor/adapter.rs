//! Monitoring adapter.
//!
//! Binds an agreement snapshot to a telemetry repository and produces the
//! per-guarantee value streams the external constraint evaluator consumes.

use crate::core::{Result, Timestamp};
use crate::model::{Agreement, Guarantee, GuaranteeData, MetricValue};
use crate::monitor::{coverage, selection, windowing};
use crate::telemetry::TelemetryRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the execution-time variable.
pub const EXECUTION_TIME: &str = "execution_time";

/// Name of the availability variable.
pub const AVAILABILITY: &str = "availability";

/// The monitoring adapter: turns raw telemetry into per-guarantee values.
///
/// One adapter is bound to one agreement snapshot for one assessment pass.
/// [`initialize`](Self::initialize) returns a *new* bound adapter and leaves
/// the receiver untouched, so a single repository connection can serve many
/// agreements, including concurrently, without shared mutable state.
pub struct MonitoringAdapter<R> {
    repository: Arc<R>,
    agreement: Option<Agreement>,
}

impl<R> Clone for MonitoringAdapter<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            agreement: self.agreement.clone(),
        }
    }
}

impl<R: TelemetryRepository> MonitoringAdapter<R> {
    /// Create an unbound adapter over a telemetry repository.
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
            agreement: None,
        }
    }

    /// The agreement snapshot this adapter is bound to, if any.
    pub fn agreement(&self) -> Option<&Agreement> {
        self.agreement.as_ref()
    }

    /// Bind to an agreement snapshot for one assessment pass.
    ///
    /// Performs no I/O. Returns a new adapter sharing the repository
    /// handle; the receiver is left unmodified, and any previous binding is
    /// discarded rather than merged, since a new snapshot may carry a
    /// different assessment history.
    pub fn initialize(&self, agreement: &Agreement) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            agreement: Some(agreement.clone()),
        }
    }

    /// Current values for one guarantee.
    ///
    /// Gathers each requested variable over its own retrieval range and
    /// returns the evaluation instances for the constraint evaluator. A
    /// repository failure empties the affected variable for this pass
    /// (logged, never fatal); the outer assessment loop re-attempts on its
    /// own schedule. An unbound adapter yields no data.
    pub async fn get_values(
        &self,
        guarantee: &Guarantee,
        variables: &[&str],
        as_of: Timestamp,
    ) -> GuaranteeData {
        let Some(agreement) = self.agreement.as_ref() else {
            warn!("get_values on an unbound adapter; call initialize first");
            return GuaranteeData::default();
        };

        let default_from = Self::default_from(agreement, guarantee);

        let mut series: Vec<(&str, Vec<MetricValue>)> = Vec::with_capacity(variables.len());
        for &name in variables {
            let from = match agreement.details.variable(name) {
                Some(variable) => windowing::retrieval_start(variable, default_from, as_of),
                None => default_from,
            };

            let gathered = match name {
                EXECUTION_TIME => self.execution_times(agreement, guarantee, from).await,
                AVAILABILITY => self.availability_values(agreement, from, as_of).await,
                other => {
                    debug!(variable = other, "variable not backed by any telemetry source");
                    Ok(Vec::new())
                }
            };

            let values = match gathered {
                Ok(values) => values,
                Err(err) => {
                    warn!(
                        guarantee = %guarantee.name,
                        variable = name,
                        error = %err,
                        "telemetry retrieval failed; no samples this pass"
                    );
                    Vec::new()
                }
            };
            series.push((name, values));
        }

        // Constraints reference a single variable for now, so only the first
        // requested name becomes evaluation instances.
        match series.into_iter().next() {
            Some((name, values)) => values
                .into_iter()
                .map(|value| HashMap::from([(name.to_string(), value)]))
                .collect(),
            None => GuaranteeData::default(),
        }
    }

    /// Lower bound for incremental variables: the guarantee-specific last
    /// execution, else the agreement-wide one, else the creation time.
    fn default_from(agreement: &Agreement, guarantee: &Guarantee) -> Timestamp {
        match agreement.assessment.as_ref() {
            None => agreement.details.creation,
            Some(assessment) => assessment
                .guarantee(&guarantee.name)
                .and_then(|g| g.last_execution)
                .or(assessment.last_execution)
                .unwrap_or(agreement.details.creation),
        }
    }

    /// One sample per operation report of the agreement's instances,
    /// restricted to the guarantee's operation unless it is the catch-all.
    async fn execution_times(
        &self,
        agreement: &Agreement,
        guarantee: &Guarantee,
        from: Timestamp,
    ) -> Result<Vec<MetricValue>> {
        let instances = self
            .repository
            .service_instances_by_agreement(&agreement.id)
            .await?;

        let mut values = Vec::new();
        for instance in &instances {
            let reports = self
                .repository
                .operation_reports_since(&instance.id, from)
                .await?;
            for report in reports {
                if !guarantee.is_catch_all() && report.operation != guarantee.name {
                    continue;
                }
                values.push(MetricValue::new(
                    EXECUTION_TIME,
                    report.execution_time,
                    report.created,
                ));
            }
        }
        Ok(values)
    }

    /// One synthetic sample covering `[from, as_of]`, from the up-intervals
    /// of the SLA-relevant containers across the agreement's instances.
    ///
    /// A window reaching back to or before the agreement's creation is not
    /// evaluated: there is no availability data from before monitoring
    /// began.
    async fn availability_values(
        &self,
        agreement: &Agreement,
        from: Timestamp,
        as_of: Timestamp,
    ) -> Result<Vec<MetricValue>> {
        if from <= agreement.details.creation {
            debug!(
                agreement = %agreement.id,
                "availability window opens before the agreement's creation; skipped this pass"
            );
            return Ok(Vec::new());
        }

        let instances = self
            .repository
            .service_instances_by_agreement(&agreement.id)
            .await?;

        let mut metrics = Vec::new();
        for instance in &instances {
            for agent in selection::sla_relevant_agents(instance) {
                let mut found = self
                    .repository
                    .container_metrics(
                        non_empty(&agent.device_id),
                        non_empty(&agent.container_id),
                        from,
                        as_of,
                    )
                    .await?;
                metrics.append(&mut found);
            }
        }

        let value = coverage::availability(&metrics, from, as_of);
        Ok(vec![MetricValue::new(AVAILABILITY, value, as_of)])
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{now, Error, Timeline};
    use crate::model::Assessment;
    use crate::telemetry::{
        Agent, IntervalEnd, MemoryRepository, ServiceContainerMetric, ServiceInstance,
        ServiceOperationReport, ServiceType,
    };

    const MAX_DELTA: f64 = 0.5;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    /// Agreement with one per-operation guarantee and one catch-all.
    fn per_operation_agreement() -> Agreement {
        Agreement::from_json(
            r#"{
                "id": "a-01",
                "name": "web-tier",
                "state": "started",
                "details": {
                    "id": "a-01",
                    "name": "web-tier",
                    "provider": { "id": "p-01", "name": "provider-01" },
                    "client": { "id": "c-01", "name": "client-01" },
                    "creation": "2020-01-01T00:00:00Z",
                    "guarantees": [
                        { "name": "compute", "constraint": "execution_time < 100" },
                        { "name": "*", "constraint": "execution_time < 1000" }
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    /// Agreement with an availability guarantee over a 600 s window.
    fn availability_agreement(tl: &Timeline) -> Agreement {
        let mut a = Agreement::from_json(
            r#"{
                "id": "a-02",
                "name": "storage-tier",
                "state": "started",
                "details": {
                    "id": "a-02",
                    "name": "storage-tier",
                    "provider": { "id": "p-01", "name": "provider-01" },
                    "client": { "id": "c-01", "name": "client-01" },
                    "creation": "2020-01-01T00:00:00Z",
                    "guarantees": [
                        { "name": "storage", "constraint": "availability > 90" }
                    ],
                    "variables": [
                        { "name": "availability", "aggregation": { "window": 600 } }
                    ]
                }
            }"#,
        )
        .unwrap();
        a.details.creation = tl.t(-7200);
        a
    }

    fn instance(id: &str, agreement: &str, service_type: ServiceType, agents: Vec<Agent>) -> ServiceInstance {
        ServiceInstance {
            id: id.into(),
            service: String::new(),
            agreement: agreement.into(),
            service_type,
            agents,
        }
    }

    fn agent(container_id: &str, master: bool) -> Agent {
        Agent {
            device_id: String::new(),
            container_id: container_id.into(),
            master,
        }
    }

    fn report(si: &str, operation: &str, execution_time: f64, created: Timestamp) -> ServiceOperationReport {
        ServiceOperationReport {
            id: String::new(),
            service_instance: si.into(),
            operation: operation.into(),
            execution_time,
            created,
            updated: None,
        }
    }

    fn container_metric(container: &str, start: Timestamp, stop: IntervalEnd) -> ServiceContainerMetric {
        ServiceContainerMetric {
            device: String::new(),
            container: container.into(),
            start_time: start,
            stop_time: stop,
        }
    }

    fn single(data: &GuaranteeData, key: &str) -> f64 {
        assert_eq!(data.len(), 1, "expected a single evaluation instance: {data:?}");
        data[0][key].value
    }

    #[tokio::test]
    async fn test_execution_time_across_instances() {
        let tl = Timeline { t0: now() };
        let a = per_operation_agreement();
        let repo = MemoryRepository::new()
            .with_instances(vec![
                instance("si-1", &a.id, ServiceType::Other, vec![]),
                instance("si-2", &a.id, ServiceType::Other, vec![]),
            ])
            .with_reports(vec![
                report("si-1", "compute", 100.0, tl.t(0)),
                report("si-2", "compute", 99.0, tl.t(1)),
            ]);

        let adapter = MonitoringAdapter::new(repo).initialize(&a);
        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[EXECUTION_TIME], tl.t(10)).await;

        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|m| m.contains_key(EXECUTION_TIME)));
    }

    #[tokio::test]
    async fn test_catch_all_keeps_every_operation() {
        let tl = Timeline { t0: now() };
        let a = per_operation_agreement();
        let repo = MemoryRepository::new()
            .with_instances(vec![instance("si-1", &a.id, ServiceType::Other, vec![])])
            .with_reports(vec![
                report("si-1", "compute", 100.0, tl.t(0)),
                report("si-1", "compute", 80.0, tl.t(1)),
                report("si-1", "cleanup", 5.0, tl.t(2)),
            ]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let concrete = &a.details.guarantees[0];
        let data = adapter.get_values(concrete, &[EXECUTION_TIME], tl.t(10)).await;
        assert_eq!(data.len(), 2);

        let catch_all = &a.details.guarantees[1];
        let data = adapter.get_values(catch_all, &[EXECUTION_TIME], tl.t(10)).await;
        assert_eq!(data.len(), 3);
    }

    #[tokio::test]
    async fn test_incremental_variable_skips_already_seen_reports() {
        let tl = Timeline { t0: now() };
        let mut a = per_operation_agreement();
        let mut assessment = Assessment::default();
        assessment.last_execution = Some(tl.t(-5));
        a.assessment = Some(assessment);

        let repo = MemoryRepository::new()
            .with_instances(vec![instance("si-1", &a.id, ServiceType::Other, vec![])])
            .with_reports(vec![
                report("si-1", "compute", 100.0, tl.t(-10)),
                report("si-1", "compute", 90.0, tl.t(-1)),
            ]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[EXECUTION_TIME], tl.t(0)).await;
        assert_eq!(data.len(), 1);
        assert_eq!(data[0][EXECUTION_TIME].value, 90.0);
    }

    #[tokio::test]
    async fn test_availability_full_window() {
        let tl = Timeline { t0: now() };
        let a = availability_agreement(&tl);
        let repo = MemoryRepository::new()
            .with_instances(vec![instance(
                "si-1",
                &a.id,
                ServiceType::Other,
                vec![agent("C01", false)],
            )])
            .with_container_metrics(vec![container_metric(
                "C01",
                tl.t(-600),
                IntervalEnd::Bounded(tl.t(0)),
            )]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[AVAILABILITY], tl.t(0)).await;
        let value = single(&data, AVAILABILITY);
        assert!((value - 100.0).abs() <= MAX_DELTA);
        assert_eq!(data[0][AVAILABILITY].date_time, tl.t(0));
    }

    #[tokio::test]
    async fn test_availability_counts_master_only() {
        let tl = Timeline { t0: now() };
        let a = availability_agreement(&tl);
        // Worker up the whole window; master only the second half.
        let repo = MemoryRepository::new()
            .with_instances(vec![instance(
                "si-1",
                &a.id,
                ServiceType::Distributed,
                vec![agent("C01", true), agent("C02", false)],
            )])
            .with_container_metrics(vec![
                container_metric("C02", tl.t(-600), IntervalEnd::Bounded(tl.t(0))),
                container_metric("C01", tl.t(-300), IntervalEnd::Bounded(tl.t(0))),
            ]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[AVAILABILITY], tl.t(0)).await;
        let value = single(&data, AVAILABILITY);
        assert!((value - 50.0).abs() <= MAX_DELTA, "got {value}");
    }

    #[tokio::test]
    async fn test_availability_master_up_worker_down() {
        let tl = Timeline { t0: now() };
        let a = availability_agreement(&tl);
        let repo = MemoryRepository::new()
            .with_instances(vec![instance(
                "si-1",
                &a.id,
                ServiceType::Distributed,
                vec![agent("C01", true), agent("C02", false)],
            )])
            .with_container_metrics(vec![container_metric(
                "C01",
                tl.t(-600),
                IntervalEnd::Unbounded,
            )]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[AVAILABILITY], tl.t(0)).await;
        let value = single(&data, AVAILABILITY);
        assert!((value - 100.0).abs() <= MAX_DELTA);
    }

    #[tokio::test]
    async fn test_availability_skipped_when_window_predates_agreement() {
        let tl = Timeline { t0: now() };
        let mut a = availability_agreement(&tl);
        // Created 100 s ago: the 600 s window reaches back before that.
        a.details.creation = tl.t(-100);

        let repo = MemoryRepository::new()
            .with_instances(vec![instance(
                "si-1",
                &a.id,
                ServiceType::Other,
                vec![agent("C01", false)],
            )])
            .with_container_metrics(vec![container_metric(
                "C01",
                tl.t(-600),
                IntervalEnd::Bounded(tl.t(0)),
            )]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[AVAILABILITY], tl.t(0)).await;
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_windowed_variable_not_shortened_by_assessment() {
        let tl = Timeline { t0: now() };
        let mut a = availability_agreement(&tl);
        let mut assessment = Assessment::default();
        assessment.last_execution = Some(tl.t(-10));
        a.assessment = Some(assessment);

        // Up only in the first half of the 600 s window, all of it earlier
        // than the last execution.
        let repo = MemoryRepository::new()
            .with_instances(vec![instance(
                "si-1",
                &a.id,
                ServiceType::Other,
                vec![agent("C01", false)],
            )])
            .with_container_metrics(vec![container_metric(
                "C01",
                tl.t(-600),
                IntervalEnd::Bounded(tl.t(-300)),
            )]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[AVAILABILITY], tl.t(0)).await;
        let value = single(&data, AVAILABILITY);
        assert!((value - 50.0).abs() <= MAX_DELTA, "got {value}");
    }

    #[tokio::test]
    async fn test_first_variable_only_assembly() {
        let tl = Timeline { t0: now() };
        let a = per_operation_agreement();
        let repo = MemoryRepository::new()
            .with_instances(vec![instance("si-1", &a.id, ServiceType::Other, vec![])])
            .with_reports(vec![report("si-1", "compute", 100.0, tl.t(0))]);
        let adapter = MonitoringAdapter::new(repo).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter
            .get_values(gt, &[EXECUTION_TIME, AVAILABILITY], tl.t(10))
            .await;
        assert_eq!(data.len(), 1);
        assert!(data[0].contains_key(EXECUTION_TIME));
        assert!(!data[0].contains_key(AVAILABILITY));
    }

    #[tokio::test]
    async fn test_unknown_variable_yields_no_samples() {
        let tl = Timeline { t0: now() };
        let a = per_operation_agreement();
        let adapter = MonitoringAdapter::new(MemoryRepository::new()).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &["throughput"], tl.t(0)).await;
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_returns_fresh_adapter() {
        let a = per_operation_agreement();
        let unbound = MonitoringAdapter::new(MemoryRepository::new());
        let bound = unbound.initialize(&a);

        assert!(unbound.agreement().is_none());
        assert_eq!(bound.agreement().unwrap().id, a.id);
    }

    #[tokio::test]
    async fn test_unbound_adapter_yields_no_data() {
        let a = per_operation_agreement();
        let adapter = MonitoringAdapter::new(MemoryRepository::new());
        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[EXECUTION_TIME], now()).await;
        assert!(data.is_empty());
    }

    #[test]
    fn test_default_from_precedence() {
        let tl = Timeline { t0: now() };
        let mut a = per_operation_agreement();
        a.details.creation = tl.t(-1000);
        let gt = a.details.guarantees[0].clone();

        // No assessment: creation time.
        assert_eq!(
            MonitoringAdapter::<MemoryRepository>::default_from(&a, &gt),
            tl.t(-1000)
        );

        // Empty assessment still falls back to creation.
        a.assessment = Some(Assessment::default());
        assert_eq!(
            MonitoringAdapter::<MemoryRepository>::default_from(&a, &gt),
            tl.t(-1000)
        );

        // Agreement-wide last execution wins over creation.
        a.assessment.as_mut().unwrap().last_execution = Some(tl.t(-60));
        assert_eq!(
            MonitoringAdapter::<MemoryRepository>::default_from(&a, &gt),
            tl.t(-60)
        );

        // Guarantee-specific last execution wins over agreement-wide.
        a.assessment
            .as_mut()
            .unwrap()
            .guarantee_mut(&gt.name)
            .last_execution = Some(tl.t(-30));
        assert_eq!(
            MonitoringAdapter::<MemoryRepository>::default_from(&a, &gt),
            tl.t(-30)
        );
    }

    /// Repository where every call fails with a transport error.
    struct FailingRepository;

    #[async_trait::async_trait]
    impl TelemetryRepository for FailingRepository {
        async fn operation_reports_since(
            &self,
            _service_instance: &str,
            _from: Timestamp,
        ) -> Result<Vec<ServiceOperationReport>> {
            Err(Error::RepositoryUnavailable("connection refused".into()))
        }

        async fn service_instances_by_agreement(
            &self,
            _agreement_id: &str,
        ) -> Result<Vec<ServiceInstance>> {
            Err(Error::RepositoryUnavailable("connection refused".into()))
        }

        async fn container_metrics(
            &self,
            _device: Option<&str>,
            _container: Option<&str>,
            _start: Timestamp,
            _end: Timestamp,
        ) -> Result<Vec<ServiceContainerMetric>> {
            Err(Error::RepositoryUnavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_repository_failure_empties_the_variable() {
        init_tracing();
        let tl = Timeline { t0: now() };
        let a = per_operation_agreement();
        let adapter = MonitoringAdapter::new(FailingRepository).initialize(&a);

        let gt = &a.details.guarantees[0];
        let data = adapter.get_values(gt, &[EXECUTION_TIME], tl.t(0)).await;
        assert!(data.is_empty());
    }
}
