//! Telemetry Module
//!
//! The telemetry side of the platform:
//! - Raw event entities (reports, instances, container intervals)
//! - The repository seam the monitoring adapter reads through
//! - An in-memory repository for tests and development

pub mod memory;
pub mod repository;
pub mod types;

pub use memory::MemoryRepository;
pub use repository::TelemetryRepository;
pub use types::{
    Agent, IntervalEnd, ServiceContainerMetric, ServiceInstance, ServiceOperationReport,
    ServiceType,
};
