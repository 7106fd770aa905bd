//! # slamon - SLA Monitoring Core
//!
//! The monitoring adapter of an SLA platform: binds to an agreement between
//! a provider and a client and turns raw telemetry (operation execution
//! reports, container up/down intervals) into the per-guarantee value
//! streams an external constraint evaluator consumes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slamon::core::now;
//! use slamon::model::Agreement;
//! use slamon::monitor::{MonitoringAdapter, EXECUTION_TIME};
//! use slamon::telemetry::MemoryRepository;
//!
//! #[tokio::main]
//! async fn main() {
//!     let agreement = Agreement::from_json(
//!         r#"{
//!             "id": "a-01",
//!             "name": "web-tier",
//!             "details": {
//!                 "id": "a-01",
//!                 "name": "web-tier",
//!                 "creation": "2020-01-01T00:00:00Z",
//!                 "guarantees": [
//!                     { "name": "*", "constraint": "execution_time < 500" }
//!                 ]
//!             }
//!         }"#,
//!     )
//!     .unwrap();
//!
//!     // One repository connection serves many agreements; each assessment
//!     // pass binds its own adapter.
//!     let adapter = MonitoringAdapter::new(MemoryRepository::new());
//!     let bound = adapter.initialize(&agreement);
//!
//!     let guarantee = &agreement.details.guarantees[0];
//!     let data = bound.get_values(guarantee, &[EXECUTION_TIME], now()).await;
//!     println!("{} evaluation instance(s)", data.len());
//! }
//! ```

pub mod core;
pub mod model;
pub mod monitor;
pub mod telemetry;

pub use crate::core::error::{Error, Result};
