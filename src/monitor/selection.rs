//! Container selection policy.
//!
//! Decides which agents' containers count toward an instance's availability.

use crate::telemetry::{Agent, ServiceInstance, ServiceType};

/// The agents whose uptime is SLA-relevant for `instance`.
///
/// In the distributed (master/worker) topology only the master determines
/// availability; worker uptime is irrelevant to the agreement. Every agent
/// counts for any other topology.
pub fn sla_relevant_agents(instance: &ServiceInstance) -> Vec<&Agent> {
    match instance.service_type {
        ServiceType::Distributed => instance.agents.iter().filter(|a| a.master).collect(),
        ServiceType::Other => instance.agents.iter().collect(),
    }
}
