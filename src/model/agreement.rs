//! Agreement entities.
//!
//! An agreement is the contract signed between a provider and a client; its
//! guarantees are the SLA terms an external evaluator checks against the
//! value streams produced by the monitoring adapter.

use crate::core::{Result, Timestamp};
use serde::{Deserialize, Serialize};

/// Guarantee name matching every operation not otherwise named.
pub const CATCH_ALL: &str = "*";

/// Lifecycle state of an agreement.
///
/// Unknown states normalize to `Stopped` on deserialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum State {
    /// Being evaluated by the assessment driver
    Started,
    /// Temporarily not evaluated
    #[default]
    Stopped,
    /// Final state; never evaluated again
    Terminated,
}

impl From<String> for State {
    fn from(s: String) -> Self {
        match s.as_str() {
            "started" => State::Started,
            "terminated" => State::Terminated,
            _ => State::Stopped,
        }
    }
}

/// Discriminates an agreement text from a template text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    /// A signed agreement
    #[default]
    Agreement,
    /// A template an agreement can be created from
    Template,
}

/// A party of an agreement: a service provider or a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Party ID
    pub id: String,
    /// Display name
    pub name: String,
}

impl Party {
    fn validate(&self, role: &str) -> Vec<String> {
        let mut problems = Vec::new();
        check_empty(&self.id, &format!("{role}.id"), &mut problems);
        check_empty(&self.name, &format!("{role}.name"), &mut problems);
        problems
    }
}

/// The entity that represents a service provider.
pub type Provider = Party;

/// The entity that represents a client.
pub type Client = Party;

/// An agreement between a provider and a client.
///
/// The details are read-only in normal conditions; the assessment record is
/// owned by the external assessment driver and only read here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Agreement {
    /// Agreement ID
    pub id: String,
    /// Agreement name
    pub name: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: State,
    /// Assessment bookkeeping, absent until the first evaluation pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<super::Assessment>,
    /// The signed contract
    pub details: Details,
}

impl Agreement {
    /// Decode an agreement from its JSON document form.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Check if the agreement is being evaluated.
    pub fn is_started(&self) -> bool {
        self.state == State::Started
    }

    /// Check if the agreement reached its final state.
    pub fn is_terminated(&self) -> bool {
        self.state == State::Terminated
    }

    /// Constraint violations of the entity itself. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_empty(&self.id, "Agreement.id", &mut problems);
        check_empty(&self.name, "Agreement.name", &mut problems);
        check_equals(&self.id, "Agreement.id", &self.details.id, "Details.id", &mut problems);
        check_equals(
            &self.name,
            "Agreement.name",
            &self.details.name,
            "Details.name",
            &mut problems,
        );
        problems.extend(self.details.validate());
        problems
    }
}

/// The contract signed by the client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Details {
    /// Contract ID; matches the agreement ID
    pub id: String,
    /// Text type
    #[serde(default, rename = "type")]
    pub text_type: TextType,
    /// Contract name; matches the agreement name
    pub name: String,
    /// Service provider
    #[serde(default)]
    pub provider: Provider,
    /// Client
    #[serde(default)]
    pub client: Client,
    /// When the agreement was created
    pub creation: Timestamp,
    /// When the agreement expires, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Timestamp>,
    /// SLA terms
    #[serde(default)]
    pub guarantees: Vec<Guarantee>,
    /// Measurable quantities referenced by the guarantee constraints
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl Details {
    /// Look up a variable declaration by name.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_empty(&self.id, "Details.id", &mut problems);
        check_empty(&self.name, "Details.name", &mut problems);
        problems.extend(self.provider.validate("Provider"));
        problems.extend(self.client.validate("Client"));
        for g in &self.guarantees {
            problems.extend(g.validate());
        }
        problems
    }
}

/// An SLA term: a named guarantee with a constraint expression.
///
/// The constraint text is opaque to this crate; parsing and evaluation
/// belong to the external constraint engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Guarantee {
    /// Term name; an operation name, or [`CATCH_ALL`]
    pub name: String,
    /// Constraint expression, e.g. `execution_time < 100`
    pub constraint: String,
    /// Softer expression that triggers a warning instead of a violation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Penalties to apply on violation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub penalties: Vec<PenaltyDef>,
}

impl Guarantee {
    /// True if this term applies to every operation not otherwise matched.
    pub fn is_catch_all(&self) -> bool {
        self.name == CATCH_ALL
    }

    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_empty(&self.name, "Guarantee.name", &mut problems);
        check_empty(
            &self.constraint,
            &format!("Guarantee['{}'].constraint", self.name),
            &mut problems,
        );
        problems
    }
}

/// A penalty to apply when a guarantee term is violated.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PenaltyDef {
    /// Penalty type, e.g. a service credit
    #[serde(rename = "type")]
    pub kind: String,
    /// Penalty amount
    pub value: String,
    /// Unit of the amount, e.g. `%`
    pub unit: String,
}

/// A measurable quantity referenced by a guarantee constraint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Variable {
    /// Variable name as it appears in constraints
    pub name: String,
    /// Aggregation configuration; absent for incremental variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<Aggregation>,
}

impl Variable {
    /// The aggregation window in seconds, if one is configured and non-zero.
    pub fn window(&self) -> Option<u64> {
        self.aggregation.as_ref().map(|a| a.window).filter(|w| *w > 0)
    }
}

/// Aggregation configuration of a variable.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Aggregation {
    /// Sliding window length in seconds
    pub window: u64,
}

fn check_empty(field: &str, description: &str, problems: &mut Vec<String>) {
    if field.is_empty() {
        problems.push(format!("{description} is empty"));
    }
}

fn check_equals(f1: &str, d1: &str, f2: &str, d2: &str, problems: &mut Vec<String>) {
    if f1 != f2 {
        problems.push(format!("{d1} and {d2} do not match"));
    }
}
