//! Model Module
//!
//! Agreement-side entities of the SLA platform:
//! - Agreements, guarantees, variables
//! - Assessment bookkeeping
//! - The value stream consumed by the constraint evaluator

pub mod agreement;
pub mod assessment;

pub use agreement::{
    Aggregation, Agreement, Client, Details, Guarantee, Party, PenaltyDef, Provider, State,
    TextType, Variable, CATCH_ALL,
};
pub use assessment::{Assessment, GuaranteeAssessment, GuaranteeData, MetricValue};
