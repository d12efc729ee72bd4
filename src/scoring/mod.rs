//! Probability scoring for kill chains and node criticality.
//!
//! Segment formulas are heuristic approximations driven by the endpoint
//! nodes' performance attributes and their distance, composed under an
//! independence assumption.

pub mod effectiveness;
pub mod importance;

pub use effectiveness::{
    chain_effectiveness, cooperative_effectiveness, network_effectiveness, segment_probability,
    CooperativeEffectiveness, EffectivenessDistribution, NetworkEffectiveness,
};
pub use importance::{
    assess_node_failure_impact, identify_key_nodes, node_importance, FailureImpact, KeyNode,
};
