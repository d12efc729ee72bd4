//! Killweb - kill-chain analysis engine
//!
//! Models a combat network as typed nodes (sensors, command nodes, strike
//! units, support relays) and typed edges (detection, communication,
//! command, strike), then derives everything else from that graph:
//! rule-based connection generation, type-constrained kill-chain search,
//! probability-based effectiveness scoring, node importance and failure
//! impact, and a six-metric topology evaluation.

pub mod cli;
pub mod config;
pub mod evaluator;
pub mod generator;
pub mod graph;
pub mod models;
pub mod scoring;
pub mod search;

pub use config::{EngineConfig, EvaluationConfig, SearchConfig};
pub use evaluator::{evaluate_network, NetworkEvaluationReport, NetworkMetrics};
pub use generator::{generate_connections, GeneratorOptions, NetworkMode};
pub use models::{Edge, EdgeKind, Faction, KillChain, Node, Performance};
pub use scoring::{
    chain_effectiveness, cooperative_effectiveness, segment_probability, CooperativeEffectiveness,
};
pub use search::{search_kill_chains, SearchFailure, SearchReport};
