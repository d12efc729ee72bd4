//! Vulnerability detectors.
//!
//! Each detector inspects one structural weakness class and emits zero or
//! more vulnerabilities; the evaluator runs them all and maps the results
//! to remediation suggestions. Detection runs independently of metric
//! scoring.

use crate::config::EvaluationConfig;
use crate::models::{
    BaseType, Edge, Node, Severity, Suggestion, Vulnerability, VulnerabilityKind,
};
use crate::evaluator::NetworkMetrics;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Read-only view handed to each detector.
pub struct EvaluationContext<'a> {
    pub nodes: &'a [Node],
    pub edges: &'a [Edge],
    pub metrics: &'a NetworkMetrics,
    pub degrees: &'a FxHashMap<String, usize>,
    pub config: &'a EvaluationConfig,
}

/// Trait for structural vulnerability detectors.
pub trait VulnerabilityDetector {
    /// Unique identifier for this detector.
    fn name(&self) -> &'static str;

    /// Inspect the network and return any weaknesses found.
    fn detect(&self, ctx: &EvaluationContext<'_>) -> Vec<Vulnerability>;
}

/// Nodes with no incident edges cannot participate in any chain.
pub struct IsolatedNodeDetector;

impl VulnerabilityDetector for IsolatedNodeDetector {
    fn name(&self) -> &'static str {
        "IsolatedNodeDetector"
    }

    fn detect(&self, ctx: &EvaluationContext<'_>) -> Vec<Vulnerability> {
        let isolated: Vec<&Node> = ctx
            .nodes
            .iter()
            .filter(|n| ctx.degrees.get(&n.id).copied().unwrap_or(0) == 0)
            .collect();
        if isolated.is_empty() {
            return Vec::new();
        }

        vec![Vulnerability::new(
            VulnerabilityKind::IsolatedNodes,
            Severity::High,
            "Isolated nodes present",
            format!(
                "{} node(s) have no connection to the rest of the network and cannot relay information: {}",
                isolated.len(),
                isolated
                    .iter()
                    .map(|n| n.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
        .with_affected_nodes(isolated.iter().map(|n| n.id.clone()).collect())]
    }
}

/// Nodes whose degree reaches half the node count: losing one severely
/// degrades the network.
pub struct SinglePointFailureDetector;

impl VulnerabilityDetector for SinglePointFailureDetector {
    fn name(&self) -> &'static str {
        "SinglePointFailureDetector"
    }

    fn detect(&self, ctx: &EvaluationContext<'_>) -> Vec<Vulnerability> {
        let threshold = ctx.nodes.len() as f64 / 2.0;
        let mut ranked: Vec<(&Node, usize)> = ctx
            .nodes
            .iter()
            .map(|n| (n, ctx.degrees.get(&n.id).copied().unwrap_or(0)))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let hubs: Vec<&Node> = ranked
            .iter()
            .take(ctx.config.robustness_top_k)
            .filter(|(_, degree)| *degree as f64 >= threshold && *degree > 0)
            .map(|(n, _)| *n)
            .collect();
        if hubs.is_empty() {
            return Vec::new();
        }

        vec![Vulnerability::new(
            VulnerabilityKind::SinglePointFailure,
            Severity::High,
            "Single point of failure",
            format!(
                "Node(s) {} carry an outsized share of the connections; losing one would severely degrade the network.",
                hubs.iter().map(|n| n.name.as_str()).collect::<Vec<_>>().join(", ")
            ),
        )
        .with_affected_nodes(hubs.iter().map(|n| n.id.clone()).collect())]
    }
}

/// Sensor coverage below the configured threshold.
pub struct CoverageGapDetector;

impl VulnerabilityDetector for CoverageGapDetector {
    fn name(&self) -> &'static str {
        "CoverageGapDetector"
    }

    fn detect(&self, ctx: &EvaluationContext<'_>) -> Vec<Vulnerability> {
        if ctx.metrics.coverage >= ctx.config.coverage_warning_threshold {
            return Vec::new();
        }
        vec![Vulnerability::new(
            VulnerabilityKind::CoverageGap,
            Severity::Medium,
            "Insufficient sensor coverage",
            format!(
                "Sensors cover only {:.1}% of the operating area, leaving blind zones.",
                ctx.metrics.coverage * 100.0
            ),
        )]
    }
}

/// A missing sensor, command or striker breaks the kill chain outright.
pub struct MissingAssetTypeDetector;

impl VulnerabilityDetector for MissingAssetTypeDetector {
    fn name(&self) -> &'static str {
        "MissingAssetTypeDetector"
    }

    fn detect(&self, ctx: &EvaluationContext<'_>) -> Vec<Vulnerability> {
        let mut found = Vec::new();
        let has = |base_type: BaseType| ctx.nodes.iter().any(|n| n.base_type() == base_type);

        if !has(BaseType::Sensor) {
            found.push(Vulnerability::new(
                VulnerabilityKind::MissingSensor,
                Severity::High,
                "No sensor nodes",
                "The network has no sensors and cannot detect targets.",
            ));
        }
        if !has(BaseType::Command) {
            found.push(Vulnerability::new(
                VulnerabilityKind::MissingCommand,
                Severity::High,
                "No command nodes",
                "The network has no command nodes and lacks command-and-control capability.",
            ));
        }
        if !has(BaseType::Striker) {
            found.push(Vulnerability::new(
                VulnerabilityKind::MissingStriker,
                Severity::Medium,
                "No strike units",
                "The network has no strike units and cannot engage targets.",
            ));
        }
        found
    }
}

/// Network splits into partitions that cannot reach each other.
pub struct DisconnectedNetworkDetector;

impl VulnerabilityDetector for DisconnectedNetworkDetector {
    fn name(&self) -> &'static str {
        "DisconnectedNetworkDetector"
    }

    fn detect(&self, ctx: &EvaluationContext<'_>) -> Vec<Vulnerability> {
        if ctx.metrics.connectivity >= 1.0 || ctx.nodes.len() <= 1 {
            return Vec::new();
        }
        vec![Vulnerability::new(
            VulnerabilityKind::DisconnectedNetwork,
            Severity::High,
            "Network not fully connected",
            format!(
                "Only {:.1}% of the nodes are mutually reachable; some cannot exchange information.",
                ctx.metrics.connectivity * 100.0
            ),
        )]
    }
}

/// Run every detector and collect the findings.
pub fn run_detectors(ctx: &EvaluationContext<'_>) -> Vec<Vulnerability> {
    let detectors: Vec<Box<dyn VulnerabilityDetector>> = vec![
        Box::new(IsolatedNodeDetector),
        Box::new(SinglePointFailureDetector),
        Box::new(CoverageGapDetector),
        Box::new(MissingAssetTypeDetector),
        Box::new(DisconnectedNetworkDetector),
    ];

    let mut vulnerabilities = Vec::new();
    for detector in detectors {
        let found = detector.detect(ctx);
        if !found.is_empty() {
            debug!(detector = detector.name(), count = found.len(), "vulnerabilities found");
        }
        vulnerabilities.extend(found);
    }
    vulnerabilities
}

/// Map each vulnerability to its remediation template, then append generic
/// advice keyed on network size and edge density.
pub fn generate_suggestions(
    ctx: &EvaluationContext<'_>,
    vulnerabilities: &[Vulnerability],
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    for vulnerability in vulnerabilities {
        match vulnerability.kind {
            VulnerabilityKind::IsolatedNodes => suggestions.push(Suggestion::new(
                Severity::High,
                "Connect isolated nodes",
                "Move isolated nodes into communication range of the network, or add relay nodes to link them in.",
                "Improves connectivity and reliability",
            )),
            VulnerabilityKind::SinglePointFailure => suggestions.push(Suggestion::new(
                Severity::High,
                "Add redundant nodes",
                "Deploy backup nodes near the critical hubs and establish alternate communication paths.",
                "Improves robustness against attrition",
            )),
            VulnerabilityKind::CoverageGap => suggestions.push(Suggestion::new(
                Severity::Medium,
                "Deploy more sensors",
                "Add sensors over the blind zones to extend the detection envelope.",
                "Improves area coverage and target detection",
            )),
            VulnerabilityKind::MissingSensor
            | VulnerabilityKind::MissingCommand
            | VulnerabilityKind::MissingStriker => suggestions.push(Suggestion::new(
                Severity::High,
                "Complete the kill chain",
                format!(
                    "{} Add the missing asset type to form a complete detect-decide-engage chain.",
                    vulnerability.description
                ),
                "Forms a complete combat system",
            )),
            VulnerabilityKind::DisconnectedNetwork => suggestions.push(Suggestion::new(
                Severity::High,
                "Link network partitions",
                "Reposition nodes or add relays so every node can reach the rest of the network.",
                "Improves connectivity",
            )),
        }
    }

    if ctx.nodes.len() < ctx.config.min_node_count {
        suggestions.push(Suggestion::new(
            Severity::Medium,
            "Grow the network",
            format!(
                "With only {} node(s) the network has little redundancy; aim for at least {}.",
                ctx.nodes.len(),
                ctx.config.min_node_count
            ),
            "Improves scale and reliability",
        ));
    }

    let max_edges = ctx.nodes.len() * ctx.nodes.len().saturating_sub(1) / 2;
    if max_edges > 0 && ctx.nodes.len() >= 3 {
        let density = ctx.edges.len() as f64 / max_edges as f64;
        if density < ctx.config.density_warning_threshold {
            suggestions.push(Suggestion::new(
                Severity::Low,
                "Tighten the layout",
                "Nodes sit far apart; move them closer or extend communication ranges to gain links.",
                "Improves edge density and information flow",
            ));
        }
    }

    suggestions
}
