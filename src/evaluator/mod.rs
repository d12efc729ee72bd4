//! Whole-network topological evaluation.
//!
//! Six metrics, each normalized to [0,1], blended by configurable weights
//! into an overall 0-100 score, plus vulnerability detection and ranked
//! remediation suggestions. The evaluator never fails: insufficient data
//! yields neutral metric values, and an empty network scores 0 with a
//! vacuously perfect connectivity of 1.

pub mod detectors;

use crate::config::EvaluationConfig;
use crate::graph::index::degree_map;
use crate::models::{BaseType, Edge, Node, Suggestion, Vulnerability};
use chrono::{DateTime, Utc};
use detectors::{generate_suggestions, run_detectors, EvaluationContext};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The six network metrics, each in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub connectivity: f64,
    pub coverage: f64,
    pub redundancy: f64,
    pub robustness: f64,
    pub efficiency: f64,
    pub reliability: f64,
}

/// Node and edge counts carried alongside the metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub sensor_count: usize,
    pub command_count: usize,
    pub striker_count: usize,
}

/// Full evaluation report, produced fresh per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEvaluationReport {
    /// Weighted blend of the six metrics, 0-100.
    pub overall_score: f64,
    pub metrics: NetworkMetrics,
    pub vulnerabilities: Vec<Vulnerability>,
    pub suggestions: Vec<Suggestion>,
    pub network_stats: NetworkStats,
    pub timestamp: DateTime<Utc>,
}

/// Evaluate the network snapshot. Never fails.
pub fn evaluate_network(
    nodes: &[Node],
    edges: &[Edge],
    config: &EvaluationConfig,
) -> NetworkEvaluationReport {
    if nodes.is_empty() {
        // Vacuous network: connectivity holds trivially but there is
        // nothing to score.
        return NetworkEvaluationReport {
            overall_score: 0.0,
            metrics: NetworkMetrics {
                connectivity: 1.0,
                robustness: 1.0,
                ..Default::default()
            },
            vulnerabilities: Vec::new(),
            suggestions: Vec::new(),
            network_stats: NetworkStats::default(),
            timestamp: Utc::now(),
        };
    }

    let metrics = NetworkMetrics {
        connectivity: evaluate_connectivity(nodes, edges, None),
        coverage: evaluate_coverage(nodes, config),
        redundancy: evaluate_redundancy(nodes, edges, config),
        robustness: evaluate_robustness(nodes, edges, config),
        efficiency: evaluate_efficiency(nodes, edges),
        reliability: evaluate_reliability(nodes, edges),
    };

    let weights = &config.weights;
    let overall_score = (metrics.connectivity * weights.connectivity
        + metrics.coverage * weights.coverage
        + metrics.redundancy * weights.redundancy
        + metrics.robustness * weights.robustness
        + metrics.efficiency * weights.efficiency
        + metrics.reliability * weights.reliability)
        * 100.0;

    debug!(
        connectivity = metrics.connectivity,
        coverage = metrics.coverage,
        redundancy = metrics.redundancy,
        robustness = metrics.robustness,
        efficiency = metrics.efficiency,
        reliability = metrics.reliability,
        "network metrics"
    );

    let degrees = degree_map(nodes, edges);
    let ctx = EvaluationContext {
        nodes,
        edges,
        metrics: &metrics,
        degrees: &degrees,
        config,
    };
    let vulnerabilities = run_detectors(&ctx);
    let suggestions = generate_suggestions(&ctx, &vulnerabilities);

    let count = |base_type: BaseType| nodes.iter().filter(|n| n.base_type() == base_type).count();
    let stats = NetworkStats {
        node_count: nodes.len(),
        edge_count: edges.len(),
        sensor_count: count(BaseType::Sensor),
        command_count: count(BaseType::Command),
        striker_count: count(BaseType::Striker),
    };

    info!(
        overall_score,
        vulnerabilities = vulnerabilities.len(),
        "network evaluation complete"
    );

    NetworkEvaluationReport {
        overall_score,
        metrics,
        vulnerabilities,
        suggestions,
        network_stats: stats,
        timestamp: Utc::now(),
    }
}

/// Undirected petgraph view of the snapshot, optionally excluding a node.
fn build_undirected(
    nodes: &[Node],
    edges: &[Edge],
    exclude: Option<&str>,
) -> (UnGraph<(), ()>, FxHashMap<String, NodeIndex>) {
    let mut graph = UnGraph::<(), ()>::default();
    let mut indices: FxHashMap<String, NodeIndex> = FxHashMap::default();

    for node in nodes {
        if Some(node.id.as_str()) == exclude {
            continue;
        }
        indices.insert(node.id.clone(), graph.add_node(()));
    }
    for edge in edges {
        let (Some(&a), Some(&b)) = (indices.get(&edge.source), indices.get(&edge.target)) else {
            continue;
        };
        graph.add_edge(a, b, ());
    }

    (graph, indices)
}

/// Fraction of nodes reachable from an arbitrary start over the undirected
/// edge view. 1.0 for zero or one node.
pub fn evaluate_connectivity(nodes: &[Node], edges: &[Edge], exclude: Option<&str>) -> f64 {
    let (graph, _) = build_undirected(nodes, edges, exclude);
    let total = graph.node_count();
    if total <= 1 {
        return 1.0;
    }

    let start = NodeIndex::new(0);
    let mut bfs = Bfs::new(&graph, start);
    let mut reached = 0usize;
    while bfs.next(&graph).is_some() {
        reached += 1;
    }
    reached as f64 / total as f64
}

/// Fraction of a uniform grid over the node bounding box (plus margin)
/// whose cell centers fall inside at least one sensor's detection radius.
pub fn evaluate_coverage(nodes: &[Node], config: &EvaluationConfig) -> f64 {
    let sensors: Vec<&Node> = nodes
        .iter()
        .filter(|n| n.base_type() == BaseType::Sensor)
        .collect();
    if sensors.is_empty() {
        return 0.0;
    }

    let margin = config.coverage_margin;
    let min_x = nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min) - margin;
    let max_x = nodes.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max) + margin;
    let min_y = nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min) - margin;
    let max_y = nodes.iter().map(|n| n.y).fold(f64::NEG_INFINITY, f64::max) + margin;

    let grid = config.coverage_grid_size;
    let cols = ((max_x - min_x) / grid).ceil().max(1.0) as usize;
    let rows = ((max_y - min_y) / grid).ceil().max(1.0) as usize;

    let mut covered = 0usize;
    for row in 0..rows {
        for col in 0..cols {
            let cell_x = min_x + col as f64 * grid + grid / 2.0;
            let cell_y = min_y + row as f64 * grid + grid / 2.0;
            let hit = sensors.iter().any(|sensor| {
                let dx = sensor.x - cell_x;
                let dy = sensor.y - cell_y;
                (dx * dx + dy * dy).sqrt() <= sensor.performance.detection_range()
            });
            if hit {
                covered += 1;
            }
        }
    }

    covered as f64 / (rows * cols) as f64
}

/// Average node degree normalized against the configured target degree.
pub fn evaluate_redundancy(nodes: &[Node], edges: &[Edge], config: &EvaluationConfig) -> f64 {
    if nodes.len() < 2 {
        return 0.0;
    }
    let degrees = degree_map(nodes, edges);
    let avg = degrees.values().sum::<usize>() as f64 / nodes.len() as f64;
    (avg / config.target_degree).min(1.0)
}

/// Mean retained connectivity after removing each of the top-k
/// highest-degree nodes in turn.
pub fn evaluate_robustness(nodes: &[Node], edges: &[Edge], config: &EvaluationConfig) -> f64 {
    if nodes.is_empty() {
        return 1.0;
    }

    let original = evaluate_connectivity(nodes, edges, None);
    if original == 0.0 {
        return 0.0;
    }

    let degrees = degree_map(nodes, edges);
    let mut ranked: Vec<(&str, usize)> = nodes
        .iter()
        .map(|n| (n.id.as_str(), degrees.get(&n.id).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top_k = config.robustness_top_k.min(ranked.len());
    if top_k == 0 {
        return 1.0;
    }

    let mut retained = 0.0;
    for (node_id, _) in ranked.iter().take(top_k) {
        if nodes.len() == 1 {
            continue;
        }
        let remaining: Vec<Node> = nodes.iter().filter(|n| n.id != *node_id).cloned().collect();
        let surviving: Vec<Edge> = edges
            .iter()
            .filter(|e| e.source != *node_id && e.target != *node_id)
            .cloned()
            .collect();
        retained += evaluate_connectivity(&remaining, &surviving, None) / original;
    }
    (retained / top_k as f64).min(1.0)
}

/// Inverse of the average BFS hop count over reachable sensor→striker
/// pairs; three hops or fewer scores near 1. Neutral 0.5 when either side
/// is absent, 0 when no pair is reachable.
pub fn evaluate_efficiency(nodes: &[Node], edges: &[Edge]) -> f64 {
    let sensors: Vec<&Node> = nodes
        .iter()
        .filter(|n| n.base_type() == BaseType::Sensor)
        .collect();
    let strikers: Vec<&Node> = nodes
        .iter()
        .filter(|n| n.base_type() == BaseType::Striker)
        .collect();
    if sensors.is_empty() || strikers.is_empty() {
        return 0.5;
    }

    let (graph, indices) = build_undirected(nodes, edges, None);
    let mut reachable = 0usize;
    let mut total_hops = 0usize;

    for sensor in &sensors {
        let Some(&start) = indices.get(&sensor.id) else {
            continue;
        };
        let hops = petgraph::algo::dijkstra(&graph, start, None, |_| 1usize);
        for striker in &strikers {
            let Some(end) = indices.get(&striker.id) else {
                continue;
            };
            if let Some(distance) = hops.get(end) {
                reachable += 1;
                total_hops += distance;
            }
        }
    }

    if reachable == 0 {
        return 0.0;
    }
    let avg = total_hops as f64 / reachable as f64;
    (1.0 - (avg - 1.0) / 3.0).clamp(0.0, 1.0)
}

/// Blend of role completeness (has the network a full
/// sensor/command/striker chain) and edge density.
pub fn evaluate_reliability(nodes: &[Node], edges: &[Edge]) -> f64 {
    if nodes.is_empty() {
        return 0.0;
    }

    let has = |base_type: BaseType| nodes.iter().any(|n| n.base_type() == base_type);
    let (sensor, command, striker) = (
        has(BaseType::Sensor),
        has(BaseType::Command),
        has(BaseType::Striker),
    );
    let type_score = if sensor && command && striker {
        1.0
    } else if (sensor && command) || (command && striker) {
        0.6
    } else if sensor || command || striker {
        0.3
    } else {
        0.0
    };

    let max_edges = nodes.len() * (nodes.len().saturating_sub(1)) / 2;
    let density = if max_edges > 0 {
        edges.len() as f64 / max_edges as f64
    } else {
        0.0
    };

    type_score * 0.6 + (density * 2.0).min(1.0) * 0.4
}
