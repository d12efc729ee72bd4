//! Kill-chain search.
//!
//! Enumerates node sequences of the canonical form
//! sensor → command → striker → target over a node/edge snapshot. Each hop
//! is gated by a required edge kind: detection for sensor→command,
//! communication for command→striker, strike for striker→target. The
//! `command` edge kind is scoreable but never traversed here.
//!
//! The traversal is an explicit-stack depth-first search where every frame
//! carries its own path-so-far, so a node can appear in many independent
//! chains but never twice on one path.

use crate::config::SearchConfig;
use crate::graph::AdjacencyIndex;
use crate::models::{BaseType, Edge, EdgeKind, Faction, KillChain, Node};
use crate::scoring::{
    chain_effectiveness, cooperative_effectiveness, CooperativeEffectiveness,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Stages of the canonical kill chain, named for the node the search
/// currently sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AtSensor,
    AtCommand,
    AtStriker,
}

impl Stage {
    fn required_edge(self) -> EdgeKind {
        match self {
            Stage::AtSensor => EdgeKind::Detection,
            Stage::AtCommand => EdgeKind::Communication,
            Stage::AtStriker => EdgeKind::Strike,
        }
    }

    /// Base type the next node must have, or `None` for the final hop onto
    /// the target.
    fn next_base_type(self) -> Option<BaseType> {
        match self {
            Stage::AtSensor => Some(BaseType::Command),
            Stage::AtCommand => Some(BaseType::Striker),
            Stage::AtStriker => None,
        }
    }

    fn advance(self) -> Option<Stage> {
        match self {
            Stage::AtSensor => Some(Stage::AtCommand),
            Stage::AtCommand => Some(Stage::AtStriker),
            Stage::AtStriker => None,
        }
    }
}

/// Structure counts gathered before and alongside a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnalysis {
    pub sensor_count: usize,
    pub command_count: usize,
    pub striker_count: usize,
    /// Strikers with a strike edge reaching the requested target.
    pub strikers_can_hit_target: usize,
    pub has_basic_structure: bool,
}

/// Failure classes reported by the search, always as values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailureKind {
    #[error("target does not exist or is not a red-faction asset")]
    InvalidTarget,
    #[error("the blue network is missing required asset types")]
    IncompleteNetwork,
    #[error("no edge sequence satisfies the kill-chain stage constraints")]
    NoPathFound,
}

/// A structured search failure: machine-readable kind plus human-readable
/// reason and ordered remediation suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFailure {
    pub kind: SearchFailureKind,
    pub reason: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<NetworkAnalysis>,
}

impl std::fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for SearchFailure {}

/// Successful search outcome: scored chains sorted by effectiveness,
/// their cooperative assessment, and the structure statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub kill_chains: Vec<KillChain>,
    pub cooperative: CooperativeEffectiveness,
    pub statistics: NetworkAnalysis,
}

struct Frame {
    current: String,
    stage: Stage,
    path: Vec<String>,
    edges: Vec<Edge>,
}

/// Enumerate every valid kill chain against `target_id`.
///
/// Preconditions are checked up front: the target must exist and belong to
/// the red faction, and the blue side must field at least one living
/// sensor, command node and striker. Violations come back as a
/// [`SearchFailure`], never a panic.
pub fn search_kill_chains(
    nodes: &[Node],
    edges: &[Edge],
    target_id: &str,
    config: &SearchConfig,
) -> Result<SearchReport, SearchFailure> {
    let by_id: FxHashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    // Edges may arrive without ids; those cannot be keyed and are resolved
    // from the hop itself instead.
    let edge_by_id: FxHashMap<&str, &Edge> = edges
        .iter()
        .filter(|e| !e.id.is_empty())
        .map(|e| (e.id.as_str(), e))
        .collect();

    match by_id.get(target_id) {
        None => {
            return Err(SearchFailure {
                kind: SearchFailureKind::InvalidTarget,
                reason: format!("target node '{target_id}' does not exist"),
                suggestions: vec!["select an existing node as the target".to_string()],
                analysis: None,
            })
        }
        Some(target) if target.faction != Faction::Red => {
            return Err(SearchFailure {
                kind: SearchFailureKind::InvalidTarget,
                reason: format!("node '{}' is not a red-faction target", target.name),
                suggestions: vec!["select a red-faction node as the target".to_string()],
                analysis: None,
            })
        }
        Some(_) => {}
    }

    let index = AdjacencyIndex::build(nodes, edges);
    let analysis = analyze_network(nodes, &index, target_id);

    let mut missing = Vec::new();
    if analysis.sensor_count == 0 {
        missing.push(BaseType::Sensor);
    }
    if analysis.command_count == 0 {
        missing.push(BaseType::Command);
    }
    if analysis.striker_count == 0 {
        missing.push(BaseType::Striker);
    }
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|t| t.to_string()).collect();
        return Err(SearchFailure {
            kind: SearchFailureKind::IncompleteNetwork,
            reason: format!("blue network has no living {} nodes", names.join(", ")),
            suggestions: missing
                .iter()
                .map(|t| match t {
                    BaseType::Sensor => "deploy a sensor to detect enemy targets".to_string(),
                    BaseType::Command => {
                        "deploy a command node to coordinate engagements".to_string()
                    }
                    _ => "deploy a striker to engage the target".to_string(),
                })
                .collect(),
            analysis: Some(analysis),
        });
    }

    let mut chains: Vec<KillChain> = Vec::new();
    let mut stack: Vec<Frame> = nodes
        .iter()
        .filter(|n| {
            n.faction == Faction::Blue && n.base_type() == BaseType::Sensor && n.is_alive()
        })
        .map(|sensor| Frame {
            current: sensor.id.clone(),
            stage: Stage::AtSensor,
            path: vec![sensor.id.clone()],
            edges: Vec::new(),
        })
        .collect();

    while let Some(frame) = stack.pop() {
        if chains.len() >= config.max_chains {
            debug!(max_chains = config.max_chains, "chain enumeration capped");
            break;
        }

        let required = frame.stage.required_edge();
        for neighbor in index.neighbors(&frame.current) {
            if neighbor.kind != required {
                continue;
            }
            let Some(next) = by_id.get(neighbor.target.as_str()) else {
                continue;
            };
            if !next.is_alive() {
                continue;
            }

            match frame.stage.next_base_type() {
                None => {
                    // Final hop: must land exactly on the requested target.
                    if neighbor.target == target_id {
                        let mut path = frame.path.clone();
                        path.push(neighbor.target.clone());
                        let mut chain_edges = frame.edges.clone();
                        chain_edges.push(resolve_edge(&edge_by_id, &frame, neighbor));

                        chains.push(KillChain {
                            id: format!("chain_{}", chains.len() + 1),
                            length: path.len(),
                            path,
                            edges: chain_edges,
                            effectiveness: 0.0,
                        });
                    }
                }
                Some(required_type) => {
                    if next.faction != Faction::Blue
                        || next.base_type() != required_type
                        || frame.path.contains(&neighbor.target)
                    {
                        continue;
                    }
                    let mut path = frame.path.clone();
                    path.push(neighbor.target.clone());
                    let mut chain_edges = frame.edges.clone();
                    chain_edges.push(resolve_edge(&edge_by_id, &frame, neighbor));

                    stack.push(Frame {
                        current: neighbor.target.clone(),
                        stage: frame.stage.advance().unwrap_or(Stage::AtStriker),
                        path,
                        edges: chain_edges,
                    });
                }
            }
        }
    }

    if chains.is_empty() {
        return Err(no_path_failure(nodes, edges, &index, target_id, analysis));
    }

    for chain in &mut chains {
        // Score against the traversed edges only, so each hop is judged by
        // the edge kind it was actually reached through.
        chain.effectiveness = chain_effectiveness(&chain.path, nodes, &chain.edges);
    }
    chains.sort_by(|a, b| b.effectiveness.total_cmp(&a.effectiveness));

    let cooperative = cooperative_effectiveness(&chains);
    info!(
        target = target_id,
        chains = chains.len(),
        best = chains.first().map(|c| c.effectiveness).unwrap_or(0.0),
        cooperative = cooperative.final_effectiveness,
        "kill-chain search complete"
    );

    Ok(SearchReport {
        kill_chains: chains,
        cooperative,
        statistics: analysis,
    })
}

/// Prefer the caller's edge (with quality/distance annotations) when the
/// index hop came from a known edge id. The looked-up edge must describe
/// this exact hop; anything else falls back to an edge derived from the
/// hop itself.
fn resolve_edge(
    edge_by_id: &FxHashMap<&str, &Edge>,
    frame: &Frame,
    neighbor: &crate::graph::Neighbor,
) -> Edge {
    edge_by_id
        .get(neighbor.edge_id.as_str())
        .filter(|e| {
            e.source == frame.current && e.target == neighbor.target && e.kind == neighbor.kind
        })
        .map(|e| (*e).clone())
        .unwrap_or_else(|| {
            let mut edge = Edge::new(&frame.current, &neighbor.target, neighbor.kind);
            edge.id = neighbor.edge_id.clone();
            edge
        })
}

fn analyze_network(nodes: &[Node], index: &AdjacencyIndex, target_id: &str) -> NetworkAnalysis {
    let living_blue = |base_type: BaseType| {
        nodes
            .iter()
            .filter(|n| {
                n.faction == Faction::Blue && n.base_type() == base_type && n.is_alive()
            })
            .count()
    };

    let sensor_count = living_blue(BaseType::Sensor);
    let command_count = living_blue(BaseType::Command);
    let striker_count = living_blue(BaseType::Striker);

    let strikers_can_hit_target = nodes
        .iter()
        .filter(|n| {
            n.faction == Faction::Blue && n.base_type() == BaseType::Striker && n.is_alive()
        })
        .filter(|striker| {
            index
                .neighbors(&striker.id)
                .iter()
                .any(|hop| hop.target == target_id && hop.kind == EdgeKind::Strike)
        })
        .count();

    NetworkAnalysis {
        sensor_count,
        command_count,
        striker_count,
        strikers_can_hit_target,
        has_basic_structure: sensor_count > 0 && command_count > 0 && striker_count > 0,
    }
}

/// Diagnose why no chain exists in a structurally complete network by
/// checking each stage's required linkage in turn.
fn no_path_failure(
    nodes: &[Node],
    edges: &[Edge],
    index: &AdjacencyIndex,
    target_id: &str,
    analysis: NetworkAnalysis,
) -> SearchFailure {
    let mut reasons = Vec::new();
    let mut suggestions = Vec::new();

    let living_blue = |n: &&Node, base_type: BaseType| {
        n.faction == Faction::Blue && n.base_type() == base_type && n.is_alive()
    };

    let has_detection_link = nodes
        .iter()
        .filter(|n| living_blue(n, BaseType::Sensor))
        .any(|sensor| {
            index.neighbors(&sensor.id).iter().any(|hop| {
                hop.kind == EdgeKind::Detection
                    && nodes
                        .iter()
                        .any(|n| n.id == hop.target && living_blue(&n, BaseType::Command))
            })
        });
    if !has_detection_link {
        reasons.push("no detection link connects a sensor to a command node".to_string());
        if edges.iter().all(|e| e.kind != EdgeKind::Detection) {
            suggestions.push("no detection edges exist; move sensors into detection range or regenerate connections".to_string());
        } else {
            suggestions.push(
                "route a detection link from a sensor to a blue command node".to_string(),
            );
        }
    }

    let has_communication_link = nodes
        .iter()
        .filter(|n| living_blue(n, BaseType::Command))
        .any(|command| {
            index.neighbors(&command.id).iter().any(|hop| {
                hop.kind == EdgeKind::Communication
                    && nodes
                        .iter()
                        .any(|n| n.id == hop.target && living_blue(&n, BaseType::Striker))
            })
        });
    if !has_communication_link {
        reasons.push("no communication link connects a command node to a striker".to_string());
        suggestions.push(
            "add a communication link between the command node and a striker".to_string(),
        );
    }

    if analysis.strikers_can_hit_target == 0 {
        reasons.push("no striker has a strike edge reaching the target".to_string());
        suggestions
            .push("move a striker into strike range of the target, or check that a strike edge reaches it".to_string());
    }

    if reasons.is_empty() {
        reasons.push("network links do not compose into a complete kill chain".to_string());
        suggestions.push(
            "verify the detection → communication → strike sequence between the stages"
                .to_string(),
        );
    }

    SearchFailure {
        kind: SearchFailureKind::NoPathFound,
        reason: reasons.join("; "),
        suggestions,
        analysis: Some(analysis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;

    fn canonical_nodes() -> Vec<Node> {
        vec![
            Node::sensor("s", "Sensor", Faction::Blue, 0.0, 0.0),
            Node::command("c", "Command", Faction::Blue, 50.0, 0.0),
            Node::striker("k", "Striker", Faction::Blue, 100.0, 0.0),
            Node::command("t", "Target", Faction::Red, 150.0, 0.0),
        ]
    }

    fn canonical_edges() -> Vec<Edge> {
        vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("c", "k", EdgeKind::Communication),
            Edge::new("k", "t", EdgeKind::Strike),
        ]
    }

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    #[test]
    fn test_canonical_chain_found() {
        let report =
            search_kill_chains(&canonical_nodes(), &canonical_edges(), "t", &config()).unwrap();

        assert_eq!(report.kill_chains.len(), 1);
        let chain = &report.kill_chains[0];
        assert_eq!(chain.path, vec!["s", "c", "k", "t"]);
        assert_eq!(chain.length, 4);
        assert!(chain.effectiveness > 0.0 && chain.effectiveness <= 1.0);
        let kinds: Vec<EdgeKind> = chain.edges.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EdgeKind::Detection, EdgeKind::Communication, EdgeKind::Strike]
        );
        assert_eq!(report.statistics.strikers_can_hit_target, 1);
    }

    #[test]
    fn test_missing_target_is_invalid() {
        let failure =
            search_kill_chains(&canonical_nodes(), &canonical_edges(), "ghost", &config())
                .unwrap_err();
        assert_eq!(failure.kind, SearchFailureKind::InvalidTarget);
    }

    #[test]
    fn test_blue_target_is_invalid() {
        let failure = search_kill_chains(&canonical_nodes(), &canonical_edges(), "c", &config())
            .unwrap_err();
        assert_eq!(failure.kind, SearchFailureKind::InvalidTarget);
        assert!(!failure.suggestions.is_empty());
    }

    #[test]
    fn test_incomplete_network_names_missing_types() {
        let nodes = vec![
            Node::sensor("s", "Sensor", Faction::Blue, 0.0, 0.0),
            Node::command("t", "Target", Faction::Red, 100.0, 0.0),
        ];
        let failure = search_kill_chains(&nodes, &[], "t", &config()).unwrap_err();
        assert_eq!(failure.kind, SearchFailureKind::IncompleteNetwork);
        assert!(failure.reason.contains("command"));
        assert!(failure.reason.contains("striker"));
        assert_eq!(failure.suggestions.len(), 2);
    }

    #[test]
    fn test_missing_communication_edge_is_diagnosed() {
        let edges = vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("k", "t", EdgeKind::Strike),
        ];
        let failure =
            search_kill_chains(&canonical_nodes(), &edges, "t", &config()).unwrap_err();

        assert_eq!(failure.kind, SearchFailureKind::NoPathFound);
        assert!(failure.reason.contains("communication"));
        assert!(failure
            .suggestions
            .iter()
            .any(|s| s.contains("command") && s.contains("striker")));
    }

    #[test]
    fn test_wrong_edge_kind_is_not_traversed() {
        // Communication where detection is required.
        let edges = vec![
            Edge::new("s", "c", EdgeKind::Communication),
            Edge::new("c", "k", EdgeKind::Communication),
            Edge::new("k", "t", EdgeKind::Strike),
        ];
        let failure =
            search_kill_chains(&canonical_nodes(), &edges, "t", &config()).unwrap_err();
        assert_eq!(failure.kind, SearchFailureKind::NoPathFound);
        assert!(failure.reason.contains("detection"));
    }

    #[test]
    fn test_dead_nodes_break_the_chain() {
        let mut nodes = canonical_nodes();
        nodes[1].hp = 0.0;
        let failure =
            search_kill_chains(&nodes, &canonical_edges(), "t", &config()).unwrap_err();
        assert_eq!(failure.kind, SearchFailureKind::IncompleteNetwork);
    }

    #[test]
    fn test_multiple_chains_sorted_by_effectiveness() {
        let mut nodes = canonical_nodes();
        nodes.push(Node::sensor("s2", "FarSensor", Faction::Blue, 0.0, 180.0));
        let mut edges = canonical_edges();
        edges.push(Edge::new("s2", "c", EdgeKind::Detection));

        let report = search_kill_chains(&nodes, &edges, "t", &config()).unwrap();
        assert_eq!(report.kill_chains.len(), 2);
        assert!(
            report.kill_chains[0].effectiveness >= report.kill_chains[1].effectiveness
        );
        assert!(
            report.cooperative.final_effectiveness
                >= report.cooperative.max_effectiveness - 1e-12
        );
        // The near sensor's chain wins.
        assert_eq!(report.kill_chains[0].path[0], "s");
    }

    #[test]
    fn test_node_not_revisited_within_one_chain() {
        // A striker that doubles as relay cannot appear twice on one path.
        let nodes = vec![
            Node::sensor("s", "S", Faction::Blue, 0.0, 0.0),
            Node::command("c", "C", Faction::Blue, 40.0, 0.0),
            Node::striker("k", "K", Faction::Blue, 80.0, 0.0),
            Node::command("t", "T", Faction::Red, 120.0, 0.0),
        ];
        let edges = vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("c", "k", EdgeKind::Communication),
            Edge::new("k", "t", EdgeKind::Strike),
            // Back-edge that could loop if revisits were allowed.
            Edge::new("k", "c", EdgeKind::Communication),
        ];
        let report = search_kill_chains(&nodes, &edges, "t", &config()).unwrap();
        for chain in &report.kill_chains {
            let mut seen = std::collections::HashSet::new();
            assert!(chain.path.iter().all(|id| seen.insert(id.clone())));
            assert_eq!(chain.length, 4);
        }
    }

    #[test]
    fn test_max_chains_cap_respected() {
        let mut nodes = canonical_nodes();
        let mut edges = canonical_edges();
        for i in 0..5 {
            let id = format!("s{i}");
            nodes.push(Node::sensor(&id, &id, Faction::Blue, 0.0, 10.0 * i as f64));
            edges.push(Edge::new(&id, "c", EdgeKind::Detection));
        }

        let config = SearchConfig { max_chains: 3 };
        let report = search_kill_chains(&nodes, &edges, "t", &config).unwrap();
        assert_eq!(report.kill_chains.len(), 3);
    }

    #[test]
    fn test_edges_without_ids_resolve_to_their_hops() {
        // Scenario files may omit edge ids entirely; every hop must still
        // carry the edge it was traversed through.
        let mut edges = canonical_edges();
        for edge in &mut edges {
            edge.id = String::new();
        }
        let report =
            search_kill_chains(&canonical_nodes(), &edges, "t", &config()).unwrap();

        let chain = &report.kill_chains[0];
        let hops: Vec<(&str, &str, EdgeKind)> = chain
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str(), e.kind))
            .collect();
        assert_eq!(
            hops,
            vec![
                ("s", "c", EdgeKind::Detection),
                ("c", "k", EdgeKind::Communication),
                ("k", "t", EdgeKind::Strike),
            ]
        );
        assert!(chain.effectiveness > 0.0);
    }

    #[test]
    fn test_caller_edge_annotations_survive_into_the_chain() {
        let mut edges = canonical_edges();
        edges[0] = edges[0].clone().with_quality(0.42).with_distance(50.0);

        let report =
            search_kill_chains(&canonical_nodes(), &edges, "t", &config()).unwrap();
        let first_hop = &report.kill_chains[0].edges[0];
        assert_eq!(first_hop.quality, Some(0.42));
        assert_eq!(first_hop.distance, Some(50.0));
    }
}
