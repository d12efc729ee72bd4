//! Rule-based connection generation.
//!
//! Derives directed edges between nodes from spatial range and faction
//! rules, using each node's declared performance attributes. Three rule
//! families apply per ordered pair:
//!
//! - detection: any sensor may detect any node in detection range, same
//!   faction (cooperative sensing) or not (reconnaissance);
//! - communication: same faction only, within the larger of the two
//!   endpoints' comm/command range, one edge per unordered pair;
//! - strike: any striker may engage any node in strike range, same faction
//!   (fire support) or not.
//!
//! The generator never mutates the node list; quality and distance are
//! attached only to the edges it creates.

use crate::models::{BaseType, Edge, EdgeKind, Faction, Node};
use crate::scoring::segment_probability;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// Which factions participate in generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkMode {
    /// Blue nodes only.
    FriendlyOnly,
    /// Red nodes only.
    EnemyOnly,
    /// All nodes, cross-faction rules in effect.
    #[default]
    Mixed,
}

/// Options for [`generate_connections`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub mode: NetworkMode,
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkMode::FriendlyOnly => write!(f, "friendly-only"),
            NetworkMode::EnemyOnly => write!(f, "enemy-only"),
            NetworkMode::Mixed => write!(f, "mixed"),
        }
    }
}

fn mode_filter(node: &Node, mode: NetworkMode) -> bool {
    match mode {
        NetworkMode::FriendlyOnly => node.faction == Faction::Blue,
        NetworkMode::EnemyOnly => node.faction == Faction::Red,
        NetworkMode::Mixed => true,
    }
}

fn can_detect(source: &Node, target: &Node) -> bool {
    source.base_type() == BaseType::Sensor
        && source.distance_to(target) <= source.performance.detection_range()
}

fn can_communicate(a: &Node, b: &Node) -> bool {
    if a.faction != b.faction {
        // Encrypted channels: cross-faction communication never forms.
        return false;
    }
    let max_range = a.performance.comm_range().max(b.performance.comm_range());
    a.distance_to(b) <= max_range
}

fn can_strike(source: &Node, target: &Node) -> bool {
    source.base_type() == BaseType::Striker
        && source.distance_to(target) <= source.performance.strike_range()
}

fn make_edge(source: &Node, target: &Node, kind: EdgeKind) -> Edge {
    let quality = segment_probability(source, target, kind);
    Edge::new(&source.id, &target.id, kind)
        .with_quality(quality)
        .with_distance(source.distance_to(target))
        .with_cross_faction(source.faction != target.faction)
}

/// Generate the edge set implied by the node snapshot under the given mode.
pub fn generate_connections(nodes: &[Node], options: &GeneratorOptions) -> Vec<Edge> {
    let active: Vec<&Node> = nodes
        .iter()
        .filter(|n| mode_filter(n, options.mode))
        .collect();

    if active.len() < 2 {
        return Vec::new();
    }

    let mut edges = Vec::new();
    // One communication edge per unordered pair.
    let mut comm_pairs: HashSet<(String, String)> = HashSet::new();

    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            let (a, b) = (active[i], active[j]);

            if can_detect(a, b) {
                edges.push(make_edge(a, b, EdgeKind::Detection));
            }
            if can_detect(b, a) {
                edges.push(make_edge(b, a, EdgeKind::Detection));
            }

            if can_communicate(a, b) {
                let key = if a.id < b.id {
                    (a.id.clone(), b.id.clone())
                } else {
                    (b.id.clone(), a.id.clone())
                };
                if comm_pairs.insert(key) {
                    edges.push(make_edge(a, b, EdgeKind::Communication));
                }
            }

            if can_strike(a, b) {
                edges.push(make_edge(a, b, EdgeKind::Strike));
            }
            if can_strike(b, a) {
                edges.push(make_edge(b, a, EdgeKind::Strike));
            }
        }
    }

    let cross = edges.iter().filter(|e| e.cross_faction).count();
    info!(
        nodes = active.len(),
        edges = edges.len(),
        cross_faction = cross,
        mode = ?options.mode,
        "generated connections"
    );
    debug!(
        detection = edges.iter().filter(|e| e.kind == EdgeKind::Detection).count(),
        communication = edges.iter().filter(|e| e.kind == EdgeKind::Communication).count(),
        strike = edges.iter().filter(|e| e.kind == EdgeKind::Strike).count(),
        "edge kind distribution"
    );

    edges
}

/// Build a manually authored edge between two nodes.
pub fn create_manual_connection(source: &Node, target: &Node) -> Edge {
    Edge::new(&source.id, &target.id, EdgeKind::Manual)
        .with_distance(source.distance_to(target))
        .with_cross_faction(source.faction != target.faction)
}

/// Whether any edge already links the two ids, in either direction.
pub fn connection_exists(edges: &[Edge], source_id: &str, target_id: &str) -> bool {
    edges.iter().any(|e| {
        (e.source == source_id && e.target == target_id)
            || (e.source == target_id && e.target == source_id)
    })
}

/// Whether one faction fields a complete sensor/command/striker chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionCompleteness {
    pub has_full_chain: bool,
    pub missing_sensor: bool,
    pub missing_command: bool,
    pub missing_striker: bool,
}

/// Check which kill-chain roles a faction is missing.
pub fn faction_completeness(nodes: &[Node], faction: Faction) -> FactionCompleteness {
    let has = |base_type: BaseType| {
        nodes
            .iter()
            .any(|n| n.faction == faction && n.base_type() == base_type)
    };
    let (sensor, command, striker) = (
        has(BaseType::Sensor),
        has(BaseType::Command),
        has(BaseType::Striker),
    );
    FactionCompleteness {
        has_full_chain: sensor && command && striker,
        missing_sensor: !sensor,
        missing_command: !command,
        missing_striker: !striker,
    }
}
