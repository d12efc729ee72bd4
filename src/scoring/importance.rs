//! Node criticality: capability-weighted importance ranking and
//! failure-impact simulation.

use crate::models::{Edge, KillChain, Node, Performance, Severity};
use crate::scoring::effectiveness::network_effectiveness;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Importance of one node (0-1): a per-role capability score plus a degree
/// bonus and a faction-bridging bonus.
pub fn node_importance(node: &Node, nodes: &[Node], edges: &[Edge]) -> f64 {
    let mut importance = 0.5;

    importance += match &node.performance {
        Performance::Sensor(p) => (p.detection_range / 500.0) * p.detection_probability,
        Performance::Command(p) => {
            (p.processing_capacity / 1000.0) * (1.0 / p.decision_delay.max(1.0))
        }
        Performance::Striker(p) => (p.strike_range / 500.0 + p.damage_rate) / 2.0,
        Performance::Support(p) => {
            (p.comm_distance / 500.0 + p.bandwidth / 200.0 + p.reliability) / 3.0
        }
    };

    let degree = edges
        .iter()
        .filter(|e| e.source == node.id || e.target == node.id)
        .count();
    importance += (degree as f64 / 20.0).min(0.3);

    importance += bridging_factor(node, nodes, edges) * 0.2;

    importance.min(1.0)
}

/// 0.5 when the node's undirected neighbors span more than one faction,
/// else 0. A coarse stand-in for betweenness: faction bridges sit on the
/// paths that matter.
fn bridging_factor(node: &Node, nodes: &[Node], edges: &[Edge]) -> f64 {
    let mut connected: HashSet<&str> = HashSet::new();
    for edge in edges {
        if edge.source == node.id {
            connected.insert(edge.target.as_str());
        }
        if edge.target == node.id {
            connected.insert(edge.source.as_str());
        }
    }

    let factions: HashSet<_> = nodes
        .iter()
        .filter(|n| connected.contains(n.id.as_str()))
        .map(|n| n.faction)
        .collect();

    if factions.len() > 1 {
        0.5
    } else {
        0.0
    }
}

/// One entry of the key-node ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyNode {
    pub node_id: String,
    pub name: String,
    pub importance: f64,
}

/// Rank all nodes by importance, descending, keeping the top `top_n`.
pub fn identify_key_nodes(nodes: &[Node], edges: &[Edge], top_n: usize) -> Vec<KeyNode> {
    let mut ranked: Vec<KeyNode> = nodes
        .iter()
        .map(|node| KeyNode {
            node_id: node.id.clone(),
            name: node.name.clone(),
            importance: node_importance(node, nodes, edges),
        })
        .collect();

    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked.truncate(top_n);
    ranked
}

/// Result of simulating the loss of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureImpact {
    pub node_id: String,
    pub original_effectiveness: f64,
    pub new_effectiveness: f64,
    pub effectiveness_loss: f64,
    /// Kill chains that routed through the removed node.
    pub affected_chains: usize,
    pub surviving_chains: usize,
    /// Incident edges removed along with the node.
    pub removed_edges: usize,
    pub impact_level: Severity,
}

/// Simulate removing a node: its incident edges disappear and every kill
/// chain routed through it is discarded, then network effectiveness is
/// recomputed over what survives.
pub fn assess_node_failure_impact(
    node_id: &str,
    nodes: &[Node],
    edges: &[Edge],
    chains: &[KillChain],
) -> FailureImpact {
    let removed_edges = edges
        .iter()
        .filter(|e| e.source == node_id || e.target == node_id)
        .count();

    let surviving: Vec<KillChain> = chains
        .iter()
        .filter(|c| !c.contains(node_id))
        .cloned()
        .collect();
    let affected = chains.len() - surviving.len();

    let original = network_effectiveness(chains).overall;
    let new = network_effectiveness(&surviving).overall;
    let loss = original - new;

    let node_name = nodes
        .iter()
        .find(|n| n.id == node_id)
        .map(|n| n.name.as_str())
        .unwrap_or("<unknown>");
    debug!(
        node_id,
        node_name, loss, affected, "simulated node failure impact"
    );

    FailureImpact {
        node_id: node_id.to_string(),
        original_effectiveness: original,
        new_effectiveness: new,
        effectiveness_loss: loss,
        affected_chains: affected,
        surviving_chains: surviving.len(),
        removed_edges,
        impact_level: impact_level(loss),
    }
}

fn impact_level(loss: f64) -> Severity {
    if loss >= 0.5 {
        Severity::Critical
    } else if loss >= 0.3 {
        Severity::High
    } else if loss >= 0.1 {
        Severity::Medium
    } else {
        Severity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EdgeKind, Faction, SensorPerformance};

    fn chain(id: &str, path: &[&str], effectiveness: f64) -> KillChain {
        KillChain {
            id: id.to_string(),
            path: path.iter().map(|s| s.to_string()).collect(),
            edges: vec![],
            effectiveness,
            length: path.len(),
        }
    }

    #[test]
    fn test_importance_grows_with_capability() {
        let nodes = vec![
            Node::sensor("weak", "Weak", Faction::Blue, 0.0, 0.0).with_performance(
                Performance::Sensor(SensorPerformance {
                    detection_range: 100.0,
                    detection_probability: 0.5,
                    ..Default::default()
                }),
            ),
            Node::sensor("strong", "Strong", Faction::Blue, 0.0, 0.0).with_performance(
                Performance::Sensor(SensorPerformance {
                    detection_range: 450.0,
                    detection_probability: 0.9,
                    ..Default::default()
                }),
            ),
        ];

        let weak = node_importance(&nodes[0], &nodes, &[]);
        let strong = node_importance(&nodes[1], &nodes, &[]);
        assert!(strong > weak);
    }

    #[test]
    fn test_bridging_node_gains_importance() {
        let nodes = vec![
            Node::sensor("s", "S", Faction::Blue, 0.0, 0.0),
            Node::command("c", "C", Faction::Blue, 10.0, 0.0),
            Node::command("t", "T", Faction::Red, 20.0, 0.0),
        ];
        let bridging_edges = vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("s", "t", EdgeKind::Detection),
        ];
        let local_edges = vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("s", "c", EdgeKind::Communication),
        ];

        let with_bridge = node_importance(&nodes[0], &nodes, &bridging_edges);
        let without = node_importance(&nodes[0], &nodes, &local_edges);
        assert!(with_bridge > without);
    }

    #[test]
    fn test_importance_is_capped_at_one() {
        let nodes = vec![
            Node::sensor("s", "S", Faction::Blue, 0.0, 0.0).with_performance(
                Performance::Sensor(SensorPerformance {
                    detection_range: 500.0,
                    detection_probability: 1.0,
                    ..Default::default()
                }),
            ),
            Node::command("t", "T", Faction::Red, 20.0, 0.0),
        ];
        let edges: Vec<Edge> = (0..30)
            .map(|_| Edge::new("s", "t", EdgeKind::Detection))
            .collect();
        assert_eq!(node_importance(&nodes[0], &nodes, &edges), 1.0);
    }

    #[test]
    fn test_key_nodes_ranked_descending() {
        let nodes = vec![
            Node::support("a", "A", Faction::Blue, 0.0, 0.0),
            Node::command("b", "B", Faction::Blue, 0.0, 0.0),
            Node::striker("c", "C", Faction::Blue, 0.0, 0.0),
        ];
        let ranked = identify_key_nodes(&nodes, &[], 2);
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].importance >= ranked[1].importance);
    }

    #[test]
    fn test_failure_impact_tiers() {
        let nodes = vec![
            Node::sensor("s", "S", Faction::Blue, 0.0, 0.0),
            Node::sensor("s2", "S2", Faction::Blue, 10.0, 0.0),
        ];
        let chains = vec![
            chain("1", &["s", "c", "k", "t"], 0.8),
            chain("2", &["s2", "c", "k", "t"], 0.2),
        ];

        // Losing "s" drops the average from 0.5 to 0.2.
        let impact = assess_node_failure_impact("s", &nodes, &[], &chains);
        assert_eq!(impact.affected_chains, 1);
        assert_eq!(impact.surviving_chains, 1);
        assert!((impact.effectiveness_loss - 0.3).abs() < 1e-9);
        assert_eq!(impact.impact_level, Severity::High);
    }

    #[test]
    fn test_failure_impact_counts_incident_edges() {
        let nodes = vec![
            Node::sensor("s", "S", Faction::Blue, 0.0, 0.0),
            Node::command("c", "C", Faction::Blue, 10.0, 0.0),
        ];
        let edges = vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("c", "s", EdgeKind::Communication),
        ];
        let impact = assess_node_failure_impact("s", &nodes, &edges, &[]);
        assert_eq!(impact.removed_edges, 2);
        assert_eq!(impact.impact_level, Severity::Low);
    }
}
