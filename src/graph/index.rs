//! Adjacency index over a node/edge snapshot.

use crate::models::{Edge, EdgeKind, Node};
use rustc_hash::FxHashMap;
use tracing::warn;

/// One outgoing hop from a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub target: String,
    pub kind: EdgeKind,
    pub edge_id: String,
}

/// Directed adjacency lists keyed by node id, built in O(V+E).
///
/// Edges whose source id is not among the supplied nodes are excluded
/// rather than treated as fatal, so partially-loaded graphs still index;
/// the exclusions stay observable through [`AdjacencyIndex::skipped_edges`].
#[derive(Debug, Default)]
pub struct AdjacencyIndex {
    outgoing: FxHashMap<String, Vec<Neighbor>>,
    skipped: Vec<String>,
}

impl AdjacencyIndex {
    pub fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut outgoing: FxHashMap<String, Vec<Neighbor>> =
            FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        for node in nodes {
            outgoing.entry(node.id.clone()).or_default();
        }

        let mut skipped = Vec::new();
        for edge in edges {
            match outgoing.get_mut(&edge.source) {
                Some(neighbors) => neighbors.push(Neighbor {
                    target: edge.target.clone(),
                    kind: edge.kind,
                    edge_id: edge.id.clone(),
                }),
                None => {
                    warn!(
                        edge_id = %edge.id,
                        source = %edge.source,
                        "edge references unknown source node, excluding from index"
                    );
                    skipped.push(edge.id.clone());
                }
            }
        }

        Self { outgoing, skipped }
    }

    /// Outgoing hops from `node_id`; empty for unknown ids.
    pub fn neighbors(&self, node_id: &str) -> &[Neighbor] {
        self.outgoing.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of edges excluded because their source node was missing.
    pub fn skipped_edges(&self) -> &[String] {
        &self.skipped
    }
}

/// Undirected degree of each node id over the supplied edge list.
pub fn degree_map(nodes: &[Node], edges: &[Edge]) -> FxHashMap<String, usize> {
    let mut degrees: FxHashMap<String, usize> =
        FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
    for node in nodes {
        degrees.entry(node.id.clone()).or_insert(0);
    }
    for edge in edges {
        if let Some(d) = degrees.get_mut(&edge.source) {
            *d += 1;
        }
        if let Some(d) = degrees.get_mut(&edge.target) {
            *d += 1;
        }
    }
    degrees
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Faction;

    fn sample_nodes() -> Vec<Node> {
        vec![
            Node::sensor("s1", "S1", Faction::Blue, 0.0, 0.0),
            Node::command("c1", "C1", Faction::Blue, 50.0, 0.0),
        ]
    }

    #[test]
    fn test_index_links_known_sources() {
        let nodes = sample_nodes();
        let edges = vec![Edge::new("s1", "c1", EdgeKind::Detection)];
        let index = AdjacencyIndex::build(&nodes, &edges);

        let neighbors = index.neighbors("s1");
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].target, "c1");
        assert_eq!(neighbors[0].kind, EdgeKind::Detection);
        assert!(index.skipped_edges().is_empty());
    }

    #[test]
    fn test_malformed_edge_is_skipped_but_observable() {
        let nodes = sample_nodes();
        let bad = Edge::new("ghost", "c1", EdgeKind::Communication);
        let bad_id = bad.id.clone();
        let edges = vec![Edge::new("s1", "c1", EdgeKind::Detection), bad];

        let index = AdjacencyIndex::build(&nodes, &edges);
        assert_eq!(index.skipped_edges(), &[bad_id]);
        assert!(index.neighbors("ghost").is_empty());
    }

    #[test]
    fn test_degree_map_counts_both_endpoints() {
        let nodes = sample_nodes();
        let edges = vec![
            Edge::new("s1", "c1", EdgeKind::Detection),
            Edge::new("c1", "s1", EdgeKind::Communication),
        ];
        let degrees = degree_map(&nodes, &edges);
        assert_eq!(degrees["s1"], 2);
        assert_eq!(degrees["c1"], 2);
    }
}
