//! Effectiveness model: per-segment success probability, chain composition,
//! and cooperative (union) effectiveness across chains.

use crate::models::{Edge, EdgeKind, KillChain, Node};
use serde::{Deserialize, Serialize};

fn clamp01(p: f64) -> f64 {
    p.clamp(0.0, 1.0)
}

/// Success probability of one hop, as a function of the endpoint nodes'
/// performance attributes and their Euclidean distance.
///
/// Beyond the relevant range a residual probability remains (degraded
/// detection, intermittent comms, marginal strikes) rather than a hard
/// zero. The result is clamped to [0, 1].
pub fn segment_probability(source: &Node, target: &Node, kind: EdgeKind) -> f64 {
    let distance = source.distance_to(target);
    let perf = &source.performance;

    let probability = match kind {
        EdgeKind::Detection => {
            let mut p = perf.detection_probability();
            let range = perf.detection_range();
            if distance > range {
                p *= 0.1;
            } else {
                let range_factor = 1.0 - distance / range;
                p *= 0.5 + 0.5 * range_factor;
            }
            p * perf.anti_jamming()
        }
        EdgeKind::Communication => {
            let avg_reliability =
                (perf.reliability() + target.performance.reliability()) / 2.0;
            let range = perf.comm_range();
            if distance > range {
                avg_reliability * 0.2
            } else {
                let range_factor = 1.0 - distance / range;
                avg_reliability * (0.7 + 0.3 * range_factor)
            }
        }
        EdgeKind::Command => {
            let capacity_factor = (perf.processing_capacity() / 500.0).min(1.0);
            let delay_factor = (1.0 - perf.decision_delay() / 10.0).max(0.5);
            let mut p = (capacity_factor + delay_factor) / 2.0;
            if distance > perf.command_range() {
                p *= 0.3;
            }
            p
        }
        EdgeKind::Strike => {
            let mut p = perf.damage_rate();
            let range = perf.strike_range();
            if distance > range {
                p *= 0.1;
            } else {
                let range_factor = 1.0 - distance / range;
                // CEP accuracy: smaller is better.
                let accuracy_factor = (1.0 - perf.accuracy() / 50.0).max(0.5);
                p *= 0.6 + 0.2 * range_factor + 0.2 * accuracy_factor;
            }
            p
        }
        EdgeKind::Manual => 0.8,
    };

    clamp01(probability)
}

/// Joint success probability of one chain: the product of its segment
/// probabilities along the path.
///
/// The edge for each hop is looked up in either direction; hops without a
/// matching edge are scored as communication links.
pub fn chain_effectiveness(path: &[String], nodes: &[Node], edges: &[Edge]) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }

    let mut total = 1.0;
    for pair in path.windows(2) {
        let (source_id, target_id) = (&pair[0], &pair[1]);
        let source = nodes.iter().find(|n| &n.id == source_id);
        let target = nodes.iter().find(|n| &n.id == target_id);
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };

        let kind = edges
            .iter()
            .find(|e| {
                (&e.source == source_id && &e.target == target_id)
                    || (&e.source == target_id && &e.target == source_id)
            })
            .map(|e| e.kind)
            .unwrap_or(EdgeKind::Communication);

        total *= segment_probability(source, target, kind);
    }
    clamp01(total)
}

/// Chain counts bucketed by effectiveness band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessDistribution {
    /// Chains with effectiveness >= 0.7
    pub high: usize,
    /// Chains with effectiveness in [0.4, 0.7)
    pub medium: usize,
    /// Chains with effectiveness < 0.4
    pub low: usize,
}

impl EffectivenessDistribution {
    fn from_values(values: &[f64]) -> Self {
        Self {
            high: values.iter().filter(|e| **e >= 0.7).count(),
            medium: values.iter().filter(|e| **e >= 0.4 && **e < 0.7).count(),
            low: values.iter().filter(|e| **e < 0.4).count(),
        }
    }
}

/// Joint assessment of several candidate chains against one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooperativeEffectiveness {
    /// P(at least one chain succeeds) = 1 - prod(1 - p_i).
    pub final_effectiveness: f64,
    /// Composite 0-100 score blending average, best chain, synergy and count.
    pub score: f64,
    pub chain_count: usize,
    /// Gain of the union over the best single chain.
    pub synergy: f64,
    pub avg_effectiveness: f64,
    pub max_effectiveness: f64,
    pub min_effectiveness: f64,
    pub distribution: EffectivenessDistribution,
}

/// Compose multiple chains into a cooperative assessment.
///
/// The union bound guarantees `final_effectiveness >= max_effectiveness`,
/// with equality when only one chain exists.
pub fn cooperative_effectiveness(chains: &[KillChain]) -> CooperativeEffectiveness {
    if chains.is_empty() {
        return CooperativeEffectiveness::default();
    }

    let values: Vec<f64> = chains.iter().map(|c| c.effectiveness).collect();
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    let max = values.iter().cloned().fold(0.0_f64, f64::max);
    let min = values.iter().cloned().fold(1.0_f64, f64::min);

    let failure_product: f64 = values.iter().map(|p| 1.0 - p).product();
    let cooperative = clamp01(1.0 - failure_product);
    let synergy = (cooperative - max).max(0.0);

    let count_bonus = (chains.len() as f64 * 2.0).min(10.0);
    let score = avg * 40.0 + max * 30.0 + synergy * 20.0 + count_bonus;

    CooperativeEffectiveness {
        final_effectiveness: cooperative,
        score,
        chain_count: chains.len(),
        synergy,
        avg_effectiveness: avg,
        max_effectiveness: max,
        min_effectiveness: min,
        distribution: EffectivenessDistribution::from_values(&values),
    }
}

/// Summary of chain effectiveness across the whole network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEffectiveness {
    /// Average effectiveness of the valid chains.
    pub overall: f64,
    pub avg_chain_effectiveness: f64,
    pub max_chain_effectiveness: f64,
    pub min_chain_effectiveness: f64,
    /// Chains with a positive success probability.
    pub valid_chains: usize,
    pub total_chains: usize,
    pub distribution: EffectivenessDistribution,
}

/// Aggregate the effectiveness already carried by each chain.
pub fn network_effectiveness(chains: &[KillChain]) -> NetworkEffectiveness {
    let valid: Vec<f64> = chains
        .iter()
        .map(|c| c.effectiveness)
        .filter(|e| *e > 0.0)
        .collect();

    if valid.is_empty() {
        return NetworkEffectiveness {
            total_chains: chains.len(),
            ..Default::default()
        };
    }

    let avg = valid.iter().sum::<f64>() / valid.len() as f64;
    NetworkEffectiveness {
        overall: avg,
        avg_chain_effectiveness: avg,
        max_chain_effectiveness: valid.iter().cloned().fold(0.0_f64, f64::max),
        min_chain_effectiveness: valid.iter().cloned().fold(1.0_f64, f64::min),
        valid_chains: valid.len(),
        total_chains: chains.len(),
        distribution: EffectivenessDistribution::from_values(&valid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Faction, Performance, SensorPerformance, StrikerPerformance,
    };

    fn chain_with(effectiveness: f64) -> KillChain {
        KillChain {
            id: "chain".to_string(),
            path: vec![],
            edges: vec![],
            effectiveness,
            length: 4,
        }
    }

    #[test]
    fn test_detection_probability_decays_with_distance() {
        let sensor = Node::sensor("s", "S", Faction::Blue, 0.0, 0.0);
        let near = Node::command("c1", "C1", Faction::Blue, 10.0, 0.0);
        let far = Node::command("c2", "C2", Faction::Blue, 190.0, 0.0);
        let out = Node::command("c3", "C3", Faction::Blue, 500.0, 0.0);

        let p_near = segment_probability(&sensor, &near, EdgeKind::Detection);
        let p_far = segment_probability(&sensor, &far, EdgeKind::Detection);
        let p_out = segment_probability(&sensor, &out, EdgeKind::Detection);

        assert!(p_near > p_far);
        assert!(p_far > p_out);
        // Out of range collapses to a 10% residual of base * jamming.
        assert!((p_out - 0.8 * 0.1 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_detection_at_zero_distance_is_base_times_jamming() {
        let mut sensor = Node::sensor("s", "S", Faction::Blue, 0.0, 0.0);
        sensor.performance = Performance::Sensor(SensorPerformance {
            detection_probability: 0.9,
            anti_jamming: 0.8,
            ..Default::default()
        });
        let target = Node::command("c", "C", Faction::Blue, 0.0, 0.0);
        let p = segment_probability(&sensor, &target, EdgeKind::Detection);
        assert!((p - 0.9 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_strike_probability_rewards_accuracy() {
        let mut sharp = Node::striker("k1", "K1", Faction::Blue, 0.0, 0.0);
        sharp.performance = Performance::Striker(StrikerPerformance {
            accuracy: 5.0,
            ..Default::default()
        });
        let mut blunt = Node::striker("k2", "K2", Faction::Blue, 0.0, 0.0);
        blunt.performance = Performance::Striker(StrikerPerformance {
            accuracy: 45.0,
            ..Default::default()
        });
        let target = Node::command("t", "T", Faction::Red, 50.0, 0.0);

        let p_sharp = segment_probability(&sharp, &target, EdgeKind::Strike);
        let p_blunt = segment_probability(&blunt, &target, EdgeKind::Strike);
        assert!(p_sharp > p_blunt);
    }

    #[test]
    fn test_command_segment_penalized_beyond_range() {
        let command = Node::command("c", "C", Faction::Blue, 0.0, 0.0);
        let near = Node::striker("k1", "K1", Faction::Blue, 100.0, 0.0);
        let far = Node::striker("k2", "K2", Faction::Blue, 400.0, 0.0);

        let p_near = segment_probability(&command, &near, EdgeKind::Command);
        let p_far = segment_probability(&command, &far, EdgeKind::Command);
        assert!((p_far - p_near * 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_segment_probabilities_stay_in_unit_interval() {
        let nodes = vec![
            Node::sensor("a", "A", Faction::Blue, 0.0, 0.0),
            Node::command("b", "B", Faction::Blue, 120.0, 40.0),
            Node::striker("c", "C", Faction::Blue, 80.0, -60.0),
            Node::support("d", "D", Faction::Red, 300.0, 300.0),
        ];
        let kinds = [
            EdgeKind::Detection,
            EdgeKind::Communication,
            EdgeKind::Command,
            EdgeKind::Strike,
            EdgeKind::Manual,
        ];
        for source in &nodes {
            for target in &nodes {
                for kind in kinds {
                    let p = segment_probability(source, target, kind);
                    assert!((0.0..=1.0).contains(&p), "{kind} out of range: {p}");
                }
            }
        }
    }

    #[test]
    fn test_chain_effectiveness_is_segment_product() {
        let nodes = vec![
            Node::sensor("s", "S", Faction::Blue, 0.0, 0.0),
            Node::command("c", "C", Faction::Blue, 50.0, 0.0),
            Node::striker("k", "K", Faction::Blue, 100.0, 0.0),
            Node::command("t", "T", Faction::Red, 150.0, 0.0),
        ];
        let edges = vec![
            Edge::new("s", "c", EdgeKind::Detection),
            Edge::new("c", "k", EdgeKind::Communication),
            Edge::new("k", "t", EdgeKind::Strike),
        ];
        let path: Vec<String> = ["s", "c", "k", "t"].iter().map(|s| s.to_string()).collect();

        let expected = segment_probability(&nodes[0], &nodes[1], EdgeKind::Detection)
            * segment_probability(&nodes[1], &nodes[2], EdgeKind::Communication)
            * segment_probability(&nodes[2], &nodes[3], EdgeKind::Strike);
        let actual = chain_effectiveness(&path, &nodes, &edges);
        assert!((actual - expected).abs() < 1e-9);
        assert!(actual > 0.0 && actual <= 1.0);
    }

    #[test]
    fn test_cooperative_dominates_best_chain() {
        let chains = vec![chain_with(0.6), chain_with(0.3), chain_with(0.5)];
        let coop = cooperative_effectiveness(&chains);

        assert!(coop.final_effectiveness >= coop.max_effectiveness);
        assert!(coop.synergy > 0.0);
        let expected = 1.0 - (1.0 - 0.6) * (1.0 - 0.3) * (1.0 - 0.5);
        assert!((coop.final_effectiveness - expected).abs() < 1e-9);
    }

    #[test]
    fn test_cooperative_equals_max_for_single_chain() {
        let coop = cooperative_effectiveness(&[chain_with(0.42)]);
        assert!((coop.final_effectiveness - 0.42).abs() < 1e-9);
        assert_eq!(coop.synergy, 0.0);
        assert_eq!(coop.chain_count, 1);
    }

    #[test]
    fn test_composite_score_blend() {
        let coop = cooperative_effectiveness(&[chain_with(0.5), chain_with(0.5)]);
        let union = 1.0 - 0.5 * 0.5;
        let expected = 0.5 * 40.0 + 0.5 * 30.0 + (union - 0.5) * 20.0 + 4.0;
        assert!((coop.score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_network_effectiveness_ignores_dead_chains() {
        let summary = network_effectiveness(&[chain_with(0.8), chain_with(0.0), chain_with(0.4)]);
        assert_eq!(summary.valid_chains, 2);
        assert_eq!(summary.total_chains, 3);
        assert!((summary.overall - 0.6).abs() < 1e-9);
        assert_eq!(summary.distribution.high, 1);
        assert_eq!(summary.distribution.medium, 1);
    }
}
