//! Core data models for the kill-web engine.
//!
//! These models are used throughout the crate for representing assets
//! (nodes), typed relations (edges), derived kill chains, and evaluation
//! findings. All types serialize to the camelCase JSON shape used by the
//! surrounding graph-editing layers (`baseType`, `crossFaction`, ...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ownership tag governing which connection rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Blue,
    Red,
    Neutral,
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Faction::Blue => write!(f, "blue"),
            Faction::Red => write!(f, "red"),
            Faction::Neutral => write!(f, "neutral"),
        }
    }
}

/// Role of an asset in the kill chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    Sensor,
    Command,
    Striker,
    Support,
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaseType::Sensor => write!(f, "sensor"),
            BaseType::Command => write!(f, "command"),
            BaseType::Striker => write!(f, "striker"),
            BaseType::Support => write!(f, "support"),
        }
    }
}

/// Sensor performance attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorPerformance {
    /// Detection range (km)
    pub detection_range: f64,
    /// Detection accuracy (m)
    pub detection_accuracy: f64,
    /// Probability of detecting a target in range (0-1)
    pub detection_probability: f64,
    /// Resistance to jamming (0-1)
    pub anti_jamming: f64,
}

impl Default for SensorPerformance {
    fn default() -> Self {
        Self {
            detection_range: 200.0,
            detection_accuracy: 10.0,
            detection_probability: 0.8,
            anti_jamming: 0.7,
        }
    }
}

/// Command node performance attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandPerformance {
    /// Command range (km)
    pub command_range: f64,
    /// Message processing capacity (msgs/s)
    pub processing_capacity: f64,
    /// Decision delay (s)
    pub decision_delay: f64,
    /// Maximum number of subordinate nodes
    pub max_nodes: u32,
}

impl Default for CommandPerformance {
    fn default() -> Self {
        Self {
            command_range: 200.0,
            processing_capacity: 100.0,
            decision_delay: 5.0,
            max_nodes: 20,
        }
    }
}

/// Strike unit performance attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrikerPerformance {
    /// Strike range (km)
    pub strike_range: f64,
    /// Kill probability on a hit (0-1)
    pub damage_rate: f64,
    /// Reaction time (s)
    pub response_time: f64,
    /// Rounds available
    pub ammunition: u32,
    /// Circular error probable (m, smaller is better)
    pub accuracy: f64,
}

impl Default for StrikerPerformance {
    fn default() -> Self {
        Self {
            strike_range: 100.0,
            damage_rate: 0.7,
            response_time: 10.0,
            ammunition: 12,
            accuracy: 20.0,
        }
    }
}

/// Support/relay node performance attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SupportPerformance {
    /// Communication distance (km)
    pub comm_distance: f64,
    /// Bandwidth (Mbps)
    pub bandwidth: f64,
    /// Number of links this node can relay
    pub relay_capacity: u32,
    /// Link reliability (0-1)
    pub reliability: f64,
}

impl Default for SupportPerformance {
    fn default() -> Self {
        Self {
            comm_distance: 200.0,
            bandwidth: 50.0,
            relay_capacity: 5,
            reliability: 0.9,
        }
    }
}

/// Per-role performance attributes, keyed by base type.
///
/// Each variant holds exactly the attributes its role requires, so
/// completeness is checked by construction rather than by key lookups.
/// The accessor methods return role-neutral fallbacks for variants that
/// lack an attribute, which keeps every scoring formula total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "baseType", content = "performance", rename_all = "lowercase")]
pub enum Performance {
    Sensor(SensorPerformance),
    Command(CommandPerformance),
    Striker(StrikerPerformance),
    Support(SupportPerformance),
}

impl Performance {
    pub fn base_type(&self) -> BaseType {
        match self {
            Performance::Sensor(_) => BaseType::Sensor,
            Performance::Command(_) => BaseType::Command,
            Performance::Striker(_) => BaseType::Striker,
            Performance::Support(_) => BaseType::Support,
        }
    }

    pub fn detection_range(&self) -> f64 {
        match self {
            Performance::Sensor(p) => p.detection_range,
            _ => 200.0,
        }
    }

    pub fn detection_probability(&self) -> f64 {
        match self {
            Performance::Sensor(p) => p.detection_probability,
            _ => 0.8,
        }
    }

    pub fn anti_jamming(&self) -> f64 {
        match self {
            Performance::Sensor(p) => p.anti_jamming,
            _ => 0.7,
        }
    }

    pub fn command_range(&self) -> f64 {
        match self {
            Performance::Command(p) => p.command_range,
            _ => 200.0,
        }
    }

    pub fn processing_capacity(&self) -> f64 {
        match self {
            Performance::Command(p) => p.processing_capacity,
            _ => 100.0,
        }
    }

    pub fn decision_delay(&self) -> f64 {
        match self {
            Performance::Command(p) => p.decision_delay,
            _ => 5.0,
        }
    }

    pub fn strike_range(&self) -> f64 {
        match self {
            Performance::Striker(p) => p.strike_range,
            _ => 100.0,
        }
    }

    pub fn damage_rate(&self) -> f64 {
        match self {
            Performance::Striker(p) => p.damage_rate,
            _ => 0.7,
        }
    }

    pub fn accuracy(&self) -> f64 {
        match self {
            Performance::Striker(p) => p.accuracy,
            _ => 20.0,
        }
    }

    /// Effective communication range: comm distance for support nodes,
    /// command range for command nodes, a neutral default otherwise.
    pub fn comm_range(&self) -> f64 {
        match self {
            Performance::Support(p) => p.comm_distance,
            Performance::Command(p) => p.command_range,
            _ => 200.0,
        }
    }

    pub fn reliability(&self) -> f64 {
        match self {
            Performance::Support(p) => p.reliability,
            _ => 0.9,
        }
    }
}

fn default_hp() -> f64 {
    100.0
}

/// A military asset on the board.
///
/// Nodes are created by the graph-editing layer and passed into the engine
/// as an immutable snapshot per call; the engine never mutates or persists
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub faction: Faction,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Remaining hit points; nodes at 0 are destroyed and ignored by search.
    #[serde(default = "default_hp")]
    pub hp: f64,
    #[serde(flatten)]
    pub performance: Performance,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        faction: Faction,
        x: f64,
        y: f64,
        performance: Performance,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            faction,
            x,
            y,
            hp: 100.0,
            performance,
        }
    }

    pub fn sensor(id: impl Into<String>, name: impl Into<String>, faction: Faction, x: f64, y: f64) -> Self {
        Self::new(id, name, faction, x, y, Performance::Sensor(SensorPerformance::default()))
    }

    pub fn command(id: impl Into<String>, name: impl Into<String>, faction: Faction, x: f64, y: f64) -> Self {
        Self::new(id, name, faction, x, y, Performance::Command(CommandPerformance::default()))
    }

    pub fn striker(id: impl Into<String>, name: impl Into<String>, faction: Faction, x: f64, y: f64) -> Self {
        Self::new(id, name, faction, x, y, Performance::Striker(StrikerPerformance::default()))
    }

    pub fn support(id: impl Into<String>, name: impl Into<String>, faction: Faction, x: f64, y: f64) -> Self {
        Self::new(id, name, faction, x, y, Performance::Support(SupportPerformance::default()))
    }

    pub fn with_hp(mut self, hp: f64) -> Self {
        self.hp = hp;
        self
    }

    pub fn with_performance(mut self, performance: Performance) -> Self {
        self.performance = performance;
        self
    }

    pub fn base_type(&self) -> BaseType {
        self.performance.base_type()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Euclidean distance to another node.
    pub fn distance_to(&self, other: &Node) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Kinds of directed relations between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Detection,
    Communication,
    Command,
    Strike,
    Manual,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Detection => write!(f, "detection"),
            EdgeKind::Communication => write!(f, "communication"),
            EdgeKind::Command => write!(f, "command"),
            EdgeKind::Strike => write!(f, "strike"),
            EdgeKind::Manual => write!(f, "manual"),
        }
    }
}

/// A directed relation between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    /// Link quality assigned by the connection generator (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Endpoint distance assigned by the connection generator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// True iff the endpoints belong to different factions.
    #[serde(default)]
    pub cross_faction: bool,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            source: source.into(),
            target: target.into(),
            kind,
            quality: None,
            distance: None,
            cross_faction: false,
        }
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_cross_faction(mut self, cross_faction: bool) -> Self {
        self.cross_faction = cross_faction;
        self
    }
}

/// One feasible way to detect, decide and engage a target.
///
/// Derived per search call and discarded after the caller consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillChain {
    pub id: String,
    /// Ordered node ids: sensor, command, striker, target.
    pub path: Vec<String>,
    /// Edges traversed at each hop, parallel to `path`.
    pub edges: Vec<Edge>,
    /// Joint success probability of the chain (0-1).
    pub effectiveness: f64,
    /// Number of nodes on the path; always 4 for a canonical chain.
    pub length: usize,
}

impl KillChain {
    pub fn contains(&self, node_id: &str) -> bool {
        self.path.iter().any(|id| id == node_id)
    }
}

/// Severity levels for vulnerabilities and suggestions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Structural weakness classes flagged by the network evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityKind {
    IsolatedNodes,
    SinglePointFailure,
    CoverageGap,
    MissingSensor,
    MissingCommand,
    MissingStriker,
    DisconnectedNetwork,
}

/// A structural weakness found in the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    pub kind: VulnerabilityKind,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub affected_nodes: Vec<String>,
}

impl Vulnerability {
    pub fn new(
        kind: VulnerabilityKind,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            severity,
            title: title.into(),
            description: description.into(),
            affected_nodes: Vec::new(),
        }
    }

    pub fn with_affected_nodes(mut self, nodes: Vec<String>) -> Self {
        self.affected_nodes = nodes;
        self
    }
}

/// An actionable remediation step derived from a vulnerability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub priority: Severity,
    pub title: String,
    pub description: String,
    pub expected_effect: String,
}

impl Suggestion {
    pub fn new(
        priority: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        expected_effect: impl Into<String>,
    ) -> Self {
        Self {
            priority,
            title: title.into(),
            description: description.into(),
            expected_effect: expected_effect.into(),
        }
    }
}
