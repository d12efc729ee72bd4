//! CLI command definitions and handlers

use crate::config::EngineConfig;
use crate::generator::{self, GeneratorOptions, NetworkMode};
use crate::models::{Edge, Node};
use crate::scoring;
use crate::search;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

/// Killweb - kill-chain analysis over combat network snapshots
///
/// Reads a scenario file (JSON with "nodes" and optional "edges") and runs
/// one analysis against it.
#[derive(Parser, Debug)]
#[command(name = "killweb")]
#[command(
    version,
    about = "Kill-chain analysis: generate connections, search kill chains, evaluate network topology",
    after_help = "\
Examples:
  killweb generate scenario.json                 Derive the edge set from node positions
  killweb search scenario.json --target red-hq   Enumerate kill chains against a target
  killweb evaluate scenario.json --format json   Topology metrics and vulnerabilities
  killweb key-nodes scenario.json --top 5        Rank the most critical nodes
  killweb impact scenario.json --node s1 --target red-hq   Simulate losing a node"
)]
pub struct Cli {
    /// Path to a TOML config overriding metric weights and search limits
    #[arg(long, global = true, env = "KILLWEB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive detection, communication and strike edges from node positions
    Generate {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Which factions participate
        #[arg(long, value_enum, default_value_t = NetworkMode::Mixed)]
        mode: NetworkMode,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the scenario (nodes plus generated edges) back to a file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Enumerate kill chains against a red-faction target
    Search {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Id of the target node
        #[arg(long, short = 't')]
        target: String,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Score the network topology and list vulnerabilities
    Evaluate {
        /// Scenario file (JSON)
        scenario: PathBuf,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Rank nodes by importance
    KeyNodes {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// How many nodes to keep
        #[arg(long, default_value = "5")]
        top: usize,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Simulate the loss of one node against an existing target's chains
    Impact {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Id of the node to remove
        #[arg(long, short = 'n')]
        node: String,

        /// Id of the target the chains are built against
        #[arg(long, short = 't')]
        target: String,

        #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Node and edge snapshot as stored on disk.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Scenario {
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse scenario file: {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load(p)
            .with_context(|| format!("Failed to load config: {}", p.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            scenario,
            mode,
            format,
            output,
        } => run_generate(&scenario, mode, format, output.as_deref()),
        Commands::Search {
            scenario,
            target,
            format,
        } => run_search(&scenario, &target, format, &config),
        Commands::Evaluate { scenario, format } => run_evaluate(&scenario, format, &config),
        Commands::KeyNodes {
            scenario,
            top,
            format,
        } => run_key_nodes(&scenario, top, format),
        Commands::Impact {
            scenario,
            node,
            target,
            format,
        } => run_impact(&scenario, &node, &target, format, &config),
    }
}

fn run_generate(
    path: &Path,
    mode: NetworkMode,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let mut scenario = load_scenario(path)?;
    let edges = generator::generate_connections(&scenario.nodes, &GeneratorOptions { mode });

    if let Some(out) = output {
        scenario.edges = edges.clone();
        fs::write(out, serde_json::to_string_pretty(&scenario)?)
            .with_context(|| format!("Failed to write scenario: {}", out.display()))?;
    }

    match format {
        OutputFormat::Json => print_json(&edges)?,
        OutputFormat::Text => {
            println!(
                "\n{} Generated {} edge(s) from {} node(s)\n",
                style("⚙").bold(),
                edges.len(),
                scenario.nodes.len()
            );
            for edge in &edges {
                let tag = if edge.cross_faction { " (cross-faction)" } else { "" };
                println!(
                    "  {} {} -> {}{}  q={:.2}",
                    style(edge.kind.to_string()).cyan(),
                    edge.source,
                    edge.target,
                    tag,
                    edge.quality.unwrap_or(0.0)
                );
            }
        }
    }
    Ok(())
}

fn run_search(path: &Path, target: &str, format: OutputFormat, config: &EngineConfig) -> Result<()> {
    let scenario = load_scenario(path)?;
    let report = match search::search_kill_chains(&scenario.nodes, &scenario.edges, target, &config.search) {
        Ok(report) => report,
        Err(failure) => {
            eprintln!("{} {}", style("✗").red().bold(), failure.reason);
            for suggestion in &failure.suggestions {
                eprintln!("  {} {}", style("hint:").yellow(), suggestion);
            }
            anyhow::bail!("kill-chain search failed");
        }
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!(
                "\n{} {} kill chain(s) against {}\n",
                style("⚔").bold(),
                report.kill_chains.len(),
                style(target).cyan()
            );
            for chain in report.kill_chains.iter().take(10) {
                println!(
                    "  {:.1}%  {}",
                    chain.effectiveness * 100.0,
                    chain.path.join(" -> ")
                );
            }
            if report.kill_chains.len() > 10 {
                println!("  ... and {} more", report.kill_chains.len() - 10);
            }
            let coop = &report.cooperative;
            println!(
                "\n  cooperative: {:.1}% ({} chains, synergy +{:.1}%, score {:.0}/100)",
                coop.final_effectiveness * 100.0,
                coop.chain_count,
                coop.synergy * 100.0,
                coop.score
            );
        }
    }
    Ok(())
}

fn run_evaluate(path: &Path, format: OutputFormat, config: &EngineConfig) -> Result<()> {
    let scenario = load_scenario(path)?;
    let report = crate::evaluator::evaluate_network(&scenario.nodes, &scenario.edges, &config.evaluation);

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!(
                "\n{} Network score: {}\n",
                style("📊").bold(),
                style(format!("{:.1}/100", report.overall_score)).cyan().bold()
            );
            let m = &report.metrics;
            for (name, value) in [
                ("connectivity", m.connectivity),
                ("coverage", m.coverage),
                ("redundancy", m.redundancy),
                ("robustness", m.robustness),
                ("efficiency", m.efficiency),
                ("reliability", m.reliability),
            ] {
                println!("  {:<13} {:.2}", name, value);
            }
            if !report.vulnerabilities.is_empty() {
                println!("\n  Vulnerabilities:");
                for v in &report.vulnerabilities {
                    println!("    [{}] {}: {}", style(&v.severity).yellow(), v.title, v.description);
                }
            }
            if !report.suggestions.is_empty() {
                println!("\n  Suggestions:");
                for s in &report.suggestions {
                    println!("    [{}] {}: {}", s.priority, s.title, s.description);
                }
            }
        }
    }
    Ok(())
}

fn run_key_nodes(path: &Path, top: usize, format: OutputFormat) -> Result<()> {
    let scenario = load_scenario(path)?;
    let ranked = scoring::identify_key_nodes(&scenario.nodes, &scenario.edges, top);

    match format {
        OutputFormat::Json => print_json(&ranked)?,
        OutputFormat::Text => {
            println!("\n{} Key nodes\n", style("★").bold());
            for (rank, key) in ranked.iter().enumerate() {
                println!(
                    "  {}. {} ({})  importance {:.2}",
                    rank + 1,
                    style(&key.name).cyan(),
                    key.node_id,
                    key.importance
                );
            }
        }
    }
    Ok(())
}

fn run_impact(
    path: &Path,
    node_id: &str,
    target: &str,
    format: OutputFormat,
    config: &EngineConfig,
) -> Result<()> {
    let scenario = load_scenario(path)?;
    if !scenario.nodes.iter().any(|n| n.id == node_id) {
        anyhow::bail!("node '{node_id}' does not exist in the scenario");
    }

    let report = search::search_kill_chains(&scenario.nodes, &scenario.edges, target, &config.search)
        .map_err(|failure| anyhow::anyhow!("{}", failure.reason))?;
    let impact = scoring::assess_node_failure_impact(
        node_id,
        &scenario.nodes,
        &scenario.edges,
        &report.kill_chains,
    );

    match format {
        OutputFormat::Json => print_json(&impact)?,
        OutputFormat::Text => {
            println!(
                "\n{} Losing {} -> impact {}\n",
                style("💥").bold(),
                style(node_id).cyan(),
                style(&impact.impact_level).yellow().bold()
            );
            println!(
                "  effectiveness {:.1}% -> {:.1}% (loss {:.1}%)",
                impact.original_effectiveness * 100.0,
                impact.new_effectiveness * 100.0,
                impact.effectiveness_loss * 100.0
            );
            println!(
                "  chains affected: {} of {}, edges removed: {}",
                impact.affected_chains,
                impact.affected_chains + impact.surviving_chains,
                impact.removed_edges
            );
        }
    }
    Ok(())
}
