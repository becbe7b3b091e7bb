//! skillgraph CLI — build and inspect a skill-file reference graph.
//!
//! Calls `skillgraph-core` directly with no server overhead.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use skillgraph_core::{build_graph, run_health_checks, AdjacencyOptions, BuildOptions, NativeAdapter};

/// skillgraph — index and graph a collection of skill-file documents.
#[derive(Parser)]
#[command(name = "skillgraph", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, validate, and build the condensed reference graph
    Build {
        /// Document root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Disable strongly-connected-component cycle condensation
        #[arg(long)]
        no_condense: bool,

        /// Include ghost (unresolved-reference) nodes in the adjacency view
        #[arg(long)]
        include_ghost: bool,

        /// Include script side-file nodes in the adjacency view
        #[arg(long)]
        include_scripts: bool,

        /// Include cycle supernodes in the adjacency view
        #[arg(long)]
        include_cycles: bool,

        /// Dense-node threshold, carried through to `meta` for a downstream
        /// layout engine
        #[arg(long)]
        dense_threshold: Option<f64>,

        /// Overall graph density threshold, carried through to `meta`
        #[arg(long)]
        density_threshold: Option<f64>,
    },
    /// Run the six independent health checks
    Health {
        /// Document root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf, String> {
    let root = match root {
        Some(p) => p,
        None => std::env::current_dir().map_err(|e| format!("could not determine current directory: {e}"))?,
    };
    root.canonicalize().map_err(|e| format!("path not found: {} ({e})", root.display()))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("skillgraph=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Build {
            root,
            no_condense,
            include_ghost,
            include_scripts,
            include_cycles,
            dense_threshold,
            density_threshold,
        } => {
            let root = resolve_root(root)?;
            let adapter = NativeAdapter::new(&root);
            let options = BuildOptions {
                condense_cycles: !no_condense,
                adjacency_options: AdjacencyOptions {
                    include_ghost,
                    include_scripts,
                    include_cycles,
                },
                dense_threshold,
                density_threshold,
            };
            let output = build_graph(&adapter, options).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else {
                println!(
                    "{} node(s), {} edge(s), {} cycle(s)",
                    output.meta.node_count, output.meta.edge_count, output.meta.cycle_count
                );
                for node in &output.nodes {
                    println!("  {:<30} [{}]", node.id, node.kind);
                }
                if !output.cycles.is_empty() {
                    println!("\nCycles:");
                    for cycle in &output.cycles {
                        println!("  {}: {}", cycle.id, cycle.members.join(", "));
                    }
                }
            }
        }
        Commands::Health { root } => {
            let root = resolve_root(root)?;
            let adapter = NativeAdapter::new(&root);
            let report = run_health_checks(&adapter).await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report).unwrap());
            } else {
                println!("overall: {}", report.overall.as_str());
                for result in &report.results {
                    println!("  {:<16} {:<5} {}", result.rule_id, result.status.as_str(), result.message);
                }
                if report.overall == skillgraph_core::HealthStatus::Fail {
                    std::process::exit(1);
                }
            }
        }
    }
    Ok(())
}
