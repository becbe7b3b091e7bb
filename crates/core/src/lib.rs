//! Indexing & graph engine for skill-file collections.
//!
//! Pipeline: Adapter → Scanner → Validator → (Builder ↔ Resolver) →
//! Condenser → Exporter, with the Health Reporter running independently
//! off the Adapter and Scanner alone.

pub mod adapter;
pub mod condense;
pub mod config;
pub mod export;
pub mod graph;
pub mod health;
pub mod record;
pub mod resolve;
pub mod scan;
pub mod validate;

pub use adapter::{Adapter, AdapterCapabilities, NativeAdapter, StubAdapter};
pub use config::{AdjacencyOptions, BuildOptions};
pub use health::{run_health_checks, CheckResult, HealthReport, HealthStatus};
pub use record::{Kind, SkillRecord, Status, WikiLink};
pub use resolve::MatchedBy;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::export::Adjacency;
use crate::graph::{EdgeKind, NodeKind};

/// One exported node, as it appears in [`GraphOutput::nodes`].
#[derive(Debug, Clone, Serialize)]
pub struct OutputNode {
    pub id: String,
    pub label: String,
    pub kind: &'static str,
    pub is_ghost: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
}

/// One exported edge, as it appears in [`GraphOutput::edges`].
#[derive(Debug, Clone, Serialize)]
pub struct OutputEdge {
    pub source: String,
    pub target: String,
    pub kind: &'static str,
    pub matched_by: Option<&'static str>,
    pub raw_target: Option<String>,
}

/// One exported cycle supernode, as it appears in [`GraphOutput::cycles`].
#[derive(Debug, Clone, Serialize)]
pub struct OutputCycle {
    pub id: String,
    pub members: Vec<String>,
    pub label: String,
}

/// Summary counters carried alongside the build, plus the density
/// thresholds the caller supplied (consumed by a downstream layout
/// engine, not by this crate).
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub node_count: usize,
    pub edge_count: usize,
    pub cycle_count: usize,
    pub dense_threshold: Option<f64>,
    pub density_threshold: Option<f64>,
}

/// The full build output: a sorted, condensed, adjacency-annotated graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphOutput {
    pub nodes: Vec<OutputNode>,
    pub edges: Vec<OutputEdge>,
    pub adjacency: BTreeMap<String, Adjacency>,
    pub raw_adjacency: BTreeMap<String, Adjacency>,
    pub cycles: Vec<OutputCycle>,
    pub meta: Meta,
}

fn node_to_output(node: &graph::Node) -> OutputNode {
    OutputNode {
        id: node.id.clone(),
        label: node.label.clone(),
        kind: node_kind_str(node.kind),
        is_ghost: node.is_ghost,
        members: node.members.clone(),
    }
}

fn node_kind_str(kind: NodeKind) -> &'static str {
    kind.as_str()
}

fn edge_to_output(edge: &graph::Edge) -> OutputEdge {
    OutputEdge {
        source: edge.source.clone(),
        target: edge.target.clone(),
        kind: edge_kind_str(edge.kind),
        matched_by: edge.matched_by.map(|m| m.as_str()),
        raw_target: edge.raw_target.clone(),
    }
}

fn edge_kind_str(kind: EdgeKind) -> &'static str {
    kind.as_str()
}

/// Run the full pipeline: scan the adapter's tree, validate every `.md`
/// file found, build the reference graph, optionally condense cycles, and
/// export both the condensed and pre-condense adjacency views.
pub async fn build_graph(adapter: &dyn adapter::Adapter, options: BuildOptions) -> GraphOutput {
    let files = scan::scan(adapter).await;
    let records: Vec<SkillRecord> = files
        .iter()
        .filter_map(|f| validate::validate(&f.path, &f.text).record)
        .collect();

    let built = graph::build(&records);
    let raw_adjacency = export::export(&built.nodes, &built.edges, &options.adjacency_options);

    let condensed = condense::condense(built, options.condense_cycles);
    let adjacency = export::export(&condensed.nodes, &condensed.edges, &options.adjacency_options);

    let mut nodes: Vec<OutputNode> = condensed.nodes.values().map(node_to_output).collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut edges: Vec<OutputEdge> = condensed.edges.iter().map(edge_to_output).collect();
    edges.sort_by(|a, b| (&a.source, &a.target, a.kind).cmp(&(&b.source, &b.target, b.kind)));

    let cycles: Vec<OutputCycle> = condensed
        .cycles
        .iter()
        .map(|c| OutputCycle {
            id: c.id.clone(),
            members: c.members.clone(),
            label: c.label.clone(),
        })
        .collect();

    let meta = Meta {
        node_count: nodes.len(),
        edge_count: edges.len(),
        cycle_count: cycles.len(),
        dense_threshold: options.dense_threshold,
        density_threshold: options.density_threshold,
    };

    GraphOutput {
        nodes,
        edges,
        adjacency,
        raw_adjacency,
        cycles,
        meta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StubAdapter;

    #[tokio::test]
    async fn bidirectional_pair_condenses_and_sorts_output() {
        let adapter = StubAdapter::new()
            .with_file("a.md", "---\nname: A\nrelated: b\n---\n")
            .with_file("b.md", "---\nname: B\nrelated: a\n---\n");
        let output = build_graph(&adapter, BuildOptions::default()).await;
        assert_eq!(output.meta.cycle_count, 1);
        assert_eq!(output.meta.node_count, 1);
        assert_eq!(output.meta.edge_count, 0);
        assert_eq!(output.cycles[0].members, vec!["a", "b"]);
        assert!(output.raw_adjacency.contains_key("a"));
        assert!(output.raw_adjacency.contains_key("b"));
    }

    #[tokio::test]
    async fn ghost_reference_appears_in_raw_but_not_default_adjacency() {
        let adapter = StubAdapter::new().with_file("a.md", "---\nname: A\nrelated: missing\n---\n");
        let output = build_graph(&adapter, BuildOptions::default()).await;
        assert!(!output.adjacency.contains_key("unresolved:missing"));
        assert_eq!(output.adjacency["a"].related, Vec::<String>::new());
    }

    #[tokio::test]
    async fn disabled_condensation_keeps_both_nodes_and_edges() {
        let adapter = StubAdapter::new()
            .with_file("a.md", "---\nname: A\nrelated: b\n---\n")
            .with_file("b.md", "---\nname: B\nrelated: a\n---\n");
        let options = BuildOptions {
            condense_cycles: false,
            ..Default::default()
        };
        let output = build_graph(&adapter, options).await;
        assert!(output.cycles.is_empty());
        assert_eq!(output.meta.node_count, 2);
        assert_eq!(output.meta.edge_count, 2);
    }

    #[tokio::test]
    async fn empty_tree_produces_empty_graph() {
        let adapter = StubAdapter::new();
        let output = build_graph(&adapter, BuildOptions::default()).await;
        assert!(output.nodes.is_empty());
        assert!(output.edges.is_empty());
        assert_eq!(output.meta.node_count, 0);
    }
}
