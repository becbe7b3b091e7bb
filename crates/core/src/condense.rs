//! Cycle Condenser: Tarjan SCC over the eligible sub-adjacency, replacing
//! each nontrivial strongly-connected component with a supernode.

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::{BuiltGraph, Edge, EdgeKind, Node, NodeKind};

/// A cycle supernode summary, surfaced alongside the condensed graph.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub id: String,
    pub members: Vec<String>,
    pub label: String,
}

/// The node/edge/cycle triple produced by condensation (or passed through
/// unchanged when condensation is disabled).
#[derive(Debug, Default)]
pub struct CondensedGraph {
    pub nodes: HashMap<String, Node>,
    pub edges: Vec<Edge>,
    pub cycles: Vec<Cycle>,
}

fn is_eligible(node: &Node) -> bool {
    !node.is_ghost && node.kind != NodeKind::Script && node.kind != NodeKind::Cycle
}

/// Condense `built` into supernodes, or pass it through unchanged when
/// `enabled` is `false`.
pub fn condense(built: BuiltGraph, enabled: bool) -> CondensedGraph {
    if !enabled {
        return CondensedGraph {
            nodes: built.nodes,
            edges: built.edges,
            cycles: Vec::new(),
        };
    }

    // Deterministic node/edge ordering going into petgraph: SCC numbering
    // must not depend on HashMap iteration order.
    let mut eligible_ids: Vec<&String> = built
        .nodes
        .values()
        .filter(|n| is_eligible(n))
        .map(|n| &n.id)
        .collect();
    eligible_ids.sort();

    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
    let mut sub_graph: DiGraph<&str, ()> = DiGraph::new();
    for id in &eligible_ids {
        let idx = sub_graph.add_node(id.as_str());
        index_of.insert(id.as_str(), idx);
    }

    let mut sorted_edges: Vec<&Edge> = built.edges.iter().collect();
    sorted_edges.sort_by(|a, b| (&a.source, &a.target, a.kind).cmp(&(&b.source, &b.target, b.kind)));

    let mut self_loop_vertices: HashSet<&str> = HashSet::new();
    for edge in &sorted_edges {
        if edge.source == edge.target {
            self_loop_vertices.insert(edge.source.as_str());
        }
        if let (Some(&from), Some(&to)) = (index_of.get(edge.source.as_str()), index_of.get(edge.target.as_str())) {
            sub_graph.add_edge(from, to, ());
        }
    }

    let components = tarjan_scc(&sub_graph);

    let mut member_to_cycle: HashMap<String, String> = HashMap::new();
    let mut cycles: Vec<Cycle> = Vec::new();
    let mut absorbed: HashSet<String> = HashSet::new();

    for component in &components {
        let mut members: Vec<String> = component
            .iter()
            .map(|&idx| sub_graph[idx].to_string())
            .collect();
        members.sort();

        let is_nontrivial = members.len() >= 2
            || (members.len() == 1 && self_loop_vertices.contains(members[0].as_str()));
        if !is_nontrivial {
            continue;
        }

        let cycle_id = format!("cycle:{}", cycles.len() + 1);
        for member in &members {
            member_to_cycle.insert(member.clone(), cycle_id.clone());
            absorbed.insert(member.clone());
        }
        cycles.push(Cycle {
            id: cycle_id,
            label: format!("cycle({})", members.len()),
            members,
        });
    }

    let rewrite = |id: &str| -> String {
        member_to_cycle.get(id).cloned().unwrap_or_else(|| id.to_string())
    };

    let mut seen_edges: HashSet<(String, String, EdgeKind)> = HashSet::new();
    let mut new_edges: Vec<Edge> = Vec::new();
    for edge in built.edges {
        let source = rewrite(&edge.source);
        let target = rewrite(&edge.target);
        if source == target {
            continue;
        }
        let key = (source.clone(), target.clone(), edge.kind);
        if seen_edges.insert(key) {
            new_edges.push(Edge {
                source,
                target,
                kind: edge.kind,
                matched_by: edge.matched_by,
                raw_target: edge.raw_target,
            });
        }
    }

    let mut new_nodes: HashMap<String, Node> = built
        .nodes
        .into_iter()
        .filter(|(id, _)| !absorbed.contains(id))
        .collect();
    for cycle in &cycles {
        new_nodes.insert(
            cycle.id.clone(),
            Node {
                id: cycle.id.clone(),
                label: cycle.label.clone(),
                kind: NodeKind::Cycle,
                is_ghost: false,
                members: cycle.members.clone(),
            },
        );
    }

    CondensedGraph {
        nodes: new_nodes,
        edges: new_edges,
        cycles,
    }
}
