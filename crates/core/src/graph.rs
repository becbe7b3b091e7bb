//! Graph Builder: turns validated records into an unsorted node/edge pair,
//! attaching script and ghost nodes and resolving `related`/wiki references.

use std::collections::{HashMap, HashSet};

use crate::record::{Kind, SkillRecord};
use crate::resolve::{MatchedBy, Resolver};

/// Node kind, a superset of [`Kind`] that also covers synthetic nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Skill,
    Subagent,
    Hook,
    Command,
    Moc,
    Script,
    Unresolved,
    Cycle,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Skill => "skill",
            NodeKind::Subagent => "subagent",
            NodeKind::Hook => "hook",
            NodeKind::Command => "command",
            NodeKind::Moc => "moc",
            NodeKind::Script => "script",
            NodeKind::Unresolved => "unresolved",
            NodeKind::Cycle => "cycle",
        }
    }
}

impl From<Kind> for NodeKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Skill => NodeKind::Skill,
            Kind::Subagent => NodeKind::Subagent,
            Kind::Hook => NodeKind::Hook,
            Kind::Command => NodeKind::Command,
            Kind::Moc => NodeKind::Moc,
            Kind::Script => NodeKind::Script,
        }
    }
}

/// A graph node: a real document, a script side-file, a ghost placeholder,
/// or (post-condensation) a cycle supernode.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub is_ghost: bool,
    /// Sorted member ids; only non-empty for `cycle` nodes.
    pub members: Vec<String>,
}

impl Node {
    fn real(id: String, label: String, kind: NodeKind) -> Self {
        Self {
            id,
            label,
            kind,
            is_ghost: false,
            members: Vec::new(),
        }
    }

    fn ghost(id: String, label: String) -> Self {
        Self {
            id,
            label,
            kind: NodeKind::Unresolved,
            is_ghost: true,
            members: Vec::new(),
        }
    }
}

/// Reference kind carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    Related,
    Wiki,
    Scripts,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Related => "related",
            EdgeKind::Wiki => "wiki",
            EdgeKind::Scripts => "scripts",
        }
    }
}

/// A directed edge. `matched_by` is absent for `scripts` edges, which never
/// go through the Resolver.
#[derive(Debug, Clone)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub matched_by: Option<MatchedBy>,
    pub raw_target: Option<String>,
}

/// The unsorted `(nodes, edges)` pair the Builder produces. Condensation
/// and export both consume this and re-sort.
#[derive(Debug, Default)]
pub struct BuiltGraph {
    pub nodes: HashMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl BuiltGraph {
    fn upsert(&mut self, node: Node) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) if existing.is_ghost && !node.is_ghost => {
                existing.label = node.label;
                existing.kind = node.kind;
                existing.is_ghost = false;
            }
            Some(_) => {
                // Real-over-real or ghost-over-ghost: first insertion wins.
            }
            None => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }

    fn push_edge(&mut self, edge: Edge, seen: &mut HashSet<(String, String, EdgeKind)>) {
        let key = (edge.source.clone(), edge.target.clone(), edge.kind);
        if seen.insert(key) {
            self.edges.push(edge);
        }
    }
}

/// Build the node/edge graph from a full record set. The [`Resolver`] is
/// constructed once, here, from the complete set of records.
pub fn build(records: &[SkillRecord]) -> BuiltGraph {
    let resolver = Resolver::new(records);
    let mut graph = BuiltGraph::default();
    let mut seen_edges = HashSet::new();

    for record in records {
        graph.upsert(Node::real(
            record.id.clone(),
            record.display_name.clone(),
            record.kind.into(),
        ));

        for raw_path in &record.scripts {
            let trimmed = raw_path.trim();
            if trimmed.is_empty() {
                continue;
            }
            let script_id = format!("script:{trimmed}");
            let label = trimmed.rsplit('/').next().unwrap_or(trimmed).to_string();
            graph.upsert(Node::real(script_id.clone(), label, NodeKind::Script));
            graph.push_edge(
                Edge {
                    source: record.id.clone(),
                    target: script_id,
                    kind: EdgeKind::Scripts,
                    matched_by: None,
                    raw_target: None,
                },
                &mut seen_edges,
            );
        }

        for raw_target in &record.related {
            let resolved = resolver.resolve(records, raw_target);
            if !resolved.found {
                graph.upsert(Node::ghost(resolved.id.clone(), resolved.display_name.clone()));
            }
            graph.push_edge(
                Edge {
                    source: record.id.clone(),
                    target: resolved.id,
                    kind: EdgeKind::Related,
                    matched_by: Some(resolved.matched_by),
                    raw_target: Some(raw_target.clone()),
                },
                &mut seen_edges,
            );
        }

        for link in &record.wiki_links {
            let resolved = resolver.resolve(records, &link.target);
            if !resolved.found {
                graph.upsert(Node::ghost(resolved.id.clone(), resolved.display_name.clone()));
            }
            graph.push_edge(
                Edge {
                    source: record.id.clone(),
                    target: resolved.id,
                    kind: EdgeKind::Wiki,
                    matched_by: Some(resolved.matched_by),
                    raw_target: Some(link.target.clone()),
                },
                &mut seen_edges,
            );
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::normalize_id;

    fn record(name: &str, related: &[&str], scripts: &[&str]) -> SkillRecord {
        SkillRecord {
            id: normalize_id(name),
            display_name: name.to_string(),
            kind: Kind::Skill,
            status: None,
            category: None,
            version: None,
            tags: Vec::new(),
            related: related.iter().map(|s| s.to_string()).collect(),
            wiki_links: Vec::new(),
            scripts: scripts.iter().map(|s| s.to_string()).collect(),
            aliases: Vec::new(),
            file_stem: normalize_id(name),
            source_path: format!("{name}.md"),
            body: String::new(),
        }
    }

    #[test]
    fn ghost_reference_creates_ghost_node_and_edge() {
        let records = vec![record("a", &["missing"], &[])];
        let graph = build(&records);
        assert_eq!(graph.nodes.len(), 2);
        let ghost = graph.nodes.get("unresolved:missing").unwrap();
        assert!(ghost.is_ghost);
        assert_eq!(ghost.label, "missing");
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].kind, EdgeKind::Related);
    }

    #[test]
    fn script_edge_has_no_matched_by() {
        let records = vec![record("a", &[], &["scripts/helper.sh"])];
        let graph = build(&records);
        assert_eq!(graph.nodes.len(), 2);
        let script = graph.nodes.get("script:scripts/helper.sh").unwrap();
        assert_eq!(script.label, "helper.sh");
        assert_eq!(graph.edges[0].kind, EdgeKind::Scripts);
        assert!(graph.edges[0].matched_by.is_none());
    }

    #[test]
    fn bidirectional_pair_has_real_nodes_and_two_edges_pre_condense() {
        let records = vec![record("a", &["b"], &[]), record("b", &["a"], &[])];
        let graph = build(&records);
        assert_eq!(graph.nodes.len(), 2);
        assert!(!graph.nodes["a"].is_ghost);
        assert!(!graph.nodes["b"].is_ghost);
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn duplicate_edges_are_deduplicated() {
        let records = vec![record("a", &["b", "b"], &[]), record("b", &[], &[])];
        let graph = build(&records);
        assert_eq!(graph.edges.len(), 1);
    }

    #[test]
    fn real_reference_never_creates_a_ghost() {
        let records = vec![record("a", &["b"], &[]), record("b", &[], &[])];
        let graph = build(&records);
        assert!(graph.nodes.get("unresolved:b").is_none());
        assert!(!graph.nodes["b"].is_ghost);
    }

    #[test]
    fn self_reference_produces_a_self_loop_edge() {
        let records = vec![record("a", &["a"], &[])];
        let graph = build(&records);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, graph.edges[0].target);
    }
}
