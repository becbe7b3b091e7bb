//! Adjacency Exporter: flattens the condensed graph into a plain
//! id → {all, wiki, related, scripts} map, filterable by node kind.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::config::AdjacencyOptions;
use crate::graph::{Edge, EdgeKind, Node, NodeKind};

/// One node's outgoing adjacency, split by reference kind plus a union.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Adjacency {
    pub all: Vec<String>,
    pub wiki: Vec<String>,
    pub related: Vec<String>,
    pub scripts: Vec<String>,
}

fn is_allowed(node: &Node, options: &AdjacencyOptions) -> bool {
    match node.kind {
        NodeKind::Unresolved => options.include_ghost,
        NodeKind::Script => options.include_scripts,
        NodeKind::Cycle => options.include_cycles,
        _ => true,
    }
}

/// Build the adjacency map. Keys are every node that passes the option
/// filters, in sorted order, even when its lists end up empty; edges whose
/// source or target is filtered out are simply not counted.
pub fn export(nodes: &HashMap<String, Node>, edges: &[Edge], options: &AdjacencyOptions) -> BTreeMap<String, Adjacency> {
    let mut related: HashMap<&str, BTreeSet<String>> = HashMap::new();
    let mut wiki: HashMap<&str, BTreeSet<String>> = HashMap::new();
    let mut scripts: HashMap<&str, BTreeSet<String>> = HashMap::new();

    for edge in edges {
        let (Some(source_node), Some(target_node)) = (nodes.get(&edge.source), nodes.get(&edge.target)) else {
            continue;
        };
        if !is_allowed(source_node, options) || !is_allowed(target_node, options) {
            continue;
        }
        let bucket = match edge.kind {
            EdgeKind::Related => &mut related,
            EdgeKind::Wiki => &mut wiki,
            EdgeKind::Scripts => &mut scripts,
        };
        bucket
            .entry(edge.source.as_str())
            .or_default()
            .insert(edge.target.clone());
    }

    let mut out = BTreeMap::new();
    for node in nodes.values() {
        if !is_allowed(node, options) {
            continue;
        }
        let r = related.get(node.id.as_str()).cloned().unwrap_or_default();
        let w = wiki.get(node.id.as_str()).cloned().unwrap_or_default();
        let s = scripts.get(node.id.as_str()).cloned().unwrap_or_default();
        let mut all = BTreeSet::new();
        all.extend(r.iter().cloned());
        all.extend(w.iter().cloned());
        all.extend(s.iter().cloned());
        out.insert(
            node.id.clone(),
            Adjacency {
                all: all.into_iter().collect(),
                wiki: w.into_iter().collect(),
                related: r.into_iter().collect(),
                scripts: s.into_iter().collect(),
            },
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize_id, Kind, SkillRecord};

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
    fn every_real_node_gets_a_key_even_with_no_edges() {
        let records = vec![record("a", &[], &[])];
        let built = crate::graph::build(&records);
        let map = export(&built.nodes, &built.edges, &AdjacencyOptions::default());
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], Adjacency::default());
    }

    #[test]
    fn ghosts_excluded_by_default() {
        let records = vec![record("a", &["missing"], &[])];
        let built = crate::graph::build(&records);
        let map = export(&built.nodes, &built.edges, &AdjacencyOptions::default());
        assert_eq!(map.len(), 1);
        assert!(map["a"].related.is_empty());
        assert!(!map.contains_key("unresolved:missing"));
    }

    #[test]
    fn ghosts_included_when_flagged() {
        let records = vec![record("a", &["missing"], &[])];
        let built = crate::graph::build(&records);
        let options = AdjacencyOptions {
            include_ghost: true,
            ..Default::default()
        };
        let map = export(&built.nodes, &built.edges, &options);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"].related, vec!["unresolved:missing"]);
    }

    #[test]
    fn scripts_split_from_all() {
        let records = vec![record("a", &["b"], &["scripts/x.sh"]), record("b", &[], &[])];
        let built = crate::graph::build(&records);
        let options = AdjacencyOptions {
            include_scripts: true,
            ..Default::default()
        };
        let map = export(&built.nodes, &built.edges, &options);
        assert_eq!(map["a"].scripts, vec!["script:scripts/x.sh"]);
        assert_eq!(map["a"].related, vec!["b"]);
        assert_eq!(map["a"].all.len(), 2);
    }

    #[test]
    fn keys_are_sorted() {
        let records = vec![record("zeta", &[], &[]), record("alpha", &[], &[])];
        let built = crate::graph::build(&records);
        let map = export(&built.nodes, &built.edges, &AdjacencyOptions::default());
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }
}
