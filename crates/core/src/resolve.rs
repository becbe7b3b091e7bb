//! Reference Resolver: maps a free-form reference string to a known record
//! or a ghost placeholder, through three index tiers.

use std::collections::HashMap;

use crate::record::{normalize_id, SkillRecord};

/// The tier at which the resolver matched a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    Exact,
    Normalized,
    FilenameStem,
    Ghost,
}

impl MatchedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchedBy::Exact => "exact",
            MatchedBy::Normalized => "normalized",
            MatchedBy::FilenameStem => "filename-stem",
            MatchedBy::Ghost => "ghost",
        }
    }
}

/// Outcome of resolving one raw reference string.
#[derive(Debug, Clone)]
pub struct ResolvedRef {
    pub found: bool,
    pub matched_by: MatchedBy,
    pub id: String,
    pub display_name: String,
}

/// Built once per build from the set of known records. Pure: the same raw
/// target always resolves to the same outcome.
pub struct Resolver {
    exact: HashMap<String, usize>,
    normalized: HashMap<String, usize>,
    stem: HashMap<String, usize>,
}

impl Resolver {
    pub fn new(records: &[SkillRecord]) -> Self {
        let mut exact = HashMap::new();
        let mut normalized = HashMap::new();
        let mut stem = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            exact.entry(record.display_name.clone()).or_insert(idx);
            for alias in &record.aliases {
                exact.entry(alias.clone()).or_insert(idx);
            }

            normalized
                .entry(normalize_id(&record.display_name))
                .or_insert(idx);
            for alias in &record.aliases {
                normalized.entry(normalize_id(alias)).or_insert(idx);
            }
            normalized.entry(record.id.clone()).or_insert(idx);

            stem.entry(record.file_stem.clone()).or_insert(idx);
        }

        Self {
            exact,
            normalized,
            stem,
        }
    }

    /// Resolve a raw target string through the resolver's strict priority
    /// order: exact display name or alias, then normalized form, then
    /// filename stem, falling back to a ghost placeholder.
    pub fn resolve(&self, records: &[SkillRecord], raw_target: &str) -> ResolvedRef {
        let trimmed = raw_target.trim();
        if trimmed.is_empty() {
            return ResolvedRef {
                found: false,
                matched_by: MatchedBy::Ghost,
                id: "unresolved:unknown".to_string(),
                display_name: "unknown".to_string(),
            };
        }

        if let Some(&idx) = self.exact.get(trimmed) {
            let record = &records[idx];
            return ResolvedRef {
                found: true,
                matched_by: MatchedBy::Exact,
                id: record.id.clone(),
                display_name: record.display_name.clone(),
            };
        }

        let normalized_target = normalize_id(trimmed);

        if let Some(&idx) = self.normalized.get(&normalized_target) {
            let record = &records[idx];
            return ResolvedRef {
                found: true,
                matched_by: MatchedBy::Normalized,
                id: record.id.clone(),
                display_name: record.display_name.clone(),
            };
        }

        if let Some(&idx) = self.stem.get(&normalized_target) {
            let record = &records[idx];
            return ResolvedRef {
                found: true,
                matched_by: MatchedBy::FilenameStem,
                id: record.id.clone(),
                display_name: record.display_name.clone(),
            };
        }

        let ghost_slug = if normalized_target.is_empty() {
            "unknown".to_string()
        } else {
            normalized_target
        };
        ResolvedRef {
            found: false,
            matched_by: MatchedBy::Ghost,
            id: format!("unresolved:{ghost_slug}"),
            display_name: trimmed.to_string(),
        }
    }
}
