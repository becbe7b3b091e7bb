//! Normalized document records and identifier normalization.

use std::sync::LazyLock;

use regex::Regex;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

/// Normalize a raw string into an identifier: trim, ASCII-fold to lowercase,
/// strip a trailing `.md`, collapse every run of non-`[a-z0-9]` characters to
/// a single `-`, and trim leading/trailing `-`.
///
/// The result may be empty — callers treat an empty id as "unknown". Folding
/// is ASCII-only and therefore lossy for non-ASCII alphanumerics; that is
/// intentional, not a bug, and must not be silently changed.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let without_ext = lower.strip_suffix(".md").unwrap_or(&lower);
    let collapsed = NON_ALNUM_RUN.replace_all(without_ext, "-");
    collapsed.trim_matches('-').to_string()
}

/// Document kind, as recognized by the `type` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Skill,
    Subagent,
    Hook,
    Command,
    Moc,
    Script,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Skill => "skill",
            Kind::Subagent => "subagent",
            Kind::Hook => "hook",
            Kind::Command => "command",
            Kind::Moc => "moc",
            Kind::Script => "script",
        }
    }

    /// Parse a `type` header value, falling back to `skill` for anything
    /// unrecognized (the fallback is a coercion the caller should warn on).
    pub fn parse_or_default(s: &str) -> (Self, bool) {
        match s.trim().to_ascii_lowercase().as_str() {
            "skill" => (Kind::Skill, false),
            "subagent" => (Kind::Subagent, false),
            "hook" => (Kind::Hook, false),
            "command" => (Kind::Command, false),
            "moc" => (Kind::Moc, false),
            "script" => (Kind::Script, false),
            _ => (Kind::Skill, true),
        }
    }
}

/// Document readiness status, as recognized by the `status` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Stable,
    Draft,
    Deprecated,
    Experimental,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Stable => "stable",
            Status::Draft => "draft",
            Status::Deprecated => "deprecated",
            Status::Experimental => "experimental",
            Status::Archived => "archived",
        }
    }

    /// Parse a `status` header value, falling back to `stable` for anything
    /// unrecognized (the fallback is a coercion the caller should warn on).
    pub fn parse_or_default(s: &str) -> (Self, bool) {
        match s.trim().to_ascii_lowercase().as_str() {
            "stable" => (Status::Stable, false),
            "draft" => (Status::Draft, false),
            "deprecated" => (Status::Deprecated, false),
            "experimental" => (Status::Experimental, false),
            "archived" => (Status::Archived, false),
            _ => (Status::Stable, true),
        }
    }
}

/// An immutable, post-validation document record.
#[derive(Debug, Clone)]
pub struct SkillRecord {
    pub id: String,
    pub display_name: String,
    pub kind: Kind,
    pub status: Option<Status>,
    pub category: Option<String>,
    pub version: Option<String>,
    pub tags: Vec<String>,
    pub related: Vec<String>,
    pub wiki_links: Vec<WikiLink>,
    pub scripts: Vec<String>,
    pub aliases: Vec<String>,
    pub file_stem: String,
    pub source_path: String,
    pub body: String,
}

/// A `[[target]]` or `[[target|alias]]` reference extracted from a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub target: String,
    pub alias: Option<String>,
}
