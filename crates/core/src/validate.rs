//! Schema Validator: header extraction, field coercion, wiki-link and
//! structure-heading extraction.
//!
//! Never throws. Every failure mode degrades to a warning, an error flag on
//! an otherwise-complete record, or (for a headerless document) a record of
//! `None` — the record is still emitted when it is merely invalid.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::record::{Kind, SkillRecord, Status, WikiLink};

static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("static regex"));

static STRUCTURE_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^#{1,3}\s+(Description|Output|Format)\b").expect("static regex")
});

/// The header block of a document, with its body.
pub struct HeaderBlock {
    pub header: String,
    pub body: String,
}

/// Find the first contiguous `---`-delimited block at the start of `text`.
///
/// `str::lines` already strips an optional trailing `\r`, so CRLF and LF
/// inputs are handled identically.
pub fn split_header(text: &str) -> Option<HeaderBlock> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.first() != Some(&"---") {
        return None;
    }
    let close = lines.iter().skip(1).position(|l| *l == "---")? + 1;
    let header = lines[1..close].join("\n");
    let body = lines[(close + 1)..].join("\n");
    Some(HeaderBlock { header, body })
}

/// `true` iff the body contains a `Description`/`Output`/`Format` heading of
/// level 1–3, used only by the Health Reporter's `structure` rule.
pub fn has_structure_heading(body: &str) -> bool {
    STRUCTURE_HEADING_RE.is_match(body)
}

/// Extract every `[[target]]` / `[[target|alias]]` reference from a body.
pub fn extract_wiki_links(body: &str) -> Vec<WikiLink> {
    WIKI_LINK_RE
        .captures_iter(body)
        .map(|caps| {
            let inner = &caps[1];
            match inner.split_once('|') {
                Some((target, alias)) => WikiLink {
                    target: target.to_string(),
                    alias: Some(alias.to_string()),
                },
                None => WikiLink {
                    target: inner.to_string(),
                    alias: None,
                },
            }
        })
        .collect()
}

/// Outcome of validating one scanned `(path, text)` pair.
pub struct ValidationOutcome {
    /// Whether a `---`-delimited header block was found at all.
    pub has_header: bool,
    /// Whether the record is free of errors (warnings don't affect this).
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Present whenever a header was found, even when `valid` is `false`.
    pub record: Option<SkillRecord>,
}

fn file_stem(rel_path: &str) -> String {
    let name = rel_path.rsplit('/').next().unwrap_or(rel_path);
    name.rsplit_once('.').map(|(s, _)| s).unwrap_or(name).to_string()
}

fn as_trimmed_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn list_of_strings(v: &Value, field: &str, allow_comma_split: bool, warnings: &mut Vec<String>) -> Vec<String> {
    match v {
        Value::Sequence(seq) => seq
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => {
                    warnings.push(format!("{field}: coerced numeric list entry {n} to string"));
                    Some(n.to_string())
                }
                _ => None,
            })
            .collect(),
        Value::String(s) => {
            warnings.push(format!("{field}: accepted single string, wrapped as a list"));
            if allow_comma_split && s.contains(',') {
                s.split(',')
                    .map(|part| part.trim().to_string())
                    .filter(|part| !part.is_empty())
                    .collect()
            } else {
                vec![s.trim().to_string()]
            }
        }
        _ => Vec::new(),
    }
}

fn as_bool_lenient(v: &Value, warnings: &mut Vec<String>) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if lowered == "true" || lowered == "false" {
                warnings.push("moc: coerced string to boolean".to_string());
            }
            lowered == "true"
        }
        _ => false,
    }
}

/// Validate one scanned `(relative_path, text)` pair into a `SkillRecord`.
pub fn validate(source_path: &str, text: &str) -> ValidationOutcome {
    let Some(HeaderBlock { header, body }) = split_header(text) else {
        return ValidationOutcome {
            has_header: false,
            valid: false,
            errors: Vec::new(),
            warnings: Vec::new(),
            record: None,
        };
    };

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let stem = file_stem(source_path);

    let fields: std::collections::BTreeMap<String, Value> = match serde_yaml::from_str(&header) {
        Ok(Value::Mapping(map)) => map
            .into_iter()
            .filter_map(|(k, v)| as_trimmed_string(&k).map(|k| (k, v)))
            .collect(),
        Ok(_) | Err(_) => {
            errors.push("malformed metadata header".to_string());
            std::collections::BTreeMap::new()
        }
    };

    let display_name = match fields.get("name").and_then(as_trimmed_string) {
        Some(name) if !name.is_empty() => name,
        _ => {
            errors.push("missing required field: name".to_string());
            stem.clone()
        }
    };

    let (kind, kind_coerced) = match fields.get("type").and_then(as_trimmed_string) {
        Some(raw) => Kind::parse_or_default(&raw),
        None => (Kind::Skill, false),
    };
    if kind_coerced {
        warnings.push("type: unrecognized kind, defaulted to skill".to_string());
    }

    // `status` follows the data model's "or absent" rule: a missing key
    // leaves the record's status unset rather than defaulting to `stable`.
    // A present-but-unrecognized value still falls back to `stable`, with a
    // warning, per the field-recognition table.
    let status = match fields.get("status").and_then(as_trimmed_string) {
        Some(raw) => {
            let (status, coerced) = Status::parse_or_default(&raw);
            if coerced {
                warnings.push("status: unrecognized status, defaulted to stable".to_string());
            }
            Some(status)
        }
        None => None,
    };

    let category = fields.get("category").and_then(as_trimmed_string);

    let version = match fields.get("version") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => {
            warnings.push("version: coerced number to string".to_string());
            n.to_string()
        }
        _ => String::new(),
    };

    let tags = fields
        .get("tags")
        .map(|v| list_of_strings(v, "tags", true, &mut warnings))
        .unwrap_or_default();
    let related = fields
        .get("related")
        .map(|v| list_of_strings(v, "related", false, &mut warnings))
        .unwrap_or_default();
    let scripts = fields
        .get("scripts")
        .map(|v| list_of_strings(v, "scripts", false, &mut warnings))
        .unwrap_or_default();
    let aliases = fields
        .get("aliases")
        .map(|v| list_of_strings(v, "aliases", false, &mut warnings))
        .unwrap_or_default();

    let moc = fields
        .get("moc")
        .map(|v| as_bool_lenient(v, &mut warnings))
        .unwrap_or(false);
    let kind = if moc { Kind::Moc } else { kind };

    let wiki_links = extract_wiki_links(&body);

    let record = SkillRecord {
        id: crate::record::normalize_id(&display_name),
        display_name,
        kind,
        status,
        category,
        version: if version.is_empty() { None } else { Some(version) },
        tags,
        related,
        wiki_links,
        scripts,
        aliases,
        file_stem: crate::record::normalize_id(&stem),
        source_path: source_path.to_string(),
        body,
    };

    let valid = errors.is_empty();
    ValidationOutcome {
        has_header: true,
        valid,
        errors,
        warnings,
        record: Some(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_header_is_silently_skipped() {
        let outcome = validate("a.md", "just some text, no frontmatter");
        assert!(!outcome.has_header);
        assert!(outcome.record.is_none());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn missing_name_is_invalid_but_emitted() {
        let text = "---\ntype: skill\n---\nbody text";
        let outcome = validate("helper.md", text);
        assert!(outcome.has_header);
        assert!(!outcome.valid);
        assert!(outcome.record.is_some());
        assert_eq!(outcome.record.unwrap().display_name, "helper");
    }

    #[test]
    fn full_header_parses_cleanly() {
        let text = "---\nname: My Skill\ntype: hook\nstatus: draft\ntags: [a, b]\nrelated: other\n---\nSee [[other]]";
        let outcome = validate("my-skill.md", text);
        assert!(outcome.valid);
        let record = outcome.record.unwrap();
        assert_eq!(record.display_name, "My Skill");
        assert_eq!(record.id, "my-skill");
        assert_eq!(record.kind.as_str(), "hook");
        assert_eq!(record.status.unwrap().as_str(), "draft");
        assert_eq!(record.tags, vec!["a", "b"]);
        assert_eq!(record.related, vec!["other"]);
        assert_eq!(record.wiki_links.len(), 1);
        assert_eq!(record.wiki_links[0].target, "other");
    }

    #[test]
    fn moc_flag_forces_kind() {
        let text = "---\nname: Index\ntype: skill\nmoc: true\n---\n";
        let outcome = validate("index.md", text);
        assert_eq!(outcome.record.unwrap().kind.as_str(), "moc");
    }

    #[test]
    fn moc_accepts_string_bool() {
        let text = "---\nname: Index\nmoc: \"true\"\n---\n";
        let outcome = validate("index.md", text);
        assert_eq!(outcome.record.unwrap().kind.as_str(), "moc");
        assert!(outcome.warnings.iter().any(|w| w.contains("moc")));
    }

    #[test]
    fn tags_accepts_comma_separated_string() {
        let text = "---\nname: X\ntags: a, b, c\n---\n";
        let outcome = validate("x.md", text);
        assert_eq!(outcome.record.unwrap().tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn unrecognized_type_falls_back_with_warning() {
        let text = "---\nname: X\ntype: bogus\n---\n";
        let outcome = validate("x.md", text);
        assert_eq!(outcome.record.unwrap().kind.as_str(), "skill");
        assert!(outcome.warnings.iter().any(|w| w.starts_with("type:")));
    }

    #[test]
    fn wiki_link_with_alias() {
        let links = extract_wiki_links("See [[target|Alias Text]] here");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].target, "target");
        assert_eq!(links[0].alias.as_deref(), Some("Alias Text"));
    }

    #[test]
    fn structure_heading_detection() {
        assert!(has_structure_heading("## Output\nstuff"));
        assert!(has_structure_heading("# Description\n"));
        assert!(!has_structure_heading("## Something Else\n"));
        assert!(!has_structure_heading("#### Format\n"));
    }

    #[test]
    fn crlf_header_is_recognized() {
        let text = "---\r\nname: X\r\n---\r\nbody\r\n";
        let outcome = validate("x.md", text);
        assert!(outcome.has_header);
        assert_eq!(outcome.record.unwrap().display_name, "X");
    }
}
