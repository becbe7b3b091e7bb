//! Health Reporter: six independent checks over the adapter, run without
//! ever building the full graph. The first three consult the adapter
//! directly; the last three share a single scan of the `.md` tree.

use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::adapter::Adapter;
use crate::record::SkillRecord;
use crate::resolve::Resolver;
use crate::scan::scan;
use crate::validate::{has_structure_heading, validate};

/// Worst-of-all-checks severity. Ordered so `max` picks the worst result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Pass,
    Warn,
    Fail,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Pass => "pass",
            HealthStatus::Warn => "warn",
            HealthStatus::Fail => "fail",
        }
    }
}

/// One rule's outcome.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub rule_id: &'static str,
    pub status: HealthStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

/// The full report: six checks plus a worst-of-all rollup.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub version: String,
    pub overall: HealthStatus,
    pub results: Vec<CheckResult>,
    pub checked_at: String,
    pub duration: u64,
}

fn check_repo(is_repo: bool) -> CheckResult {
    if is_repo {
        CheckResult {
            rule_id: "repo",
            status: HealthStatus::Pass,
            message: "root sits inside a version-controlled tree".to_string(),
            detail: None,
        }
    } else {
        CheckResult {
            rule_id: "repo",
            status: HealthStatus::Fail,
            message: "root is not inside a version-controlled tree".to_string(),
            detail: None,
        }
    }
}

fn check_tracking(has_marker: bool) -> CheckResult {
    if has_marker {
        CheckResult {
            rule_id: "tracking",
            status: HealthStatus::Pass,
            message: "tracking marker present".to_string(),
            detail: None,
        }
    } else {
        CheckResult {
            rule_id: "tracking",
            status: HealthStatus::Warn,
            message: "no tracking marker found".to_string(),
            detail: None,
        }
    }
}

fn check_document_count(count: usize) -> CheckResult {
    if count == 0 {
        CheckResult {
            rule_id: "document-count",
            status: HealthStatus::Fail,
            message: "no documents found".to_string(),
            detail: None,
        }
    } else {
        CheckResult {
            rule_id: "document-count",
            status: HealthStatus::Pass,
            message: format!("{count} document(s) found"),
            detail: None,
        }
    }
}

/// Never fails: any broken reference is a warning, regardless of how many.
fn check_references(records: &[SkillRecord]) -> CheckResult {
    let resolver = Resolver::new(records);
    let mut broken = Vec::new();
    for record in records {
        for target in record.related.iter().chain(record.wiki_links.iter().map(|l| &l.target)) {
            if !resolver.resolve(records, target).found {
                broken.push(json!({"file": record.source_path.clone(), "target": target}));
            }
        }
    }
    if broken.is_empty() {
        CheckResult {
            rule_id: "references",
            status: HealthStatus::Pass,
            message: "no broken references found".to_string(),
            detail: None,
        }
    } else {
        CheckResult {
            rule_id: "references",
            status: HealthStatus::Warn,
            message: format!("{} broken reference(s) found", broken.len()),
            detail: Some(Value::Array(broken)),
        }
    }
}

/// Never fails: a document missing the Description/Output/Format heading
/// is a warning, regardless of how many.
fn check_structure(records: &[SkillRecord]) -> CheckResult {
    let missing: Vec<&str> = records
        .iter()
        .filter(|r| !has_structure_heading(&r.body))
        .map(|r| r.source_path.as_str())
        .collect();
    if missing.is_empty() {
        CheckResult {
            rule_id: "structure",
            status: HealthStatus::Pass,
            message: "every document has a recognized structure heading".to_string(),
            detail: None,
        }
    } else {
        CheckResult {
            rule_id: "structure",
            status: HealthStatus::Warn,
            message: format!("{} document(s) missing a structure heading", missing.len()),
            detail: Some(json!(missing)),
        }
    }
}

/// Always passes: reports the header-bearing vs. non-header-bearing split
/// of every `.md` file the scanner found.
fn check_helpers(total_files: usize, with_header: usize) -> CheckResult {
    let without_header = total_files - with_header;
    CheckResult {
        rule_id: "helpers",
        status: HealthStatus::Pass,
        message: format!("{with_header} document(s) with a header, {without_header} without"),
        detail: Some(json!({"with_header": with_header, "without_header": without_header})),
    }
}

/// Run all six checks against `adapter` and roll them up into one report.
pub async fn run_health_checks(adapter: &dyn Adapter) -> HealthReport {
    let started = Instant::now();

    let is_repo = adapter.is_repo().await;
    let has_marker = adapter.has_tracking_marker().await;
    let doc_count = adapter.document_count().await;

    let files = scan(adapter).await;
    let records: Vec<SkillRecord> = files
        .iter()
        .filter_map(|f| validate(&f.path, &f.text).record)
        .collect();

    let mut results = vec![
        check_repo(is_repo),
        check_tracking(has_marker),
        check_document_count(doc_count),
        check_references(&records),
        check_structure(&records),
        check_helpers(files.len(), records.len()),
    ];
    results.sort_by_key(|r| r.rule_id);

    let overall = results.iter().map(|r| r.status).max().unwrap_or(HealthStatus::Pass);
    let duration = started.elapsed().as_millis() as u64;
    info!(overall = overall.as_str(), duration, "health checks complete");

    HealthReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        overall,
        results,
        checked_at: chrono::Utc::now().to_rfc3339(),
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StubAdapter;

    #[tokio::test]
    async fn healthy_repo_passes_everything() {
        let adapter = StubAdapter::new()
            .with_repo_marker(true, true)
            .with_file(
                "a.md",
                "---\nname: A\nscripts: tools/run.sh\n---\n## Description\nhello [[a]]",
            )
            .with_file("tools/run.sh", "#!/bin/sh");
        let report = run_health_checks(&adapter).await;
        assert_eq!(report.overall, HealthStatus::Pass);
        assert_eq!(report.results.len(), 6);
    }

    #[tokio::test]
    async fn missing_tracking_marker_warns_that_check() {
        let adapter = StubAdapter::new().with_repo_marker(true, false);
        let report = run_health_checks(&adapter).await;
        let tracking = report.results.iter().find(|r| r.rule_id == "tracking").unwrap();
        assert_eq!(tracking.status, HealthStatus::Warn);
    }

    #[tokio::test]
    async fn non_repo_root_fails_that_check() {
        let adapter = StubAdapter::new().with_repo_marker(false, false);
        let report = run_health_checks(&adapter).await;
        let repo = report.results.iter().find(|r| r.rule_id == "repo").unwrap();
        assert_eq!(repo.status, HealthStatus::Fail);
    }

    #[tokio::test]
    async fn empty_tree_fails_document_count() {
        let adapter = StubAdapter::new();
        let report = run_health_checks(&adapter).await;
        let docs = report.results.iter().find(|r| r.rule_id == "document-count").unwrap();
        assert_eq!(docs.status, HealthStatus::Fail);
    }

    #[tokio::test]
    async fn broken_reference_warns_with_detail() {
        let adapter = StubAdapter::new().with_file("a.md", "---\nname: A\nrelated: missing\n---\n");
        let report = run_health_checks(&adapter).await;
        let refs = report.results.iter().find(|r| r.rule_id == "references").unwrap();
        assert_eq!(refs.status, HealthStatus::Warn);
        assert!(refs.message.contains('1'));
        let detail = refs.detail.as_ref().unwrap().as_array().unwrap();
        assert_eq!(detail.len(), 1);
        assert_eq!(detail[0]["file"], "a.md");
        assert_eq!(detail[0]["target"], "missing");
    }

    #[tokio::test]
    async fn helpers_reports_header_counts_and_always_passes() {
        let adapter = StubAdapter::new()
            .with_file("a.md", "---\nname: A\n---\n")
            .with_file("b.md", "no header here");
        let report = run_health_checks(&adapter).await;
        let helpers = report.results.iter().find(|r| r.rule_id == "helpers").unwrap();
        assert_eq!(helpers.status, HealthStatus::Pass);
        assert_eq!(helpers.detail.as_ref().unwrap()["with_header"], 1);
        assert_eq!(helpers.detail.as_ref().unwrap()["without_header"], 1);
    }

    #[tokio::test]
    async fn overall_is_worst_of_all_checks() {
        let adapter = StubAdapter::new();
        let report = run_health_checks(&adapter).await;
        assert_eq!(report.overall, HealthStatus::Fail);
    }
}
