//! Scanner: a recursive walk over the adapter's tree, yielding every
//! `.md` file as a `(relative_path, text)` pair. The adapter itself never
//! recurses — recursion lives here, as repeated `list_dir` calls.

use crate::adapter::Adapter;

/// One discovered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: String,
    pub text: String,
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_markdown(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".md")
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Recursively walk `adapter` from the root, skipping hidden entries
/// (names starting with `.`) at every level. A directory is distinguished
/// from a file only by `list_dir` returning a non-empty listing for it;
/// a file whose `read_file` comes back `None` is skipped rather than
/// treated as a directory.
pub async fn scan(adapter: &dyn Adapter) -> Vec<ScannedFile> {
    let mut out = Vec::new();
    let mut stack = vec![String::new()];

    while let Some(dir) = stack.pop() {
        let mut entries = adapter.list_dir(&dir).await;
        entries.retain(|name| !is_hidden(name));
        entries.sort();

        for name in entries {
            let path = join(&dir, &name);
            let children = adapter.list_dir(&path).await;
            if !children.is_empty() {
                stack.push(path);
                continue;
            }
            if !is_markdown(&name) {
                continue;
            }
            let Some(text) = adapter.read_file(&path).await else {
                continue;
            };
            out.push(ScannedFile { path, text });
        }
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StubAdapter;

    #[tokio::test]
    async fn scans_nested_markdown_in_sorted_order() {
        let adapter = StubAdapter::new()
            .with_file("b.md", "b")
            .with_file("a.md", "a")
            .with_file("sub/c.md", "c");
        let files = scan(&adapter).await;
        assert_eq!(
            files.iter().map(|f| f.path.as_str()).collect::<Vec<_>>(),
            vec!["a.md", "b.md", "sub/c.md"]
        );
    }

    #[tokio::test]
    async fn hidden_entries_are_skipped() {
        let adapter = StubAdapter::new()
            .with_file(".hidden.md", "x")
            .with_file(".git/config", "y")
            .with_file("visible.md", "z");
        let files = scan(&adapter).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "visible.md");
    }

    #[tokio::test]
    async fn non_markdown_files_are_skipped() {
        let adapter = StubAdapter::new().with_file("readme.txt", "x").with_file("doc.md", "y");
        let files = scan(&adapter).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "doc.md");
    }

    #[tokio::test]
    async fn extension_match_is_case_insensitive() {
        let adapter = StubAdapter::new().with_file("DOC.MD", "y");
        let files = scan(&adapter).await;
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn empty_tree_scans_to_nothing() {
        let adapter = StubAdapter::new();
        assert!(scan(&adapter).await.is_empty());
    }
}
