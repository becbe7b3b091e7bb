//! I/O Adapter: the engine's only I/O boundary. Every operation fails to a
//! benign default rather than propagating an error — callers never see a
//! `Result` from an adapter call.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

/// Six async operations over a rooted tree. Implementors must never panic
/// or leak an exception across this boundary; every failure degrades to
/// the documented default.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Text contents of `path` (relative to the root), or `None` if it
    /// can't be read.
    async fn read_file(&self, path: &str) -> Option<String>;
    /// Non-recursive entry names under `path` (empty = root), or `[]`.
    async fn list_dir(&self, path: &str) -> Vec<String>;
    /// Whether `path` exists at all (file or directory).
    async fn exists(&self, path: &str) -> bool;
    /// Whether the root sits inside a version-controlled tree.
    async fn is_repo(&self) -> bool;
    /// Whether that version-control tree has a tracking marker (e.g. at
    /// least one commit). Semantics are opaque to the engine.
    async fn has_tracking_marker(&self) -> bool;
    /// Total count of documents the adapter can see, as it chooses to
    /// define that — a hint, not something the engine cross-checks.
    async fn document_count(&self) -> usize;
}

/// Which of the six adapter operations a candidate actually provides.
///
/// Native and stub adapters always implement the Rust trait in full, so
/// this is only meaningfully partial for a host-constructed adapter (e.g.
/// a JS object wrapped by [`SandboxAdapter`]) whose capabilities can't be
/// checked by the type system alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterCapabilities {
    pub read_file: bool,
    pub list_dir: bool,
    pub exists: bool,
    pub is_repo: bool,
    pub has_tracking_marker: bool,
    pub document_count: bool,
}

impl AdapterCapabilities {
    pub const fn full() -> Self {
        Self {
            read_file: true,
            list_dir: true,
            exists: true,
            is_repo: true,
            has_tracking_marker: true,
            document_count: true,
        }
    }

    /// Names of operations this candidate is missing, so a host can refuse
    /// to start the pipeline rather than crash mid-build.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.read_file {
            missing.push("read_file");
        }
        if !self.list_dir {
            missing.push("list_dir");
        }
        if !self.exists {
            missing.push("exists");
        }
        if !self.is_repo {
            missing.push("is_repo");
        }
        if !self.has_tracking_marker {
            missing.push("has_tracking_marker");
        }
        if !self.document_count {
            missing.push("document_count");
        }
        missing
    }
}

// ---------------------------------------------------------------------------
// Native adapter
// ---------------------------------------------------------------------------

/// Adapter over a local filesystem path.
pub struct NativeAdapter {
    root: PathBuf,
}

impl NativeAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl Adapter for NativeAdapter {
    async fn read_file(&self, path: &str) -> Option<String> {
        match tokio::fs::read_to_string(self.resolve(path)).await {
            Ok(contents) => Some(contents),
            Err(err) => {
                debug!(path, %err, "read_file failed, returning None");
                None
            }
        }
    }

    async fn list_dir(&self, path: &str) -> Vec<String> {
        let dir = self.resolve(path);
        let mut entries = Vec::new();
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(err) => {
                debug!(path, %err, "list_dir failed, returning empty");
                return entries;
            }
        };
        loop {
            match read_dir.next_entry().await {
                Ok(Some(entry)) => entries.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(err) => {
                    warn!(path, %err, "list_dir entry read failed, stopping early");
                    break;
                }
            }
        }
        entries
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn is_repo(&self) -> bool {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || git2::Repository::discover(&root).is_ok())
            .await
            .unwrap_or(false)
    }

    async fn has_tracking_marker(&self) -> bool {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            git2::Repository::discover(&root)
                .ok()
                .and_then(|repo| repo.head().ok())
                .is_some()
        })
        .await
        .unwrap_or(false)
    }

    async fn document_count(&self) -> usize {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || count_markdown_files(&root))
            .await
            .unwrap_or(0)
    }
}

fn count_markdown_files(dir: &Path) -> usize {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return 0,
    };
    let mut count = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            count += count_markdown_files(&path);
        } else if name.to_ascii_lowercase().ends_with(".md") {
            count += 1;
        }
    }
    count
}

// ---------------------------------------------------------------------------
// Stub adapter (tests)
// ---------------------------------------------------------------------------

/// In-memory adapter for tests: no I/O, fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct StubAdapter {
    files: std::collections::HashMap<String, String>,
    is_repo: bool,
    has_tracking_marker: bool,
}

impl StubAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    pub fn with_repo_marker(mut self, is_repo: bool, has_tracking_marker: bool) -> Self {
        self.is_repo = is_repo;
        self.has_tracking_marker = has_tracking_marker;
        self
    }
}

#[async_trait]
impl Adapter for StubAdapter {
    async fn read_file(&self, path: &str) -> Option<String> {
        self.files.get(path).cloned()
    }

    async fn list_dir(&self, path: &str) -> Vec<String> {
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{path}/")
        };
        let mut entries = BTreeSet::new();
        for file_path in self.files.keys() {
            let Some(rest) = file_path.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                Some((first, _)) => entries.insert(first.to_string()),
                None => entries.insert(rest.to_string()),
            };
        }
        entries.into_iter().collect()
    }

    async fn exists(&self, path: &str) -> bool {
        if self.files.contains_key(path) {
            return true;
        }
        let prefix = format!("{path}/");
        self.files.keys().any(|p| p.starts_with(&prefix))
    }

    async fn is_repo(&self) -> bool {
        self.is_repo
    }

    async fn has_tracking_marker(&self) -> bool {
        self.has_tracking_marker
    }

    async fn document_count(&self) -> usize {
        self.files
            .keys()
            .filter(|p| p.to_ascii_lowercase().ends_with(".md"))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Sandboxed directory-handle adapter (browser host only)
// ---------------------------------------------------------------------------

#[cfg(feature = "wasm")]
pub mod sandbox {
    //! Adapter over a browser `FileSystemDirectoryHandle`, as granted by a
    //! host page via the File System Access API. Every capability is
    //! probed dynamically with `js_sys::Reflect` rather than assumed,
    //! since the handle's permission scope is decided by the user at grant
    //! time, not by this crate.

    use async_trait::async_trait;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::FileSystemDirectoryHandle;

    use super::{Adapter, AdapterCapabilities};

    /// Adapter wrapping a capability-scoped directory handle.
    pub struct SandboxAdapter {
        root: FileSystemDirectoryHandle,
    }

    impl SandboxAdapter {
        pub fn new(root: FileSystemDirectoryHandle) -> Self {
            Self { root }
        }

        /// Reflect on the wrapped handle to see which of the six
        /// operations it can plausibly support.
        pub fn capabilities(&self) -> AdapterCapabilities {
            let has_method = |name: &str| {
                js_sys::Reflect::has(&self.root, &JsValue::from_str(name)).unwrap_or(false)
            };
            AdapterCapabilities {
                read_file: has_method("getFileHandle"),
                list_dir: has_method("entries") || has_method("values"),
                exists: has_method("getFileHandle") || has_method("getDirectoryHandle"),
                is_repo: false,
                has_tracking_marker: false,
                document_count: has_method("entries") || has_method("values"),
            }
        }

        async fn directory_at(&self, path: &str) -> Option<FileSystemDirectoryHandle> {
            let mut current = self.root.clone();
            if path.is_empty() {
                return Some(current);
            }
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                let promise = current.get_directory_handle(segment);
                let value = JsFuture::from(promise).await.ok()?;
                current = value.dyn_into().ok()?;
            }
            Some(current)
        }
    }

    #[async_trait(?Send)]
    impl Adapter for SandboxAdapter {
        async fn read_file(&self, path: &str) -> Option<String> {
            let (dir_path, file_name) = match path.rsplit_once('/') {
                Some((dir, name)) => (dir, name),
                None => ("", path),
            };
            let dir = self.directory_at(dir_path).await?;
            let file_handle_promise = dir.get_file_handle(file_name);
            let file_handle: web_sys::FileSystemFileHandle =
                JsFuture::from(file_handle_promise).await.ok()?.dyn_into().ok()?;
            let file: web_sys::File = JsFuture::from(file_handle.get_file()).await.ok()?.dyn_into().ok()?;
            let text_promise = file.text();
            let text_value = JsFuture::from(text_promise).await.ok()?;
            text_value.as_string()
        }

        async fn list_dir(&self, path: &str) -> Vec<String> {
            let Some(dir) = self.directory_at(path).await else {
                return Vec::new();
            };
            // `keys()` returns a JS async iterator; web-sys has no typed
            // binding for it, so we drive it by reflection: call `next()`,
            // await the promise it returns, and read `{done, value}` off
            // the result until `done` is true.
            let Ok(keys_fn) = js_sys::Reflect::get(&dir, &JsValue::from_str("keys"))
                .and_then(|f| f.dyn_into::<js_sys::Function>())
            else {
                return Vec::new();
            };
            let Ok(iterator) = keys_fn.call0(&dir) else {
                return Vec::new();
            };
            let Ok(next_fn) = js_sys::Reflect::get(&iterator, &JsValue::from_str("next"))
                .and_then(|f| f.dyn_into::<js_sys::Function>())
            else {
                return Vec::new();
            };

            let mut names = Vec::new();
            loop {
                let Ok(next_value) = next_fn.call0(&iterator) else {
                    break;
                };
                let Ok(next_promise) = next_value.dyn_into::<js_sys::Promise>() else {
                    break;
                };
                let Ok(next_result) = JsFuture::from(next_promise).await else {
                    break;
                };
                let done = js_sys::Reflect::get(&next_result, &JsValue::from_str("done"))
                    .ok()
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true);
                if done {
                    break;
                }
                if let Ok(value) = js_sys::Reflect::get(&next_result, &JsValue::from_str("value")) {
                    if let Some(name) = value.as_string() {
                        names.push(name);
                    }
                }
            }
            names
        }

        async fn exists(&self, path: &str) -> bool {
            let (dir_path, name) = match path.rsplit_once('/') {
                Some((dir, name)) => (dir, name),
                None => ("", path),
            };
            let Some(dir) = self.directory_at(dir_path).await else {
                return false;
            };
            if JsFuture::from(dir.get_file_handle(name)).await.is_ok() {
                return true;
            }
            JsFuture::from(dir.get_directory_handle(name)).await.is_ok()
        }

        async fn is_repo(&self) -> bool {
            false
        }

        async fn has_tracking_marker(&self) -> bool {
            false
        }

        async fn document_count(&self) -> usize {
            0
        }
    }
}
