//! Builds an in-memory document set for integration tests, mirroring the
//! teacher's `server/tests/helpers` fixture style.

use skillgraph_core::StubAdapter;

/// A fluent builder over [`StubAdapter`] for readable scenario setup.
pub struct Fixture {
    adapter: StubAdapter,
}

impl Fixture {
    pub fn new() -> Self {
        Self { adapter: StubAdapter::new() }
    }

    pub fn doc(mut self, path: &str, header: &str, body: &str) -> Self {
        let text = format!("---\n{header}\n---\n{body}");
        self.adapter = self.adapter.with_file(path, text);
        self
    }

    pub fn script(mut self, path: &str) -> Self {
        self.adapter = self.adapter.with_file(path, "#!/bin/sh\n");
        self
    }

    pub fn repo(mut self, is_repo: bool, has_marker: bool) -> Self {
        self.adapter = self.adapter.with_repo_marker(is_repo, has_marker);
        self
    }

    pub fn build(self) -> StubAdapter {
        self.adapter
    }
}
