//! Build-time configuration for the indexing pipeline.
//!
//! These are plain, `Default`-able records rather than dynamic options —
//! every field a build phase consults is named here up front.

/// Controls which node kinds the Adjacency Exporter includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyOptions {
    pub include_ghost: bool,
    pub include_scripts: bool,
    pub include_cycles: bool,
}

impl Default for AdjacencyOptions {
    fn default() -> Self {
        Self {
            include_ghost: false,
            include_scripts: false,
            include_cycles: false,
        }
    }
}

/// Host-supplied configuration for one `build_graph` call.
///
/// `dense_threshold` and `density_threshold` are not read anywhere in this
/// crate; they are carried through to [`crate::Meta`] unchanged for a
/// downstream layout engine to consume.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub condense_cycles: bool,
    pub adjacency_options: AdjacencyOptions,
    pub dense_threshold: Option<f64>,
    pub density_threshold: Option<f64>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            condense_cycles: true,
            adjacency_options: AdjacencyOptions::default(),
            dense_threshold: None,
            density_threshold: None,
        }
    }
}
