//! Core types for the dependency graph.
//!
//! Absolute-path structures are produced by traversal; the relative-path
//! [`OutputGraph`] is what shaping hands back to callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// File node -> its dependencies, in discovery order, without duplicates.
pub type VisitedMap = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Traversed file -> package-manager-internal files it imports.
pub type PackageEdges = BTreeMap<PathBuf, Vec<PathBuf>>;

/// Relative-path key -> sorted relative-path dependencies.
pub type OutputGraph = BTreeMap<String, Vec<String>>;

/// Per-edge predicate: `filter(dependency, importing_file)`.
pub type EdgeFilter<'a> = dyn Fn(&Path, &Path) -> bool + Send + Sync + 'a;

/// Everything a traversal run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalResult {
    /// Adjacency map over canonical absolute paths.
    pub visited: VisitedMap,
    /// Specifiers that resolved to nothing, deduplicated and sorted.
    pub unresolved: Vec<String>,
}

/// The finished, serializable dependency graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyTree {
    /// Module -> modules it depends on.
    pub tree: OutputGraph,
    /// Specifiers that could not be resolved.
    pub skipped: Vec<String>,
}

impl DependencyTree {
    pub fn new(tree: OutputGraph, skipped: Vec<String>) -> Self {
        Self { tree, skipped }
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.tree.values().map(Vec::len).sum()
    }
}

impl fmt::Display for DependencyTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (module, deps) in &self.tree {
            writeln!(f, "{module}")?;
            for dep in deps {
                writeln!(f, "  {dep}")?;
            }
        }
        Ok(())
    }
}
