//! # deptree
//!
//! File-level dependency graphs for JavaScript, TypeScript and Python.
//!
//! Starting from a set of seed files, deptree discovers every file reachable
//! through import statements, in parallel, then shapes the result into a
//! deterministic map of relative paths.
//!
//! ## Key Features
//!
//! - **Parallel traversal**: each file is parsed exactly once, cycles included
//! - **Depth bounds**: limit the graph to N hops while keeping transitive edges
//! - **Pluggable**: bring your own [`DependencyParser`] or [`Resolver`]
//! - **Queries**: circular dependencies, orphans, leaves, dependents
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deptree::{generate, DepTreeConfig};
//! use std::path::PathBuf;
//!
//! let tree = generate(&[PathBuf::from("src")], &DepTreeConfig::default())?;
//! for cycle in tree.circular() {
//!     println!("{}", cycle.join(" > "));
//! }
//! # Ok::<(), deptree::DepTreeError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod query;
pub mod resolver;

// Re-exports for convenience
pub use config::DepTreeConfig;
pub use error::{DepTreeError, Result};

// Graph re-exports
pub use graph::{
    build_tree, collect_seed_files, generate, shape, traverse, BuildOptions, Collaborators,
    DependencyTree, EdgeFilter, OutputGraph, ShapeOptions, TraversalContext, TraversalResult,
};
pub use parser::{DependencyParser, ParseOptions, SupportedLanguage, TreeSitterParser};
pub use query::DependencyCount;
pub use resolver::{FsResolver, ResolveOptions, Resolver};
