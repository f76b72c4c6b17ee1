//! Dependency graph module — traversal, closure shaping and the builder
//! that ties them to the filesystem.

pub mod builder;
pub mod closure;
pub mod paths;
pub mod traverse;
pub mod types;

pub use builder::{
    build_tree, collect_seed_files, generate, resolve_base_dir, BuildOptions, Collaborators,
};
pub use closure::{frontier, shape, ExcludeSet, ShapeOptions};
pub use traverse::{traverse, TraversalContext};
pub use types::{
    DependencyTree, EdgeFilter, OutputGraph, PackageEdges, TraversalResult, VisitedMap,
};
