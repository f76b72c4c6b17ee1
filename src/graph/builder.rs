//! Graph builder — the invocation surface around traversal and shaping.
//!
//! Enumerates seed files, composes the per-edge filter (version-control
//! and package-manager paths, then the caller's filter), runs traversal on
//! the configured pool and shapes the result.

use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

use super::closure::{shape, ExcludeSet, ShapeOptions};
use super::paths::{common_dir, has_component, is_vcs_path};
use super::traverse::{traverse, TraversalContext};
use super::types::{DependencyTree, EdgeFilter, PackageEdges, TraversalResult};
use crate::config::DepTreeConfig;
use crate::error::{DepTreeError, Result};
use crate::parser::{DependencyParser, ParseOptions, TreeSitterParser};
use crate::resolver::{FsResolver, ResolveOptions, Resolver};

/// Settings for one [`build_tree`] run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Output paths are relative to this directory.
    pub base_dir: PathBuf,
    pub depth: Option<usize>,
    /// Exclusion regexes, compiled before traversal starts.
    pub exclude: Vec<String>,
    /// Keep package-manager-internal dependencies as leaf edges.
    pub include_npm: bool,
    /// Directory names marking package-manager-internal paths.
    pub package_dirs: Vec<String>,
    pub resolve: ResolveOptions,
    pub parse: ParseOptions,
    /// Dedicated traversal pool size; the global rayon pool when `None`.
    pub threads: Option<usize>,
}

impl BuildOptions {
    pub fn new(base_dir: PathBuf) -> Self {
        Self::from_config(&DepTreeConfig::default(), base_dir)
    }

    pub fn from_config(config: &DepTreeConfig, base_dir: PathBuf) -> Self {
        let resolve = ResolveOptions {
            directory: base_dir.clone(),
            aliases: config.aliases.clone(),
            package_dirs: config.package_dirs.clone(),
            ..ResolveOptions::default()
        };
        Self {
            base_dir,
            depth: config.depth,
            exclude: config.exclude.clone(),
            include_npm: config.include_npm,
            package_dirs: config.package_dirs.clone(),
            resolve,
            parse: config.parse.clone(),
            threads: config.threads,
        }
    }
}

/// The pluggable parts of a run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub parser: &'a dyn DependencyParser,
    pub resolver: &'a dyn Resolver,
    /// `filter(dependency, importing_file)`, consulted after the built-in
    /// path rules.
    pub filter: Option<&'a EdgeFilter<'a>>,
}

impl Default for Collaborators<'_> {
    fn default() -> Self {
        Self {
            parser: &TreeSitterParser,
            resolver: &FsResolver,
            filter: None,
        }
    }
}

/// Build the dependency tree of `seeds`.
///
/// Exclusion patterns are validated first; a malformed one fails the run
/// before any file is read. The base directory is canonicalized and must
/// exist.
pub fn build_tree(
    seeds: &[PathBuf],
    options: &BuildOptions,
    collaborators: Collaborators<'_>,
) -> Result<DependencyTree> {
    let exclude = ExcludeSet::new(&options.exclude)?;
    let base_dir = fs::canonicalize(&options.base_dir)
        .map_err(|e| DepTreeError::io(&options.base_dir, e))?;
    let seeds: Vec<PathBuf> = seeds
        .iter()
        .filter_map(|seed| fs::canonicalize(seed).ok())
        .collect();

    let package_edges = Mutex::new(PackageEdges::new());
    let result = {
        let user_filter = collaborators.filter;
        let filter: &EdgeFilter<'_> = &|dependency: &Path, source: &Path| {
            if is_vcs_path(dependency) {
                return false;
            }
            let within_base = dependency.strip_prefix(&base_dir).unwrap_or(dependency);
            if has_component(within_base, &options.package_dirs) {
                if options.include_npm {
                    package_edges
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .entry(source.to_path_buf())
                        .or_default()
                        .push(dependency.to_path_buf());
                }
                return false;
            }
            user_filter.map_or(true, |f| f(dependency, source))
        };

        let context = TraversalContext {
            parser: collaborators.parser,
            resolver: collaborators.resolver,
            parse_options: &options.parse,
            resolve_options: &options.resolve,
            filter: Some(filter),
        };
        run_traversal(&seeds, &context, options.threads)?
    };

    let shape_options = ShapeOptions {
        base_dir,
        depth: options.depth,
        exclude,
        package_edges: package_edges
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner),
    };
    let tree = DependencyTree::new(
        shape(&result.visited, &seeds, &shape_options),
        result.unresolved,
    );

    info!(
        modules = tree.len(),
        edges = tree.edge_count(),
        skipped = tree.skipped.len(),
        "dependency tree built"
    );
    Ok(tree)
}

fn run_traversal(
    seeds: &[PathBuf],
    context: &TraversalContext<'_>,
    threads: Option<usize>,
) -> Result<TraversalResult> {
    match threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
            Ok(pool.install(|| traverse(seeds, context)))
        }
        None => Ok(traverse(seeds, context)),
    }
}

/// Build the tree for user-supplied files and directories with the default
/// parser and resolver.
pub fn generate(paths: &[PathBuf], config: &DepTreeConfig) -> Result<DependencyTree> {
    let base_dir = resolve_base_dir(paths, config.base_dir.as_deref())?;
    let seeds = collect_seed_files(paths, &config.file_extensions, &config.package_dirs)?;
    info!(
        base = %base_dir.display(),
        seeds = seeds.len(),
        "generating dependency tree"
    );

    let options = BuildOptions::from_config(config, base_dir);
    build_tree(&seeds, &options, Collaborators::default())
}

/// The configured base directory, or the deepest directory containing all
/// inputs (a file contributes its parent).
pub fn resolve_base_dir(paths: &[PathBuf], configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = configured {
        return fs::canonicalize(dir).map_err(|e| DepTreeError::io(dir, e));
    }

    let mut dirs = Vec::with_capacity(paths.len());
    for path in paths {
        let canonical = fs::canonicalize(path).map_err(|e| DepTreeError::io(path, e))?;
        if canonical.is_dir() {
            dirs.push(canonical);
        } else if let Some(parent) = canonical.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    match common_dir(&dirs) {
        Some(dir) => Ok(dir),
        None => std::env::current_dir().map_err(|e| DepTreeError::io(".", e)),
    }
}

/// Expand files and directories into canonical seed files.
///
/// Files are taken as given. Directories are walked respecting .gitignore,
/// skipping version-control and package-manager paths, keeping files
/// whose extension is in `extensions`.
pub fn collect_seed_files(
    paths: &[PathBuf],
    extensions: &[String],
    package_dirs: &[String],
) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for path in paths {
        let metadata = fs::metadata(path).map_err(|e| DepTreeError::io(path, e))?;
        if metadata.is_file() {
            if !is_vcs_path(path) {
                let canonical = fs::canonicalize(path).map_err(|e| DepTreeError::io(path, e))?;
                if seen.insert(canonical.clone()) {
                    files.push(canonical);
                }
            }
            continue;
        }

        let walker = WalkBuilder::new(path)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        {
            let file = entry.path();
            let within = file.strip_prefix(path).unwrap_or(file);
            if is_vcs_path(within) || has_component(within, package_dirs) {
                continue;
            }
            let wanted = file
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e == ext));
            if !wanted {
                continue;
            }

            let canonical = fs::canonicalize(file).map_err(|e| DepTreeError::io(file, e))?;
            if seen.insert(canonical.clone()) {
                files.push(canonical);
            }
        }
    }

    Ok(files)
}
