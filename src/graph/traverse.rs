//! Traversal engine — turns seed files into a complete adjacency map.
//!
//! Every file node is claimed in a shared table before any work is done on
//! it. Whoever wins the claim parses the file, resolves its specifiers and
//! spawns traversal of the dependencies it discovered; everyone else
//! returns immediately. That single insert-if-absent is what bounds the
//! work to one parse per file and makes cycles terminate.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use super::types::{EdgeFilter, TraversalResult};
use crate::parser::{DependencyParser, ParseOptions};
use crate::resolver::{ResolveOptions, Resolver};

/// Read-only inputs shared by every traversal step.
pub struct TraversalContext<'a> {
    pub parser: &'a dyn DependencyParser,
    pub resolver: &'a dyn Resolver,
    pub parse_options: &'a ParseOptions,
    pub resolve_options: &'a ResolveOptions,
    /// `filter(dependency, importing_file)`; rejected edges are neither
    /// recorded nor followed.
    pub filter: Option<&'a EdgeFilter<'a>>,
}

/// A claimed node is `Pending` until its edge list is known.
enum Slot {
    Pending,
    Done(Vec<PathBuf>),
}

struct Traversal<'a> {
    context: &'a TraversalContext<'a>,
    visited: Mutex<HashMap<PathBuf, Slot>>,
    unresolved: Mutex<Vec<String>>,
}

/// Traverse the dependency graph reachable from `seeds`.
///
/// Seeds that do not exist are skipped. Runs on the current rayon pool;
/// siblings are explored concurrently.
pub fn traverse(seeds: &[PathBuf], context: &TraversalContext<'_>) -> TraversalResult {
    let roots: Vec<PathBuf> = seeds
        .iter()
        .filter_map(|seed| match fs::canonicalize(seed) {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(seed = %seed.display(), error = %e, "skipping missing seed");
                None
            }
        })
        .collect();

    let traversal = Traversal {
        context,
        visited: Mutex::new(HashMap::new()),
        unresolved: Mutex::new(Vec::new()),
    };

    rayon::scope(|scope| {
        for root in roots {
            let traversal = &traversal;
            scope.spawn(move |s| traversal.visit(root, s));
        }
    });

    traversal.finish()
}

impl<'a> Traversal<'a> {
    fn visit<'s>(&'s self, file: PathBuf, scope: &rayon::Scope<'s>) {
        if !self.claim(&file) {
            return;
        }

        let dependencies = self.dependencies_of(&file);
        for dependency in &dependencies {
            if !self.is_claimed(dependency) {
                let dependency = dependency.clone();
                scope.spawn(move |s| self.visit(dependency, s));
            }
        }

        self.fill(file, dependencies);
    }

    /// Insert-if-absent. Returns true when this caller owns the node.
    fn claim(&self, file: &Path) -> bool {
        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if visited.contains_key(file) {
            return false;
        }
        visited.insert(file.to_path_buf(), Slot::Pending);
        true
    }

    fn is_claimed(&self, file: &Path) -> bool {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(file)
    }

    fn fill(&self, file: PathBuf, dependencies: Vec<PathBuf>) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(file, Slot::Done(dependencies));
    }

    /// Parse, resolve, dedupe and filter the direct dependencies of `file`.
    fn dependencies_of(&self, file: &Path) -> Vec<PathBuf> {
        let ctx = self.context;

        let specifiers = match ctx.parser.parse(file, ctx.parse_options) {
            Ok(specifiers) => specifiers,
            Err(e) => {
                debug!(file = %file.display(), error = %e, "parse failed, no dependencies");
                Vec::new()
            }
        };

        let resolved: Vec<Result<PathBuf, &String>> = specifiers
            .par_iter()
            .map(|specifier| {
                ctx.resolver
                    .resolve(specifier, file, ctx.resolve_options)
                    .and_then(|path| fs::canonicalize(path).ok())
                    .ok_or(specifier)
            })
            .collect();

        let mut seen = HashSet::new();
        let mut dependencies = Vec::with_capacity(resolved.len());
        let mut missing = Vec::new();
        for result in resolved {
            match result {
                Ok(path) => {
                    if seen.insert(path.clone()) {
                        dependencies.push(path);
                    }
                }
                Err(specifier) => missing.push(specifier.clone()),
            }
        }

        if !missing.is_empty() {
            debug!(file = %file.display(), ?missing, "unresolved specifiers");
            self.unresolved
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(missing);
        }

        if let Some(filter) = ctx.filter {
            dependencies.retain(|dependency| filter(dependency, file));
        }

        dependencies
    }

    fn finish(self) -> TraversalResult {
        let visited = self
            .visited
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .map(|(path, slot)| match slot {
                Slot::Done(dependencies) => (path, dependencies),
                Slot::Pending => (path, Vec::new()),
            })
            .collect();

        let mut unresolved = self
            .unresolved
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        unresolved.sort();
        unresolved.dedup();

        let result = TraversalResult {
            visited,
            unresolved,
        };
        info!(
            files = result.visited.len(),
            unresolved = result.unresolved.len(),
            "traversal complete"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DepTreeError, Result};
    use tempfile::TempDir;

    /// Specifiers per file name; every specifier names a file in the root.
    struct MapParser {
        deps: HashMap<PathBuf, Vec<String>>,
        calls: Mutex<HashMap<PathBuf, usize>>,
        broken: Option<PathBuf>,
    }

    impl MapParser {
        fn calls(&self, path: &Path) -> usize {
            self.calls.lock().unwrap().get(path).copied().unwrap_or(0)
        }
    }

    impl DependencyParser for MapParser {
        fn parse(&self, path: &Path, _options: &ParseOptions) -> Result<Vec<String>> {
            *self.calls.lock().unwrap().entry(path.to_path_buf()).or_default() += 1;
            if self.broken.as_deref() == Some(path) {
                return Err(DepTreeError::Parse(path.to_path_buf()));
            }
            Ok(self.deps.get(path).cloned().unwrap_or_default())
        }
    }

    /// Resolves into the root directory and counts calls per importing file.
    struct DirResolver {
        root: PathBuf,
        calls: Mutex<HashMap<PathBuf, usize>>,
    }

    impl DirResolver {
        fn new(root: &Path) -> Self {
            Self {
                root: root.to_path_buf(),
                calls: Mutex::new(HashMap::new()),
            }
        }

        fn calls(&self, context: &Path) -> usize {
            self.calls.lock().unwrap().get(context).copied().unwrap_or(0)
        }
    }

    impl Resolver for DirResolver {
        fn resolve(&self, specifier: &str, context: &Path, _options: &ResolveOptions) -> Option<PathBuf> {
            *self.calls.lock().unwrap().entry(context.to_path_buf()).or_default() += 1;
            if specifier.starts_with('!') {
                return None;
            }
            Some(self.root.join(specifier))
        }
    }

    /// `(file, "dep dep ...")` pairs. Every listed name gets a file except
    /// targets starting with `?` (resolve to a missing path) and `!` (never
    /// resolve).
    fn fixture(edges: &[(&str, &str)]) -> (TempDir, PathBuf, MapParser) {
        let dir = tempfile::tempdir().unwrap();
        let root = fs::canonicalize(dir.path()).unwrap();
        let mut deps = HashMap::new();
        for (source, targets) in edges {
            fs::write(root.join(source), "").unwrap();
            for target in targets.split_whitespace() {
                if !target.starts_with('?') && !target.starts_with('!') {
                    fs::write(root.join(target), "").unwrap();
                }
            }
            deps.insert(
                root.join(source),
                targets.split_whitespace().map(String::from).collect(),
            );
        }
        let parser = MapParser {
            deps,
            calls: Mutex::new(HashMap::new()),
            broken: None,
        };
        (dir, root, parser)
    }

    fn run(root: &Path, parser: &MapParser, seeds: &[&str], filter: Option<&EdgeFilter<'_>>) -> TraversalResult {
        run_with(root, parser, &DirResolver::new(root), seeds, filter)
    }

    fn run_with(
        root: &Path,
        parser: &MapParser,
        resolver: &DirResolver,
        seeds: &[&str],
        filter: Option<&EdgeFilter<'_>>,
    ) -> TraversalResult {
        let parse_options = ParseOptions::default();
        let resolve_options = ResolveOptions::default();
        let context = TraversalContext {
            parser,
            resolver,
            parse_options: &parse_options,
            resolve_options: &resolve_options,
            filter,
        };
        let seeds: Vec<PathBuf> = seeds.iter().map(|s| root.join(s)).collect();
        traverse(&seeds, &context)
    }

    #[test]
    fn test_cycle_with_missing_module() {
        let (_dir, root, parser) = fixture(&[("a.js", "b.js !m"), ("b.js", "a.js")]);
        let result = run(&root, &parser, &["a.js"], None);

        assert_eq!(result.visited.len(), 2);
        assert_eq!(result.visited[&root.join("a.js")], vec![root.join("b.js")]);
        assert_eq!(result.visited[&root.join("b.js")], vec![root.join("a.js")]);
        assert_eq!(result.unresolved, vec!["!m"]);
    }

    #[test]
    fn test_self_loop_terminates() {
        let (_dir, root, parser) = fixture(&[("a.js", "a.js")]);
        let result = run(&root, &parser, &["a.js"], None);
        assert_eq!(result.visited[&root.join("a.js")], vec![root.join("a.js")]);
        assert_eq!(parser.calls(&root.join("a.js")), 1);
    }

    #[test]
    fn test_diamond_visits_shared_node_once() {
        let (_dir, root, parser) = fixture(&[
            ("a.js", "b.js c.js"),
            ("b.js", "d.js"),
            ("c.js", "d.js"),
            ("d.js", "e.js !x"),
        ]);
        let resolver = DirResolver::new(&root);
        let result = run_with(&root, &parser, &resolver, &["a.js", "b.js", "c.js"], None);

        assert_eq!(result.visited.len(), 5);
        for name in ["a.js", "b.js", "c.js", "d.js", "e.js"] {
            assert_eq!(parser.calls(&root.join(name)), 1, "{name} parsed more than once");
        }
        // one resolve per specifier of d.js, no matter how many importers
        assert_eq!(resolver.calls(&root.join("d.js")), 2);
        assert_eq!(resolver.calls(&root.join("a.js")), 2);
        assert_eq!(result.unresolved, vec!["!x"]);
    }

    #[test]
    fn test_long_cycle_terminates() {
        let names: Vec<String> = (0..64).map(|i| format!("m{i}.js")).collect();
        let edges: Vec<(&str, &str)> = (0..64)
            .map(|i| (names[i].as_str(), names[(i + 1) % 64].as_str()))
            .collect();
        let (_dir, root, parser) = fixture(&edges);

        let result = run(&root, &parser, &["m0.js"], None);
        assert_eq!(result.visited.len(), 64);
        for name in &names {
            assert_eq!(parser.calls(&root.join(name)), 1);
        }
    }

    #[test]
    fn test_unresolved_deduplicated_across_importers() {
        let (_dir, root, parser) = fixture(&[
            ("p.js", "?x.js ?y.js"),
            ("q.js", "?x.js"),
        ]);
        let result = run(&root, &parser, &["p.js", "q.js"], None);

        assert_eq!(result.unresolved, vec!["?x.js", "?y.js"]);
        assert!(result.visited[&root.join("p.js")].is_empty());
    }

    #[test]
    fn test_missing_seed_is_skipped() {
        let (_dir, root, parser) = fixture(&[("a.js", "")]);
        let result = run(&root, &parser, &["a.js", "ghost.js"], None);
        assert_eq!(result.visited.len(), 1);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn test_filter_drops_edge_and_subtree() {
        let (_dir, root, parser) = fixture(&[
            ("a.js", "b.js c.js"),
            ("b.js", "d.js"),
            ("c.js", ""),
        ]);
        let skip_b: &EdgeFilter<'_> = &|dep: &Path, _source: &Path| !dep.ends_with("b.js");
        let result = run(&root, &parser, &["a.js"], Some(skip_b));

        assert_eq!(result.visited[&root.join("a.js")], vec![root.join("c.js")]);
        assert!(!result.visited.contains_key(&root.join("b.js")));
        assert_eq!(parser.calls(&root.join("b.js")), 0);
        assert_eq!(parser.calls(&root.join("d.js")), 0);
    }

    #[test]
    fn test_parse_failure_is_a_leaf() {
        let (_dir, root, mut parser) = fixture(&[("a.js", "b.js"), ("b.js", "c.js")]);
        parser.broken = Some(root.join("b.js"));

        let result = run(&root, &parser, &["a.js"], None);
        assert_eq!(result.visited[&root.join("a.js")], vec![root.join("b.js")]);
        assert!(result.visited[&root.join("b.js")].is_empty());
        assert!(!result.visited.contains_key(&root.join("c.js")));
    }

    #[test]
    fn test_duplicate_edges_collapse_to_one_node() {
        let (_dir, root, parser) = fixture(&[("a.js", "b.js ./b.js c.js b.js")]);
        let result = run(&root, &parser, &["a.js"], None);
        assert_eq!(
            result.visited[&root.join("a.js")],
            vec![root.join("b.js"), root.join("c.js")]
        );
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let (_dir, root, parser) = fixture(&[
            ("a.js", "b.js c.js ?gone.js"),
            ("b.js", "c.js d.js"),
            ("c.js", "a.js !lib"),
            ("d.js", "b.js"),
        ]);
        let first = run(&root, &parser, &["a.js"], None);
        let second = run(&root, &parser, &["d.js", "a.js"], None);
        assert_eq!(first, second);
    }
}
