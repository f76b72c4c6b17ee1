//! Closure shaper — turns the raw adjacency map into the output graph.
//!
//! Without a depth bound the output is the visited map with relative keys.
//! With a bound of `D`, only modules within `D` hops of a seed become keys,
//! and each key's edges are its deep dependencies: frontier modules reached
//! directly or by skipping through modules outside the frontier.

use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::paths::PathNormalizer;
use super::types::{OutputGraph, PackageEdges, VisitedMap};
use crate::error::{DepTreeError, Result};

/// Compiled exclusion patterns. A key or edge is dropped when any pattern
/// matches anywhere in its relative path.
#[derive(Debug, Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<Regex>,
}

impl ExcludeSet {
    /// Compile every pattern; the first malformed one is an error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| DepTreeError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(id))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Everything shaping needs besides the visited map and the seeds.
#[derive(Debug, Clone, Default)]
pub struct ShapeOptions {
    /// Keys and edges are made relative to this directory.
    pub base_dir: PathBuf,
    /// Maximum hops from a seed; `None` keeps the whole graph.
    pub depth: Option<usize>,
    pub exclude: ExcludeSet,
    /// Appended as leaf edges of their importing file.
    pub package_edges: PackageEdges,
}

/// Shape `visited` into the output graph.
///
/// `seeds` must use the same canonical paths as the visited map; seeds
/// missing from it are ignored.
pub fn shape(visited: &VisitedMap, seeds: &[PathBuf], options: &ShapeOptions) -> OutputGraph {
    let mut normalizer = PathNormalizer::new(&options.base_dir);
    let mut graph = OutputGraph::new();

    match options.depth {
        None => {
            for (module, dependencies) in visited {
                let key = normalizer.normalize(module);
                let edges = dependencies.iter().map(|d| normalizer.normalize(d)).collect();
                graph.insert(key, edges);
            }
        }
        Some(depth) => {
            let mut closure = DeepDependencies::new(visited, frontier(visited, seeds, depth));
            let members: Vec<&Path> = closure.frontier.iter().copied().collect();
            debug!(depth, frontier = members.len(), "computing deep dependencies");
            for module in members {
                let deep = closure.of(module);
                let key = normalizer.normalize(module);
                let edges = deep.iter().map(|d| normalizer.normalize(d)).collect();
                graph.insert(key, edges);
            }
        }
    }

    for (importer, packages) in &options.package_edges {
        let key = normalizer.normalize(importer);
        if let Some(edges) = graph.get_mut(&key) {
            edges.extend(packages.iter().map(|p| normalizer.normalize(p)));
        }
    }

    graph
        .into_iter()
        .filter(|(module, _)| !options.exclude.is_excluded(module))
        .map(|(module, mut edges)| {
            edges.retain(|edge| !options.exclude.is_excluded(edge));
            edges.sort();
            edges.dedup();
            (module, edges)
        })
        .collect()
}

/// Modules within `depth` hops of the seeds, seeds included.
pub fn frontier<'v>(visited: &'v VisitedMap, seeds: &[PathBuf], depth: usize) -> BTreeSet<&'v Path> {
    let mut members = BTreeSet::new();
    let mut queue = VecDeque::new();

    for seed in seeds {
        if let Some((key, _)) = visited.get_key_value(seed) {
            if members.insert(key.as_path()) {
                queue.push_back((key.as_path(), 0));
            }
        }
    }

    while let Some((module, hops)) = queue.pop_front() {
        if hops == depth {
            continue;
        }
        for dependency in visited.get(module).into_iter().flatten() {
            if members.insert(dependency.as_path()) {
                queue.push_back((dependency.as_path(), hops + 1));
            }
        }
    }

    members
}

enum DeepState<'v> {
    InProgress,
    Done(Vec<&'v Path>),
}

/// Memoized deep-dependency computation over a fixed frontier.
struct DeepDependencies<'v> {
    visited: &'v VisitedMap,
    frontier: BTreeSet<&'v Path>,
    memo: HashMap<&'v Path, DeepState<'v>>,
}

impl<'v> DeepDependencies<'v> {
    fn new(visited: &'v VisitedMap, frontier: BTreeSet<&'v Path>) -> Self {
        Self {
            visited,
            frontier,
            memo: HashMap::new(),
        }
    }

    /// Frontier dependencies of `module`, expanding through non-frontier
    /// modules. Re-entering a module still in progress contributes nothing.
    ///
    /// Depth-first with an explicit stack; chains outside the frontier can
    /// be arbitrarily long.
    fn of(&mut self, module: &'v Path) -> Vec<&'v Path> {
        match self.memo.get(module) {
            Some(DeepState::InProgress) => return Vec::new(),
            Some(DeepState::Done(deep)) => return deep.clone(),
            None => {}
        }
        self.memo.insert(module, DeepState::InProgress);

        let visited = self.visited;
        let mut stack = vec![Frame::new(module)];
        loop {
            let Some(frame) = stack.last_mut() else {
                return Vec::new();
            };
            let dependencies = visited.get(frame.module).map_or(&[][..], Vec::as_slice);

            if let Some(dependency) = dependencies.get(frame.next) {
                frame.next += 1;
                let dependency = dependency.as_path();
                if self.frontier.contains(dependency) {
                    frame.add(dependency);
                    continue;
                }
                match self.memo.get(dependency) {
                    Some(DeepState::InProgress) => {}
                    Some(DeepState::Done(deep)) => frame.extend(deep),
                    None => {
                        self.memo.insert(dependency, DeepState::InProgress);
                        stack.push(Frame::new(dependency));
                    }
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                return Vec::new();
            };
            self.memo.insert(done.module, DeepState::Done(done.deep.clone()));
            match stack.last_mut() {
                Some(parent) => parent.extend(&done.deep),
                None => return done.deep,
            }
        }
    }
}

/// One module being expanded: the next dependency to look at and what has
/// been collected so far.
struct Frame<'v> {
    module: &'v Path,
    next: usize,
    deep: Vec<&'v Path>,
    seen: HashSet<&'v Path>,
}

impl<'v> Frame<'v> {
    fn new(module: &'v Path) -> Self {
        Self {
            module,
            next: 0,
            deep: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn add(&mut self, found: &'v Path) {
        if self.seen.insert(found) {
            self.deep.push(found);
        }
    }

    fn extend(&mut self, found: &[&'v Path]) {
        for &path in found {
            self.add(path);
        }
    }
}
