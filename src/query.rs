//! Read-only queries over a finished [`DependencyTree`].

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::graph::DependencyTree;

/// Module with its number of direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyCount {
    pub module: String,
    pub count: usize,
}

impl DependencyTree {
    /// Circular dependency groups.
    ///
    /// A group is a strongly connected component with more than one module,
    /// or a single module importing itself. Members are sorted within each
    /// group and groups are sorted.
    pub fn circular(&self) -> Vec<Vec<String>> {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        let ids = self
            .tree
            .iter()
            .flat_map(|(module, deps)| std::iter::once(module).chain(deps))
            .map(String::as_str);
        for id in ids {
            index.entry(id).or_insert_with(|| graph.add_node(id));
        }
        for (module, deps) in &self.tree {
            let from = index[module.as_str()];
            for dep in deps {
                graph.add_edge(from, index[dep.as_str()], ());
            }
        }

        let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| match scc.as_slice() {
                [single] => graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|scc| {
                let mut members: Vec<String> = scc.iter().map(|&i| graph[i].to_string()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Modules that depend directly on `id`.
    pub fn depends(&self, id: &str) -> Vec<String> {
        self.tree
            .iter()
            .filter(|(_, deps)| deps.iter().any(|d| d == id))
            .map(|(module, _)| module.clone())
            .collect()
    }

    /// Modules no other module depends on. Self-imports don't count.
    pub fn orphans(&self) -> Vec<String> {
        let depended: BTreeSet<&str> = self
            .tree
            .iter()
            .flat_map(|(module, deps)| {
                deps.iter()
                    .filter(move |d| *d != module)
                    .map(String::as_str)
            })
            .collect();

        self.tree
            .keys()
            .filter(|module| !depended.contains(module.as_str()))
            .cloned()
            .collect()
    }

    /// Modules without dependencies.
    pub fn leaves(&self) -> Vec<String> {
        self.tree
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(module, _)| module.clone())
            .collect()
    }

    /// Dependency count per module, most dependencies first, ties by name.
    pub fn summary(&self) -> Vec<DependencyCount> {
        let mut counts: Vec<DependencyCount> = self
            .tree
            .iter()
            .map(|(module, deps)| DependencyCount {
                module: module.clone(),
                count: deps.len(),
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.module.cmp(&b.module)));
        counts
    }

    /// Specifiers that could not be resolved.
    pub fn warnings(&self) -> &[String] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::OutputGraph;

    fn tree(edges: &[(&str, &str)]) -> DependencyTree {
        let graph: OutputGraph = edges
            .iter()
            .map(|(module, deps)| {
                (
                    module.to_string(),
                    deps.split_whitespace().map(String::from).collect(),
                )
            })
            .collect();
        DependencyTree::new(graph, vec!["missing".to_string()])
    }

    #[test]
    fn test_circular_groups() {
        let t = tree(&[
            ("a", "b"),
            ("b", "c"),
            ("c", "a"),
            ("d", "d e"),
            ("e", ""),
            ("f", "g"),
            ("g", "f"),
        ]);
        assert_eq!(
            t.circular(),
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()],
                vec!["f".to_string(), "g".to_string()],
            ]
        );
    }

    #[test]
    fn test_acyclic_has_no_circular() {
        let t = tree(&[("a", "b c"), ("b", "c"), ("c", "")]);
        assert!(t.circular().is_empty());
    }

    #[test]
    fn test_depends() {
        let t = tree(&[("a", "c"), ("b", "c"), ("c", "")]);
        assert_eq!(t.depends("c"), vec!["a", "b"]);
        assert!(t.depends("a").is_empty());
        assert!(t.depends("nope").is_empty());
    }

    #[test]
    fn test_orphans_ignore_self_imports() {
        let t = tree(&[("a", "a b"), ("b", ""), ("c", "b")]);
        assert_eq!(t.orphans(), vec!["a", "c"]);
    }

    #[test]
    fn test_leaves() {
        let t = tree(&[("a", "b"), ("b", ""), ("c", "")]);
        assert_eq!(t.leaves(), vec!["b", "c"]);
    }

    #[test]
    fn test_summary_order() {
        let t = tree(&[("a", "x"), ("b", "x y"), ("c", "x"), ("x", ""), ("y", "")]);
        let summary: Vec<(String, usize)> = t
            .summary()
            .into_iter()
            .map(|c| (c.module, c.count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("b".to_string(), 2),
                ("a".to_string(), 1),
                ("c".to_string(), 1),
                ("x".to_string(), 0),
                ("y".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_warnings() {
        assert_eq!(tree(&[]).warnings(), ["missing".to_string()]);
    }
}
