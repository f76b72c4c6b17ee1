//! Path helpers shared by the shaper and the builder.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// `path` relative to `base`, with `..` where they diverge and `/` as the
/// separator on every platform. Both are expected to be absolute.
pub fn relative_path(path: &Path, base: &Path) -> String {
    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(base_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = std::iter::repeat("..".to_string()).take(base_parts.len() - common);
    let downs = path_parts[common..]
        .iter()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    ups.chain(downs).collect::<Vec<_>>().join("/")
}

/// Memoizes [`relative_path`] for one base directory.
pub struct PathNormalizer<'a> {
    base: &'a Path,
    cache: HashMap<PathBuf, String>,
}

impl<'a> PathNormalizer<'a> {
    pub fn new(base: &'a Path) -> Self {
        Self {
            base,
            cache: HashMap::new(),
        }
    }

    pub fn normalize(&mut self, path: &Path) -> String {
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }
        let relative = relative_path(path, self.base);
        self.cache.insert(path.to_path_buf(), relative.clone());
        relative
    }
}

/// Deepest directory containing every path. Empty input yields `None`.
pub fn common_dir(dirs: &[PathBuf]) -> Option<PathBuf> {
    let (first, rest) = dirs.split_first()?;
    let mut common: Vec<Component> = first.components().collect();
    for dir in rest {
        let shared = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }
    Some(common.iter().collect())
}

/// Whether any component of `path` equals one of `names`.
pub fn has_component(path: &Path, names: &[String]) -> bool {
    path.components().any(|c| match c {
        Component::Normal(part) => names.iter().any(|n| part == n.as_str()),
        _ => false,
    })
}

/// Inside a version-control directory.
pub fn is_vcs_path(path: &Path) -> bool {
    path.components()
        .any(|c| matches!(c, Component::Normal(part) if part == ".git"))
}
