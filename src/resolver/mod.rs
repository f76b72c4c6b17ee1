//! Specifier resolution.
//!
//! Turns a raw specifier plus the file that wrote it into a concrete path.
//! The traversal engine only sees the [`Resolver`] trait and checks the
//! returned path for existence itself. [`FsResolver`] is the default,
//! dispatching on the importing file's language.

pub mod node;
pub mod python;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::parser::SupportedLanguage;

/// Resolution settings. Opaque to the traversal engine, which hands the
/// same bundle to every `resolve` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    /// Project root for aliases and top-level Python packages.
    pub directory: PathBuf,
    /// Extensions tried when a specifier omits one, with leading dot.
    pub extensions: Vec<String>,
    /// Specifier prefix -> path (relative to `directory`).
    pub aliases: BTreeMap<String, PathBuf>,
    /// Directory names searched for bare specifiers.
    pub package_dirs: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            extensions: default_extensions(),
            aliases: BTreeMap::new(),
            package_dirs: vec!["node_modules".to_string()],
        }
    }
}

fn default_extensions() -> Vec<String> {
    [".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".mts", ".cts", ".json"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Resolves a specifier written in `context` to a file path.
///
/// Returning `None` means "not found". A returned path that does not exist
/// is treated the same way by the caller.
pub trait Resolver: Send + Sync {
    fn resolve(&self, specifier: &str, context: &Path, options: &ResolveOptions) -> Option<PathBuf>;
}

/// Default filesystem resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsResolver;

impl Resolver for FsResolver {
    fn resolve(&self, specifier: &str, context: &Path, options: &ResolveOptions) -> Option<PathBuf> {
        match SupportedLanguage::from_path(context)? {
            SupportedLanguage::Python => python::resolve(specifier, context, options),
            _ => node::resolve(specifier, context, options),
        }
    }
}
