//! Dependency specifier extraction.
//!
//! The traversal engine only sees the [`DependencyParser`] trait. The default
//! implementation, [`TreeSitterParser`], reads a file, picks a grammar by
//! extension and walks the syntax tree for import-like constructs.

pub mod imports;
pub mod language;

pub use language::SupportedLanguage;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{DepTreeError, Result};

/// Knobs for specifier extraction. Passed through unmodified for every file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Drop TypeScript `import type` statements.
    pub skip_type_imports: bool,
    /// Drop dynamic `import('x')` expressions.
    pub skip_dynamic_imports: bool,
    /// Keep Node.js built-in modules (`fs`, `node:path`, ...).
    pub include_core: bool,
}

/// Produces the raw dependency specifiers of a file.
///
/// Implementations must be cheap to share across threads; the traversal
/// engine calls `parse` concurrently for different files.
pub trait DependencyParser: Send + Sync {
    fn parse(&self, path: &Path, options: &ParseOptions) -> Result<Vec<String>>;
}

/// Default parser backed by tree-sitter grammars.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterParser;

impl DependencyParser for TreeSitterParser {
    fn parse(&self, path: &Path, options: &ParseOptions) -> Result<Vec<String>> {
        let source = fs::read_to_string(path).map_err(|e| DepTreeError::io(path, e))?;
        extract_specifiers(path, &source, options)
    }
}

/// Extract dependency specifiers from `source`, using `path` only to pick
/// the grammar. Specifiers are deduplicated and keep source order.
pub fn extract_specifiers(path: &Path, source: &str, options: &ParseOptions) -> Result<Vec<String>> {
    let language = SupportedLanguage::from_path(path)
        .ok_or_else(|| DepTreeError::UnsupportedLanguage(path.to_path_buf()))?;

    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.tree_sitter_language())
        .map_err(|_| DepTreeError::Parse(path.to_path_buf()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DepTreeError::Parse(path.to_path_buf()))?;

    let root = tree.root_node();
    let raw = if language.is_ecmascript() {
        imports::javascript::extract_javascript_imports(&root, source.as_bytes(), options)
    } else {
        imports::python::extract_python_imports(&root, source.as_bytes())
    };

    let mut seen = HashSet::new();
    let specifiers: Vec<String> = raw
        .into_iter()
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect();

    debug!(
        file = %path.display(),
        language = language.name(),
        count = specifiers.len(),
        "extracted specifiers"
    );
    Ok(specifiers)
}
