//! Language detection and tree-sitter grammar loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Language;

/// Languages the default parser and resolver understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportedLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Python,
}

impl SupportedLanguage {
    /// Detect language from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "js" | "mjs" | "cjs" | "jsx" => Some(SupportedLanguage::JavaScript),
            "ts" | "mts" | "cts" => Some(SupportedLanguage::TypeScript),
            "tsx" => Some(SupportedLanguage::Tsx),
            "py" | "pyw" => Some(SupportedLanguage::Python),
            _ => None,
        }
    }

    /// Get the tree-sitter Language for this language.
    pub fn tree_sitter_language(&self) -> Language {
        match self {
            SupportedLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            SupportedLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SupportedLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SupportedLanguage::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            SupportedLanguage::JavaScript => "JavaScript",
            SupportedLanguage::TypeScript => "TypeScript",
            SupportedLanguage::Tsx => "TSX",
            SupportedLanguage::Python => "Python",
        }
    }

    /// JavaScript, TypeScript and TSX share one module system.
    pub fn is_ecmascript(&self) -> bool {
        matches!(
            self,
            SupportedLanguage::JavaScript | SupportedLanguage::TypeScript | SupportedLanguage::Tsx
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(
            SupportedLanguage::from_path(Path::new("a/b.mjs")),
            Some(SupportedLanguage::JavaScript)
        );
        assert_eq!(
            SupportedLanguage::from_path(Path::new("a/b.cts")),
            Some(SupportedLanguage::TypeScript)
        );
        assert_eq!(
            SupportedLanguage::from_path(Path::new("view.tsx")),
            Some(SupportedLanguage::Tsx)
        );
        assert_eq!(
            SupportedLanguage::from_path(Path::new("pkg/__init__.py")),
            Some(SupportedLanguage::Python)
        );
        assert_eq!(SupportedLanguage::from_path(Path::new("Makefile")), None);
        assert_eq!(SupportedLanguage::from_path(Path::new("main.rs")), None);
    }

    #[test]
    fn test_ecmascript_family() {
        assert!(SupportedLanguage::Tsx.is_ecmascript());
        assert!(SupportedLanguage::JavaScript.is_ecmascript());
        assert!(!SupportedLanguage::Python.is_ecmascript());
    }
}
