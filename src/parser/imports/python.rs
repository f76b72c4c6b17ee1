//! Python import detection via AST traversal.
//!
//! Detects:
//!   import a.b, c as d
//!   from a.b import c
//!   from .sibling import x
//!   from . import sibling       (emitted as ".sibling")

use tree_sitter::Node;

/// Extract module specifiers from a Python AST.
pub fn extract_python_imports(root: &Node, source: &[u8]) -> Vec<String> {
    let mut specifiers = Vec::new();
    extract_from_node(root, source, &mut specifiers);
    specifiers
}

fn extract_from_node(node: &Node, source: &[u8], specifiers: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            let count = node.child_count();
            for i in 0..count {
                if let Some(child) = node.child(i) {
                    if let Some(name) = imported_name(&child, source) {
                        specifiers.push(name);
                    }
                }
            }
            return;
        }
        "import_from_statement" => {
            extract_from_import(node, source, specifiers);
            return;
        }
        _ => {}
    }

    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            extract_from_node(&child, source, specifiers);
        }
    }
}

fn extract_from_import(node: &Node, source: &[u8], specifiers: &mut Vec<String>) {
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };
    let Ok(module_text) = module.utf8_text(source) else {
        return;
    };

    if !module_text.chars().all(|c| c == '.') {
        specifiers.push(module_text.to_string());
        return;
    }

    // `from . import a, b` names sibling modules directly.
    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            if child.id() == module.id() {
                continue;
            }
            if let Some(name) = imported_name(&child, source) {
                specifiers.push(format!("{module_text}{name}"));
            }
        }
    }
}

/// Name of a `dotted_name` or the target of an `aliased_import`.
fn imported_name(node: &Node, source: &[u8]) -> Option<String> {
    let target = match node.kind() {
        "dotted_name" => *node,
        "aliased_import" => node.child_by_field_name("name")?,
        _ => return None,
    };
    target.utf8_text(source).ok().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use crate::parser::{extract_specifiers, ParseOptions};
    use std::path::Path;

    fn extract(source: &str) -> Vec<String> {
        extract_specifiers(Path::new("mod.py"), source, &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_plain_imports() {
        let specifiers = extract("import os\nimport a.b, c as d\n");
        assert_eq!(specifiers, vec!["os", "a.b", "c"]);
    }

    #[test]
    fn test_from_imports() {
        let source = r#"
from typing import Optional
from pkg.sub import thing as other
from .sibling import helper
from ..parent.mod import x
"#;
        let specifiers = extract(source);
        assert_eq!(
            specifiers,
            vec!["typing", "pkg.sub", ".sibling", "..parent.mod"]
        );
    }

    #[test]
    fn test_dot_only_from_import() {
        let specifiers = extract("from . import alpha, beta as b\nfrom .. import gamma\n");
        assert_eq!(specifiers, vec![".alpha", ".beta", "..gamma"]);
    }

    #[test]
    fn test_nested_imports() {
        let source = r#"
def lazy():
    import json
    return json

class Service:
    from .db import session
"#;
        let specifiers = extract(source);
        assert_eq!(specifiers, vec!["json", ".db"]);
    }
}
