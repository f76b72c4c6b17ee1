//! JavaScript / TypeScript import detection via AST traversal.
//!
//! Detects:
//!   import x from './x'          import './side-effect'
//!   export { y } from './y'      export * from './all'
//!   require('./z')               import('./lazy')
//!   import fs = require('fs')    import type { T } from './types'

use tree_sitter::Node;

use crate::parser::ParseOptions;

/// Node.js core modules. Dropped unless `include_core` is set.
const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Extract import specifiers from a JavaScript, TypeScript or TSX AST.
pub fn extract_javascript_imports(root: &Node, source: &[u8], options: &ParseOptions) -> Vec<String> {
    let mut specifiers = Vec::new();
    extract_from_node(root, source, options, &mut specifiers);

    if !options.include_core {
        specifiers.retain(|s| !is_core_module(s));
    }
    specifiers
}

/// Whether `specifier` names a Node.js built-in (`fs`, `fs/promises`, `node:fs`).
pub fn is_core_module(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let head = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(&head)
}

fn extract_from_node(node: &Node, source: &[u8], options: &ParseOptions, specifiers: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            if !(options.skip_type_imports && is_type_only_import(node)) {
                if let Some(spec) = import_source(node, source) {
                    specifiers.push(spec);
                }
            }
            return;
        }
        "export_statement" => {
            if let Some(spec) = node
                .child_by_field_name("source")
                .and_then(|n| string_value(&n, source))
            {
                specifiers.push(spec);
            }
        }
        "call_expression" => {
            if let Some(spec) = call_specifier(node, source, options) {
                specifiers.push(spec);
            }
        }
        _ => {}
    }

    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            extract_from_node(&child, source, options, specifiers);
        }
    }
}

/// `import ... from 'x'`, `import 'x'`, or `import x = require('x')`.
fn import_source(node: &Node, source: &[u8]) -> Option<String> {
    if let Some(src) = node.child_by_field_name("source") {
        return string_value(&src, source);
    }

    let count = node.child_count();
    for i in 0..count {
        if let Some(child) = node.child(i) {
            if child.kind() == "import_require_clause" {
                return child
                    .child_by_field_name("source")
                    .and_then(|n| string_value(&n, source));
            }
        }
    }
    None
}

fn is_type_only_import(node: &Node) -> bool {
    let count = node.child_count();
    (0..count)
        .filter_map(|i| node.child(i))
        .any(|child| matches!(child.kind(), "type" | "typeof"))
}

/// `require('x')` or dynamic `import('x')` with a literal argument.
fn call_specifier(node: &Node, source: &[u8], options: &ParseOptions) -> Option<String> {
    let function = node.child_by_field_name("function")?;
    match function.kind() {
        "import" => {
            if options.skip_dynamic_imports {
                return None;
            }
        }
        "identifier" => {
            if function.utf8_text(source).ok()? != "require" {
                return None;
            }
        }
        _ => return None,
    }

    let arguments = node.child_by_field_name("arguments")?;
    let first = arguments.named_child(0)?;
    string_value(&first, source)
}

/// Literal text of a string node, without quotes. Template strings count
/// only when they contain no substitutions.
fn string_value(node: &Node, source: &[u8]) -> Option<String> {
    match node.kind() {
        "string" => {}
        "template_string" => {
            let count = node.named_child_count();
            let has_substitution = (0..count)
                .filter_map(|i| node.named_child(i))
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                return None;
            }
        }
        _ => return None,
    }

    let text = node.utf8_text(source).ok()?;
    let value = text.trim_matches(|c| c == '"' || c == '\'' || c == '`');
    Some(value.to_string())
}
