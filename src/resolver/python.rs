//! Python module resolution.
//!
//! Leading dots select the importing file's package (one dot) or its
//! ancestors (each further dot). Absolute modules are looked up next to the
//! importing file first, then under the project directory. A module is
//! either `name.py` or a package `name/__init__.py`.

use std::path::{Path, PathBuf};

use super::ResolveOptions;

pub fn resolve(specifier: &str, context: &Path, options: &ResolveOptions) -> Option<PathBuf> {
    let dots = specifier.chars().take_while(|c| *c == '.').count();
    let relative: PathBuf = specifier[dots..]
        .split('.')
        .filter(|part| !part.is_empty())
        .collect();
    let context_dir = context.parent()?;

    if dots > 0 {
        let mut base = context_dir;
        for _ in 1..dots {
            base = base.parent()?;
        }
        return resolve_module(base, &relative);
    }

    resolve_module(context_dir, &relative).or_else(|| resolve_module(&options.directory, &relative))
}

fn resolve_module(base: &Path, relative: &Path) -> Option<PathBuf> {
    if relative.as_os_str().is_empty() {
        let init = base.join("__init__.py");
        return init.is_file().then_some(init);
    }

    let module = base.join(relative);
    let file = module.with_extension("py");
    if file.is_file() {
        return Some(file);
    }
    let init = module.join("__init__.py");
    init.is_file().then_some(init)
}
