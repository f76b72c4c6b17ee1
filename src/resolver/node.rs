//! Node-style resolution for JavaScript and TypeScript specifiers.
//!
//! Covers the common subset: relative and absolute paths, configured
//! aliases, extension probing, directory `package.json` `main` / `index`
//! files, and bare package lookup through ancestor package directories.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::ResolveOptions;

pub fn resolve(specifier: &str, context: &Path, options: &ResolveOptions) -> Option<PathBuf> {
    let context_dir = context.parent()?;

    if let Some(aliased) = apply_alias(specifier, options) {
        return resolve_path(&aliased, options);
    }

    if is_relative(specifier) || Path::new(specifier).is_absolute() {
        return resolve_path(&context_dir.join(specifier), options);
    }

    resolve_package(specifier, context_dir, options)
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Longest alias that equals the specifier or prefixes it at a `/` boundary.
fn apply_alias(specifier: &str, options: &ResolveOptions) -> Option<PathBuf> {
    let (alias, target) = options
        .aliases
        .iter()
        .filter(|(alias, _)| {
            specifier == alias.as_str()
                || specifier
                    .strip_prefix(alias.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|(alias, _)| alias.len())?;

    let rest = specifier[alias.len()..].trim_start_matches('/');
    let mut path = options.directory.join(target);
    if !rest.is_empty() {
        path = path.join(rest);
    }
    Some(path)
}

fn resolve_path(candidate: &Path, options: &ResolveOptions) -> Option<PathBuf> {
    resolve_file(candidate, options).or_else(|| resolve_directory(candidate, options))
}

fn resolve_file(candidate: &Path, options: &ResolveOptions) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }
    options
        .extensions
        .iter()
        .map(|ext| with_appended_extension(candidate, ext))
        .find(|path| path.is_file())
}

fn resolve_directory(dir: &Path, options: &ResolveOptions) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    if let Some(main) = package_main(dir) {
        let entry = dir.join(main);
        if let Some(found) = resolve_file(&entry, options) {
            return Some(found);
        }
        if entry.is_dir() {
            if let Some(found) = resolve_file(&entry.join("index"), options) {
                return Some(found);
            }
        }
    }

    resolve_file(&dir.join("index"), options)
}

/// `main` field of `dir/package.json`, if any.
fn package_main(dir: &Path) -> Option<String> {
    let manifest = fs::read_to_string(dir.join("package.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&manifest).ok()?;
    value.get("main")?.as_str().map(String::from)
}

fn resolve_package(specifier: &str, from: &Path, options: &ResolveOptions) -> Option<PathBuf> {
    for ancestor in from.ancestors() {
        for package_dir in &options.package_dirs {
            let candidate = ancestor.join(package_dir).join(specifier);
            if let Some(found) = resolve_path(&candidate, options) {
                return Some(found);
            }
        }
    }
    None
}

/// `foo.service` + `.ts` -> `foo.service.ts` (never replaces an extension).
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = OsString::from(path.as_os_str());
    raw.push(ext);
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn options(root: &Path) -> ResolveOptions {
        ResolveOptions {
            directory: root.to_path_buf(),
            ..ResolveOptions::default()
        }
    }

    #[test]
    fn test_relative_with_extension_probe() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/main.js"));
        touch(&root.join("src/lib/util.ts"));
        touch(&root.join("src/user.service.ts"));

        let context = root.join("src/main.js");
        let opts = options(root);
        assert_eq!(
            resolve("./lib/util", &context, &opts),
            Some(root.join("src/./lib/util.ts"))
        );
        assert_eq!(
            resolve("./user.service", &context, &opts),
            Some(root.join("src/./user.service.ts"))
        );
        assert_eq!(resolve("./missing", &context, &opts), None);
    }

    #[test]
    fn test_directory_index_and_main() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("app.js"));
        touch(&root.join("widgets/index.js"));
        touch(&root.join("pkg/lib/entry.js"));
        fs::write(root.join("pkg/package.json"), r#"{"main": "lib/entry"}"#).unwrap();

        let context = root.join("app.js");
        let opts = options(root);
        assert_eq!(
            resolve("./widgets", &context, &opts),
            Some(root.join("./widgets/index.js"))
        );
        assert_eq!(
            resolve("./pkg", &context, &opts),
            Some(root.join("./pkg/lib/entry.js"))
        );
    }

    #[test]
    fn test_bare_specifier_walks_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("src/deep/file.js"));
        touch(&root.join("node_modules/lodash/index.js"));
        touch(&root.join("node_modules/@scope/pkg/main.js"));
        fs::write(
            root.join("node_modules/@scope/pkg/package.json"),
            r#"{"name": "@scope/pkg", "main": "main.js"}"#,
        )
        .unwrap();

        let context = root.join("src/deep/file.js");
        let opts = options(root);
        assert_eq!(
            resolve("lodash", &context, &opts),
            Some(root.join("node_modules/lodash/index.js"))
        );
        assert_eq!(
            resolve("@scope/pkg", &context, &opts),
            Some(root.join("node_modules/@scope/pkg/main.js"))
        );
        assert_eq!(resolve("not-installed", &context, &opts), None);
    }

    #[test]
    fn test_aliases_prefer_longest_match() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("app.ts"));
        touch(&root.join("src/components/Button.tsx"));
        touch(&root.join("shared/ui/Button.tsx"));

        let mut aliases = BTreeMap::new();
        aliases.insert("@".to_string(), PathBuf::from("src"));
        aliases.insert("@/ui".to_string(), PathBuf::from("shared/ui"));
        let opts = ResolveOptions {
            aliases,
            ..options(root)
        };

        let context = root.join("app.ts");
        assert_eq!(
            resolve("@/components/Button", &context, &opts),
            Some(root.join("src/components/Button.tsx"))
        );
        assert_eq!(
            resolve("@/ui/Button", &context, &opts),
            Some(root.join("shared/ui/Button.tsx"))
        );
        assert_eq!(resolve("@scope/x", &context, &opts), None);
    }
}
