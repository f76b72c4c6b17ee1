//! Configuration loaded from `.deptree.toml`.
//!
//! Every field is optional; a missing file means all defaults. Command-line
//! flags are applied on top by the binary.
//!
//! ```toml
//! base_dir = "src"
//! depth = 2
//! exclude = ["^vendor/", "\\.test\\.js$"]
//! include_npm = true
//! file_extensions = ["js", "ts"]
//! threads = 4
//!
//! [aliases]
//! "@" = "src"
//!
//! [parse]
//! skip_type_imports = true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DepTreeError, Result};
use crate::parser::ParseOptions;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".deptree.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepTreeConfig {
    /// Directory output paths are relative to. Defaults to the common
    /// directory of the inputs.
    pub base_dir: Option<PathBuf>,
    /// Maximum hops from an input file.
    pub depth: Option<usize>,
    /// Regular expressions; matching modules are removed from the output.
    pub exclude: Vec<String>,
    /// Keep edges into package-manager directories as leaves.
    pub include_npm: bool,
    /// Extensions (without dot) of files picked up when walking directories.
    pub file_extensions: Vec<String>,
    /// Package-manager directory names. Never traversed.
    pub package_dirs: Vec<String>,
    /// Worker threads for traversal; the global pool when unset.
    pub threads: Option<usize>,
    /// Specifier prefix -> directory relative to the base directory.
    pub aliases: BTreeMap<String, PathBuf>,
    pub parse: ParseOptions,
}

impl Default for DepTreeConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            depth: None,
            exclude: Vec::new(),
            include_npm: false,
            file_extensions: ["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "py"]
                .into_iter()
                .map(String::from)
                .collect(),
            package_dirs: vec!["node_modules".to_string()],
            threads: None,
            aliases: BTreeMap::new(),
            parse: ParseOptions::default(),
        }
    }
}

impl DepTreeConfig {
    /// Load from `path`. A missing file yields the defaults; an unreadable
    /// or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| DepTreeError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
