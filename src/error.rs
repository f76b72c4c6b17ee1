//! Error types for deptree.
//!
//! Only configuration-level problems are fatal. Per-file parse failures and
//! per-edge resolution failures are degraded by the traversal engine and
//! never surface as errors from a run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the library.
#[derive(Debug, Error)]
pub enum DepTreeError {
    /// An input path could not be read or canonicalized.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A malformed exclusion pattern.
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The configuration file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for `DepTreeConfig`.
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// No grammar is available for the file.
    #[error("unsupported language: {}", .0.display())]
    UnsupportedLanguage(PathBuf),

    /// tree-sitter could not produce a syntax tree.
    #[error("failed to parse {}", .0.display())]
    Parse(PathBuf),

    /// The dedicated traversal thread pool could not be built.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl DepTreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DepTreeError>;
