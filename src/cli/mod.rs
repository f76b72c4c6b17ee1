//! Command-line front end.
//!
//! Views:
//! - default: the whole tree
//! - --circular, --depends <ID>, --orphans, --leaves: module lists
//! - --summary: dependency counts
//! - --warning: unresolved specifiers

use anyhow::Result;
use clap::{ArgGroup, Parser, ValueEnum};
use serde::Serialize;
use std::fmt::Write;
use std::path::PathBuf;

use crate::config::DepTreeConfig;
use crate::graph::DependencyTree;

#[derive(Parser, Debug)]
#[command(name = "deptree")]
#[command(about = "File-level dependency graphs for JavaScript, TypeScript and Python", long_about = None)]
#[command(group(
    ArgGroup::new("view")
        .args(["circular", "depends", "orphans", "leaves", "summary", "warning"])
        .multiple(false)
))]
pub struct Cli {
    /// Files or directories to start from
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Config file (default: .deptree.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory output paths are relative to
    #[arg(short, long)]
    pub base_dir: Option<PathBuf>,

    /// Maximum hops from an input file
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Regex of modules to leave out (repeatable)
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,

    /// Keep dependencies into node_modules as leaves
    #[arg(long)]
    pub include_npm: bool,

    /// File extensions picked up when walking directories
    #[arg(short, long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Traversal worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List circular dependencies
    #[arg(long)]
    pub circular: bool,

    /// List modules depending on the given one
    #[arg(long, value_name = "ID")]
    pub depends: Option<String>,

    /// List modules nothing depends on
    #[arg(long)]
    pub orphans: bool,

    /// List modules without dependencies
    #[arg(long)]
    pub leaves: bool,

    /// Dependency count per module
    #[arg(long)]
    pub summary: bool,

    /// List specifiers that could not be resolved
    #[arg(long)]
    pub warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// What to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Tree,
    Circular,
    Depends(String),
    Orphans,
    Leaves,
    Summary,
    Warnings,
}

impl Cli {
    /// Apply command-line overrides on top of `config`.
    pub fn apply(&self, mut config: DepTreeConfig) -> DepTreeConfig {
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = Some(base_dir.clone());
        }
        if self.depth.is_some() {
            config.depth = self.depth;
        }
        config.exclude.extend(self.exclude.iter().cloned());
        if self.include_npm {
            config.include_npm = true;
        }
        if !self.extensions.is_empty() {
            config.file_extensions = self
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect();
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config
    }

    pub fn view(&self) -> View {
        if self.circular {
            View::Circular
        } else if let Some(id) = &self.depends {
            View::Depends(id.clone())
        } else if self.orphans {
            View::Orphans
        } else if self.leaves {
            View::Leaves
        } else if self.summary {
            View::Summary
        } else if self.warning {
            View::Warnings
        } else {
            View::Tree
        }
    }
}

/// Render `view` of `tree` in `format`.
pub fn render(view: &View, tree: &DependencyTree, format: OutputFormat) -> Result<String> {
    match view {
        View::Tree => match format {
            OutputFormat::Text => Ok(tree.to_string()),
            _ => serialize(&tree.tree, format),
        },
        View::Circular => {
            let cycles = tree.circular();
            match format {
                OutputFormat::Text => Ok(cycles
                    .iter()
                    .enumerate()
                    .map(|(i, cycle)| format!("{}) {}\n", i + 1, cycle.join(" > ")))
                    .collect()),
                _ => serialize(&cycles, format),
            }
        }
        View::Depends(id) => list(&tree.depends(id), format),
        View::Orphans => list(&tree.orphans(), format),
        View::Leaves => list(&tree.leaves(), format),
        View::Summary => {
            let summary = tree.summary();
            match format {
                OutputFormat::Text => {
                    let width = summary.iter().map(|c| c.module.len()).max().unwrap_or(0);
                    let mut out = String::new();
                    for entry in &summary {
                        writeln!(out, "{:<width$}  {}", entry.module, entry.count)?;
                    }
                    Ok(out)
                }
                _ => serialize(&summary, format),
            }
        }
        View::Warnings => list(tree.warnings(), format),
    }
}

fn list(items: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(items.iter().map(|item| format!("{item}\n")).collect()),
        _ => serialize(&items, format),
    }
}

fn serialize<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        _ => {
            let mut json = serde_json::to_string_pretty(value)?;
            json.push('\n');
            json
        }
    })
}
