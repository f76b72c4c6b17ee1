//! deptree - file-level dependency graphs.
//!
//! Usage:
//!   deptree src/                 # Whole tree
//!   deptree src/ -d 1 -f json    # One hop from every file, as JSON
//!   deptree app.ts --circular    # Circular dependencies (exit 1 if any)
//!   deptree . --depends lib.js   # Who imports lib.js

use anyhow::{Context, Result};
use clap::Parser;
use deptree::cli::{render, Cli, View};
use deptree::config::{DepTreeConfig, CONFIG_FILE};
use deptree::generate;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let config = DepTreeConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let config = cli.apply(config);

    let tree = generate(&cli.paths, &config)?;
    if !tree.skipped.is_empty() {
        warn!(
            count = tree.skipped.len(),
            "some dependencies could not be resolved (see --warning)"
        );
    }

    let view = cli.view();
    print!("{}", render(&view, &tree, cli.format)?);

    if view == View::Circular && !tree.circular().is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
