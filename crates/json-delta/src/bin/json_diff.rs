//! `json-diff`: print the JSON Patch (RFC 6902) that turns one document
//! into another.
//!
//! Usage:
//!   json-diff <ORIGINAL> <UPDATED> [--fast] [--ignore-removals] [--max-lcs N]
//!             [--config FILE] [--pretty] [-v]
//!
//! Either file argument may be `-` to read that document from stdin.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use json_delta::json_cli::{diff_json, load_options};
use json_delta::json_patch_diff::{ArrayDiffMode, DiffOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "json-diff")]
#[command(version, about = "Compute a JSON Patch between two JSON documents", long_about = None)]
struct Cli {
    /// Original document (`-` for stdin)
    original: PathBuf,

    /// Updated document (`-` for stdin)
    updated: PathBuf,

    /// Compare arrays positionally instead of aligning them
    #[arg(long)]
    fast: bool,

    /// Do not emit removals for object members missing from UPDATED
    #[arg(long)]
    ignore_removals: bool,

    /// Arrays longer than this are compared positionally
    #[arg(long, value_name = "N")]
    max_lcs: Option<usize>,

    /// TOML file with differ options; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the patch
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();

    if cli.original.as_os_str() == "-" && cli.updated.as_os_str() == "-" {
        anyhow::bail!("only one document can be read from stdin");
    }

    let mut options = match &cli.config {
        Some(path) => load_options(path)?,
        None => DiffOptions::default(),
    };
    if cli.fast {
        options = options.with_array_mode(ArrayDiffMode::Fast);
    }
    if cli.ignore_removals {
        options = options.with_ignore_removals(true);
    }
    if let Some(max) = cli.max_lcs {
        options = options.with_max_array_size_for_lcs(max);
    }

    let original = read_input(&cli.original)?;
    let updated = read_input(&cli.updated)?;
    let patch = diff_json(&original, &updated, &options, cli.pretty)?;
    println!("{patch}");
    Ok(())
}
