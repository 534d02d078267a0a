//! `json-patch`: apply a JSON Patch (RFC 6902) to a document.
//!
//! Usage:
//!   json-patch <PATCH> [DOC]
//!
//! The patch is read from the PATCH file. The document is read from DOC, or
//! from stdin when DOC is omitted.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use json_delta::json_cli::apply_json_patch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "json-patch")]
#[command(version, about = "Apply a JSON Patch to a JSON document", long_about = None)]
struct Cli {
    /// File holding the patch (a JSON array of operations)
    patch: PathBuf,

    /// Document to patch; stdin when omitted
    doc: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
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

    let patch = std::fs::read_to_string(&cli.patch)
        .with_context(|| format!("failed to read {}", cli.patch.display()))?;
    let doc = match &cli.doc {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let result = apply_json_patch(doc.trim(), &patch)?;
    println!("{result}");
    Ok(())
}
