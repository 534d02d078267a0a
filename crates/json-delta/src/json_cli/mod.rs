//! `json-cli`: text-in/text-out helpers for the command-line tools.
//!
//! Provides the core logic used by the binary entry points:
//! - `json-diff`: print the JSON Patch that turns one document into another
//! - `json-patch`: apply a JSON Patch to a document

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::json_patch::codec::json::{from_json_patch, to_json_patch};
use crate::json_patch::{apply_patch, validate_operations, PatchError, ValidationError};
use crate::json_patch_diff::{DiffError, DiffOptions, JsonPatchDiff};

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Diff(#[from] DiffError),
    #[error("patch failed: {0}")]
    Patch(#[from] PatchError),
    #[error("invalid patch: {0}")]
    InvalidPatch(#[from] ValidationError),
}

fn parse_document(text: &str, what: &str) -> Result<Value, CliError> {
    if text.trim().is_empty() {
        return Err(DiffError::InvalidArgument(format!("{what} document is empty")).into());
    }
    Ok(serde_json::from_str(text)?)
}

fn render(value: &Value, pretty: bool) -> Result<String, CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

// ── Configuration ─────────────────────────────────────────────────────────

/// Load differ options from a TOML file. Missing keys keep their defaults.
pub fn load_options(path: &Path) -> Result<DiffOptions, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let options: DiffOptions = toml::from_str(&text)?;
    options.validate()?;
    Ok(options)
}

// ── json-diff ─────────────────────────────────────────────────────────────

/// Diff two JSON documents.
///
/// `src_json` and `dst_json` are the original and updated documents as
/// JSON text. Returns the RFC 6902 patch as JSON text.
pub fn diff_json(
    src_json: &str,
    dst_json: &str,
    options: &DiffOptions,
    pretty: bool,
) -> Result<String, CliError> {
    let src = parse_document(src_json, "original")?;
    let dst = parse_document(dst_json, "updated")?;
    let ops = JsonPatchDiff::new(options.clone())?.diff(&src, &dst)?;
    render(&to_json_patch(&ops), pretty)
}

// ── json-patch ────────────────────────────────────────────────────────────

/// Apply a JSON Patch (RFC 6902) to a document.
///
/// `doc_json`: the document as a JSON string.
/// `patch_json`: the patch operations as a JSON array string.
///
/// Returns the patched document as a pretty-printed JSON string.
pub fn apply_json_patch(doc_json: &str, patch_json: &str) -> Result<String, CliError> {
    let doc = parse_document(doc_json, "target")?;
    let ops_raw: Value = serde_json::from_str(patch_json)?;
    if !matches!(&ops_raw, Value::Array(ops) if ops.is_empty()) {
        validate_operations(&ops_raw)?;
    }
    let ops = from_json_patch(&ops_raw)?;
    let patched = apply_patch(doc, &ops)?;
    render(&patched, true)
}

// ── Tests ─────────────────────────────────────────────────────────────────
