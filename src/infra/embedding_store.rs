// ============================================================
// Layer 6 — Embedding Store
// ============================================================
// Serialises extracted graph embeddings as JSON, either to a file
// or to stdout when no path is given.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, io::Write, path::Path};

pub fn write_json<T: Serialize>(value: &T, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Cannot create '{}'", dir.display()))?;
            }
            fs::write(path, json)
                .with_context(|| format!("Cannot write embeddings to '{}'", path.display()))?;
            tracing::info!("Wrote embeddings to '{}'", path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
