//! Command handlers module.
//!
//! - `extract.rs`: concept extraction from one note
//! - `compare.rs`: target-versus-peers comparison

mod compare;
mod extract;

pub use compare::cmd_compare;
pub use extract::cmd_extract;

use anyhow::Context;
use notegap::NotegapConfig;
use notegap::embedding::{Embedder, FastEmbedEmbedder, GuardedEmbedder};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Reads a note from disk.
fn read_note(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Builds the guarded embedder configured for this run.
fn build_embedder(config: &NotegapConfig) -> Arc<dyn Embedder> {
    Arc::new(GuardedEmbedder::new(
        FastEmbedEmbedder::new(),
        config.embedding.clone(),
    ))
}

/// Writes `value` to stdout as pretty JSON.
fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("serializing output")?;
    writeln!(stdout)?;
    Ok(())
}
