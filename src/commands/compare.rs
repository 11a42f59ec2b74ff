//! Compare command.

use super::{build_embedder, read_note, write_json};
use notegap::{ComparisonEngine, NotegapConfig};
use std::path::{Path, PathBuf};

/// Compare command.
pub fn cmd_compare(config: &NotegapConfig, target: &Path, peers: &[PathBuf]) -> anyhow::Result<()> {
    let target_text = read_note(target)?;
    let peer_texts = peers
        .iter()
        .map(|path| read_note(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let peer_refs: Vec<&str> = peer_texts.iter().map(String::as_str).collect();

    let engine = ComparisonEngine::new(build_embedder(config), config.clone())?;
    let report = engine.compare(&target_text, &peer_refs)?;

    tracing::info!(
        target = %target.display(),
        peers = peers.len(),
        common = report.common_concepts.len(),
        missing = report.missing_concepts.len(),
        "Compared notes"
    );
    write_json(&report)
}
