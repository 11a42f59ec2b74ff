//! Extract command.

use super::{build_embedder, read_note, write_json};
use notegap::ConceptExtractor;
use notegap::NotegapConfig;
use notegap::services::ExtractionStrategy;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ExtractOutput<'a> {
    file: &'a Path,
    strategy: ExtractionStrategy,
    concepts: Vec<String>,
}

/// Extract command.
///
/// Both strategies validate `--method` and `--threshold`, drop near-duplicate
/// phrases and keep the first `--max-concepts`.
pub fn cmd_extract(
    config: &NotegapConfig,
    file: &Path,
    max_concepts: Option<usize>,
    threshold: Option<f32>,
    method: Option<String>,
    strategy: Option<String>,
) -> anyhow::Result<()> {
    let text = read_note(file)?;

    let mut extraction = config.extraction.clone();
    if let Some(strategy) = strategy {
        extraction.strategy = strategy.parse()?;
    }
    let max_concepts = max_concepts.unwrap_or(extraction.max_concepts);
    let threshold = threshold.unwrap_or(extraction.similarity_threshold);
    let method = method.unwrap_or_else(|| extraction.similarity_method.to_string());
    let strategy = extraction.strategy;

    let extractor = ConceptExtractor::new(extraction, build_embedder(config));
    let concepts =
        extractor.extract_concepts_with(&text, strategy, max_concepts, threshold, &method)?;

    write_json(&ExtractOutput {
        file,
        strategy,
        concepts,
    })
}
