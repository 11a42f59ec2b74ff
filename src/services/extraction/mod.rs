//! Concept phrase extraction.
//!
//! Two interchangeable strategies turn raw text into candidate phrases:
//!
//! | Strategy | Output |
//! |----------|--------|
//! | [`ExtractionStrategy::Keyword`] | keyword-ranked phrases, best first |
//! | [`ExtractionStrategy::Syntactic`] | noun chunks and verb-object phrases |
//!
//! Extraction never fails a larger pipeline: short text yields nothing, and
//! parser or embedding failures are logged and yield nothing.

mod rake;
mod syntactic;

pub use rake::{RankedPhrase, rank_phrases};
pub use syntactic::syntactic_phrases;

use super::similarity::{SimilarityMethod, filter_similar};
use crate::config::ExtractionConfig;
use crate::embedding::Embedder;
use crate::nlp::{HeuristicParser, SentenceSplitter, SyntaxParser, UnicodeSentenceSplitter};
use crate::resilience::call_with_timeout;
use crate::{Error, Result, validate_threshold};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Phrase extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Co-occurrence keyword ranking with stopword exclusion.
    #[default]
    Keyword,
    /// Noun chunks and verb-object phrases from a syntactic parse.
    Syntactic,
}

impl ExtractionStrategy {
    /// Parses a strategy name (`keyword`/`rake` or `syntactic`/`syntax`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for any other name.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "keyword" | "rake" => Ok(Self::Keyword),
            "syntactic" | "syntax" => Ok(Self::Syntactic),
            other => Err(Error::InvalidArgument(format!(
                "unsupported extraction strategy '{other}' (expected 'keyword' or 'syntactic')"
            ))),
        }
    }

    /// Returns the canonical strategy name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Syntactic => "syntactic",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Extracts candidate concept phrases from text.
#[derive(Clone)]
pub struct ConceptExtractor {
    config: ExtractionConfig,
    embedder: Arc<dyn Embedder>,
    parser: Arc<dyn SyntaxParser>,
    splitter: Arc<dyn SentenceSplitter>,
}

impl fmt::Debug for ConceptExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConceptExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ConceptExtractor {
    /// Creates an extractor with the heuristic parser and Unicode sentence
    /// splitter.
    #[must_use]
    pub fn new(config: ExtractionConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            parser: Arc::new(HeuristicParser::new()),
            splitter: Arc::new(UnicodeSentenceSplitter),
        }
    }

    /// Replaces the syntactic parser.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn SyntaxParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the sentence splitter.
    #[must_use]
    pub fn with_splitter(mut self, splitter: Arc<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Returns the extraction settings.
    #[must_use]
    pub const fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn is_too_short(&self, text: &str) -> bool {
        text.chars().count() < self.config.min_text_length
    }

    /// Extracts phrases with the configured strategy.
    ///
    /// Returns an empty list for short text or on any extraction failure.
    #[must_use]
    pub fn extract_phrases(&self, text: &str) -> Vec<String> {
        self.extract_with(text, self.config.strategy)
    }

    /// Extracts phrases with `strategy`.
    ///
    /// Keyword phrases come back best first and restricted to the configured
    /// character range; syntactic phrases come back in first-seen order.
    /// Returns an empty list for short text or on any extraction failure.
    #[must_use]
    #[instrument(skip(self, text), fields(text_length = text.len(), strategy = %strategy))]
    pub fn extract_with(&self, text: &str, strategy: ExtractionStrategy) -> Vec<String> {
        if self.is_too_short(text) {
            tracing::info!(
                min_length = self.config.min_text_length,
                "Text too short for meaningful extraction"
            );
            return Vec::new();
        }

        let result = match strategy {
            ExtractionStrategy::Keyword => Ok(self.keyword_phrases(text)),
            ExtractionStrategy::Syntactic => self.parse_phrases(text),
        };

        match result {
            Ok(phrases) => {
                metrics::counter!("notegap_extractions_total", "strategy" => strategy.as_str())
                    .increment(1);
                tracing::debug!(phrase_count = phrases.len(), "Extracted phrases");
                phrases
            },
            Err(e) => {
                metrics::counter!(
                    "notegap_extraction_failures_total",
                    "strategy" => strategy.as_str()
                )
                .increment(1);
                tracing::warn!(error = %e, "Phrase extraction failed, using no phrases");
                Vec::new()
            },
        }
    }

    fn keyword_phrases(&self, text: &str) -> Vec<String> {
        let ExtractionConfig {
            min_phrase_chars,
            max_phrase_chars,
            ..
        } = self.config;

        rank_phrases(text, self.splitter.as_ref())
            .into_iter()
            .map(|ranked| ranked.phrase)
            .filter(|phrase| {
                let chars = phrase.chars().count();
                (min_phrase_chars..=max_phrase_chars).contains(&chars)
            })
            .collect()
    }

    fn parse_phrases(&self, text: &str) -> Result<Vec<String>> {
        let parser = Arc::clone(&self.parser);
        let owned = text.to_string();
        let sentences = call_with_timeout(
            "syntax_parse",
            Duration::from_millis(self.config.parser_timeout_ms),
            move || parser.parse(&owned),
        )?;
        Ok(syntactic_phrases(&sentences))
    }

    /// Ranked, deduplicated key concepts of `text`.
    ///
    /// Keyword-ranks the text, drops phrases outside the configured character
    /// range, removes near-duplicates with `method` at `threshold`, and keeps
    /// the first `max_concepts`. `method` is `string`/`lexical` or `semantic`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an unsupported method or a
    /// threshold outside `[0, 1]`. Short text and internal failures yield an
    /// empty list instead.
    pub fn extract_concepts(
        &self,
        text: &str,
        max_concepts: usize,
        threshold: f32,
        method: &str,
    ) -> Result<Vec<String>> {
        self.extract_concepts_with(
            text,
            ExtractionStrategy::Keyword,
            max_concepts,
            threshold,
            method,
        )
    }

    /// [`extract_concepts`](Self::extract_concepts) over the phrases of `strategy`.
    ///
    /// Syntactic phrases keep their first-seen order before deduplication.
    ///
    /// # Errors
    ///
    /// Same as [`extract_concepts`](Self::extract_concepts). Arguments are
    /// checked before any extraction work, whatever the strategy.
    #[instrument(skip(self, text), fields(text_length = text.len(), strategy = %strategy))]
    pub fn extract_concepts_with(
        &self,
        text: &str,
        strategy: ExtractionStrategy,
        max_concepts: usize,
        threshold: f32,
        method: &str,
    ) -> Result<Vec<String>> {
        let method = SimilarityMethod::parse(method)?;
        validate_threshold("threshold", threshold)?;

        let ranked = self.extract_with(text, strategy);
        if ranked.is_empty() {
            return Ok(ranked);
        }

        let mut unique = match filter_similar(&ranked, threshold, method, self.embedder.as_ref()) {
            Ok(unique) => unique,
            Err(e) => {
                metrics::counter!(
                    "notegap_extraction_failures_total",
                    "strategy" => "concepts"
                )
                .increment(1);
                tracing::warn!(error = %e, "Similarity filtering failed, returning no concepts");
                return Ok(Vec::new());
            },
        };
        unique.truncate(max_concepts);

        tracing::debug!(
            ranked = ranked.len(),
            concepts = unique.len(),
            "Extracted key concepts"
        );
        Ok(unique)
    }
}
