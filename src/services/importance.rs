//! Composite importance scoring.

use crate::config::ImportanceWeights;
use crate::nlp::{LexiconSentimentAnalyzer, SentimentAnalyzer};
use std::sync::Arc;

/// The three raw importance signals of a phrase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportanceSignals {
    /// Case-insensitive, non-overlapping occurrence count.
    pub frequency: f32,
    /// `1 - first_offset / len`, or 0 if the phrase does not occur.
    pub position: f32,
    /// Absolute polarity of the phrase text.
    pub sentiment: f32,
}

/// Scores how central a phrase is to a text.
#[derive(Clone)]
pub struct ImportanceScorer {
    weights: ImportanceWeights,
    sentiment: Arc<dyn SentimentAnalyzer>,
}

impl std::fmt::Debug for ImportanceScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportanceScorer")
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

impl Default for ImportanceScorer {
    fn default() -> Self {
        Self::new(
            ImportanceWeights::default(),
            Arc::new(LexiconSentimentAnalyzer::new()),
        )
    }
}

impl ImportanceScorer {
    /// Creates a scorer with the given weights and sentiment analyzer.
    #[must_use]
    pub fn new(weights: ImportanceWeights, sentiment: Arc<dyn SentimentAnalyzer>) -> Self {
        Self { weights, sentiment }
    }

    /// Weighted sum of the frequency, position and sentiment signals.
    #[must_use]
    pub fn score(&self, phrase: &str, context_text: &str) -> f32 {
        let signals = self.signals(phrase, context_text);
        self.weights.frequency * signals.frequency
            + self.weights.position * signals.position
            + self.weights.sentiment * signals.sentiment
    }

    /// Computes the raw signals for `phrase` within `context_text`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn signals(&self, phrase: &str, context_text: &str) -> ImportanceSignals {
        let sentiment = self.sentiment.analyze(phrase).polarity.abs();

        let needle = phrase.to_lowercase();
        let haystack = context_text.to_lowercase();
        if needle.is_empty() || haystack.is_empty() {
            return ImportanceSignals {
                frequency: 0.0,
                position: 0.0,
                sentiment,
            };
        }

        let frequency = haystack.matches(needle.as_str()).count() as f32;
        let position = haystack.find(needle.as_str()).map_or(0.0, |byte_offset| {
            let offset = haystack[..byte_offset].chars().count() as f32;
            let length = haystack.chars().count() as f32;
            1.0 - offset / length
        });

        ImportanceSignals {
            frequency,
            position,
            sentiment,
        }
    }
}
