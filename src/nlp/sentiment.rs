//! Polarity and subjectivity scoring.

use super::sentence::{Token, tokenize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Polarity and subjectivity of a text span.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polarity {
    /// Negative to positive, in `[-1, 1]`.
    pub polarity: f32,
    /// Objective to subjective, in `[0, 1]`.
    pub subjectivity: f32,
}

/// Scores the sentiment of a text span.
pub trait SentimentAnalyzer: Send + Sync {
    /// Returns polarity in `[-1, 1]` and subjectivity in `[0, 1]` for `text`.
    fn analyze(&self, text: &str) -> Polarity;
}

/// `(word, polarity, subjectivity)` entries of the default lexicon.
static LEXICON_ENTRIES: &[(&str, f32, f32)] = &[
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("excellent", 1.0, 1.0),
    ("amazing", 0.6, 0.9),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("important", 0.4, 1.0),
    ("essential", 0.3, 0.6),
    ("key", 0.2, 0.4),
    ("useful", 0.3, 0.0),
    ("efficient", 0.5, 0.6),
    ("effective", 0.6, 0.8),
    ("powerful", 0.3, 1.0),
    ("clear", 0.1, 0.4),
    ("easy", 0.43, 0.83),
    ("simple", 0.0, 0.36),
    ("correct", 0.0, 0.0),
    ("interesting", 0.5, 0.5),
    ("helpful", 0.5, 0.5),
    ("healthy", 0.5, 0.5),
    ("strong", 0.43, 0.73),
    ("stable", 0.3, 0.4),
    ("successful", 0.75, 0.95),
    ("beneficial", 0.6, 0.5),
    ("positive", 0.23, 0.55),
    ("happy", 0.8, 1.0),
    ("love", 0.5, 0.6),
    ("like", 0.1, 0.2),
    ("nice", 0.6, 1.0),
    ("fascinating", 0.6, 0.9),
    ("bad", -0.7, 0.67),
    ("worse", -0.4, 0.6),
    ("worst", -1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("wrong", -0.5, 0.9),
    ("difficult", -0.5, 1.0),
    ("hard", -0.29, 0.54),
    ("confusing", -0.3, 0.7),
    ("complex", -0.3, 0.4),
    ("harmful", -0.6, 0.5),
    ("toxic", -0.5, 0.5),
    ("dangerous", -0.6, 0.9),
    ("weak", -0.38, 0.63),
    ("unstable", -0.4, 0.5),
    ("inefficient", -0.5, 0.6),
    ("damage", -0.4, 0.4),
    ("damaged", -0.4, 0.4),
    ("disease", -0.3, 0.3),
    ("failure", -0.32, 0.3),
    ("fail", -0.5, 0.3),
    ("fails", -0.5, 0.3),
    ("problem", -0.2, 0.3),
    ("negative", -0.3, 0.4),
    ("terrible", -1.0, 1.0),
    ("awful", -1.0, 1.0),
    ("boring", -1.0, 1.0),
    ("sad", -0.5, 1.0),
    ("hate", -0.8, 0.9),
    ("useless", -0.5, 0.2),
    ("critical", 0.0, 0.6),
];

/// Words that flip and damp the polarity of the next assessed word.
static NEGATIONS: &[&str] = &["not", "no", "never", "neither", "nor", "without", "hardly"];

/// `(word, multiplier)` for intensifiers applied to the next assessed word.
static INTENSIFIERS: &[(&str, f32)] = &[
    ("very", 1.3),
    ("really", 1.2),
    ("extremely", 1.5),
    ("highly", 1.3),
    ("incredibly", 1.5),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.6),
];

static LEXICON: LazyLock<HashMap<&'static str, (f32, f32)>> = LazyLock::new(|| {
    LEXICON_ENTRIES
        .iter()
        .map(|(word, polarity, subjectivity)| (*word, (*polarity, *subjectivity)))
        .collect()
});

/// Lexicon-based analyzer.
///
/// Each lexicon word found in the text contributes one assessment. A preceding
/// negation multiplies its polarity by -0.5, a preceding intensifier scales
/// both polarity and subjectivity. The result is the mean over assessments,
/// clamped to range; text with no lexicon words is neutral and objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentimentAnalyzer;

impl LexiconSentimentAnalyzer {
    /// Creates the analyzer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn is_negation(word: &str) -> bool {
        NEGATIONS.contains(&word) || word.ends_with("n't")
    }

    fn intensity(word: &str) -> Option<f32> {
        INTENSIFIERS
            .iter()
            .find(|(w, _)| *w == word)
            .map(|(_, multiplier)| *multiplier)
    }
}

impl SentimentAnalyzer for LexiconSentimentAnalyzer {
    #[allow(clippy::cast_precision_loss)]
    fn analyze(&self, text: &str) -> Polarity {
        let mut assessments: Vec<(f32, f32)> = Vec::new();
        let mut negated = false;
        let mut multiplier = 1.0f32;

        for token in tokenize(text) {
            let Token::Word(word) = token else {
                // Punctuation ends the reach of a modifier.
                negated = false;
                multiplier = 1.0;
                continue;
            };
            let word = word.to_lowercase();

            if Self::is_negation(&word) {
                negated = true;
                continue;
            }
            if let Some(m) = Self::intensity(&word) {
                multiplier *= m;
                continue;
            }
            if let Some(&(polarity, subjectivity)) = LEXICON.get(word.as_str()) {
                let mut polarity = polarity * multiplier;
                if negated {
                    polarity *= -0.5;
                }
                assessments.push((polarity, subjectivity * multiplier));
                negated = false;
                multiplier = 1.0;
            }
        }

        if assessments.is_empty() {
            return Polarity::default();
        }

        let count = assessments.len() as f32;
        let polarity = assessments.iter().map(|(p, _)| p).sum::<f32>() / count;
        let subjectivity = assessments.iter().map(|(_, s)| s).sum::<f32>() / count;

        Polarity {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_text() {
        let result = LexiconSentimentAnalyzer.analyze("Mitochondria produce ATP.");
        assert_eq!(result, Polarity::default());
    }

    #[test]
    fn test_positive_text() {
        let result = LexiconSentimentAnalyzer.analyze("This is a great explanation.");
        assert!((result.polarity - 0.8).abs() < 1e-6);
        assert!(result.subjectivity > 0.0);
    }

    #[test]
    fn test_negative_text() {
        let result = LexiconSentimentAnalyzer.analyze("The lecture was terrible.");
        assert!(result.polarity < 0.0);
    }

    #[test]
    fn test_negation_flips_and_damps() {
        let result = LexiconSentimentAnalyzer.analyze("This is not good.");
        assert!((result.polarity - (-0.35)).abs() < 1e-6);

        let result = LexiconSentimentAnalyzer.analyze("It isn't good.");
        assert!(result.polarity < 0.0);
    }

    #[test]
    fn test_intensifier_is_clamped() {
        let result = LexiconSentimentAnalyzer.analyze("extremely excellent");
        assert!((result.polarity - 1.0).abs() < f32::EPSILON);
        assert!((result.subjectivity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_punctuation_resets_negation() {
        let result = LexiconSentimentAnalyzer.analyze("Not yet. Good work.");
        assert!((result.polarity - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_mixed_sentiment_averages() {
        let result = LexiconSentimentAnalyzer.analyze("good and bad");
        assert!(result.polarity.abs() < 1e-6);
    }
}
