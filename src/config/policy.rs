//! Lexical threshold policies.

use crate::models::word_count;
use serde::Deserialize;

/// Chooses the lexical similarity threshold for one comparison.
///
/// The threshold depends on the target's phrases so that longer phrases are
/// matched more strictly. Implement this trait to replace the heuristic
/// without touching the comparison engine.
pub trait ThresholdPolicy: Send + Sync + std::fmt::Debug {
    /// Returns a threshold in `[0, 1]` for the given target phrases.
    fn lexical_threshold(&self, target_phrases: &[String]) -> f32;
}

/// Switches between two thresholds on the average phrase word count.
///
/// Phrases averaging more than `word_limit` words get `long_threshold`,
/// everything else (including an empty phrase list) gets `short_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhraseLengthPolicy {
    /// Average word count above which the long threshold applies.
    pub word_limit: f32,
    /// Threshold for short phrases.
    pub short_threshold: f32,
    /// Threshold for long phrases.
    pub long_threshold: f32,
}

impl Default for PhraseLengthPolicy {
    fn default() -> Self {
        Self {
            word_limit: 5.0,
            short_threshold: 0.7,
            long_threshold: 0.8,
        }
    }
}

impl ThresholdPolicy for PhraseLengthPolicy {
    #[allow(clippy::cast_precision_loss)]
    fn lexical_threshold(&self, target_phrases: &[String]) -> f32 {
        if target_phrases.is_empty() {
            return self.short_threshold;
        }

        let words: usize = target_phrases.iter().map(|p| word_count(p)).sum();
        let average = words as f32 / target_phrases.len() as f32;

        if average > self.word_limit {
            self.long_threshold
        } else {
            self.short_threshold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_short_phrases_use_short_threshold() {
        let policy = PhraseLengthPolicy::default();
        let threshold = policy.lexical_threshold(&phrases(&["cell wall", "atp synthase"]));
        assert!((threshold - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_long_phrases_use_long_threshold() {
        let policy = PhraseLengthPolicy::default();
        let threshold = policy.lexical_threshold(&phrases(&[
            "the electron transport chain pumps protons across membranes",
            "oxidative phosphorylation couples electron flow to atp synthesis",
        ]));
        assert!((threshold - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_average_exactly_at_limit_is_short() {
        let policy = PhraseLengthPolicy::default();
        let threshold = policy.lexical_threshold(&phrases(&["one two three four five"]));
        assert!((threshold - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_phrase_list() {
        let policy = PhraseLengthPolicy::default();
        assert!((policy.lexical_threshold(&[]) - 0.7).abs() < f32::EPSILON);
    }
}
