//! Rapid automatic keyword extraction.
//!
//! Candidate phrases are maximal runs of words containing no stopword and no
//! punctuation. Each word scores `degree / frequency`, where frequency counts
//! its occurrences across all candidates and degree adds the length of every
//! candidate it occurs in. A phrase scores the sum of its word scores, so long
//! phrases of rare words rank highest.

use crate::nlp::{ENGLISH_STOPWORDS, SentenceSplitter};
use keyword_extraction::rake::{Rake, RakeParams};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A candidate phrase and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedPhrase {
    /// Lower-cased, space-joined phrase.
    pub phrase: String,
    /// Sum of `degree / frequency` over the phrase's words.
    pub score: f32,
}

/// Lower-cased sentences of `text`, each closed by a full stop.
///
/// Sentence boundaries come from `splitter`, so candidate phrases never span
/// two sentences.
fn sentence_text(text: &str, splitter: &dyn SentenceSplitter) -> String {
    splitter
        .split(text)
        .into_iter()
        .map(|sentence| {
            let mut sentence = sentence.to_lowercase();
            if !sentence.ends_with(|c: char| c.is_ascii_punctuation()) {
                sentence.push('.');
            }
            sentence
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ranks the distinct candidate phrases of `text`, best first.
///
/// Equal scores are ordered by phrase text, descending.
#[must_use]
pub fn rank_phrases(text: &str, splitter: &dyn SentenceSplitter) -> Vec<RankedPhrase> {
    let text = sentence_text(text, splitter);
    if text.is_empty() {
        return Vec::new();
    }

    let rake = Rake::new(RakeParams::WithDefaults(&text, ENGLISH_STOPWORDS.as_slice()));
    // Every candidate is at least one word long.
    let limit = text.split_whitespace().count();

    let mut seen = HashSet::new();
    let mut ranked: Vec<RankedPhrase> = rake
        .get_ranked_phrases_scores(limit)
        .into_iter()
        .filter(|(phrase, _)| !phrase.trim().is_empty() && seen.insert(phrase.clone()))
        .map(|(phrase, score)| RankedPhrase { phrase, score })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.phrase.cmp(&a.phrase))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::UnicodeSentenceSplitter;

    fn phrases(text: &str) -> Vec<String> {
        rank_phrases(text, &UnicodeSentenceSplitter)
            .into_iter()
            .map(|r| r.phrase)
            .collect()
    }

    #[test]
    fn test_splits_on_stopwords_and_punctuation() {
        let ranked = phrases("Mitochondria are the powerhouse of the cell. They produce ATP.");
        let mut sorted = ranked.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["cell", "mitochondria", "powerhouse", "produce atp"]);
        assert_eq!(ranked[0], "produce atp");
    }

    #[test]
    fn test_scores_degree_over_frequency() {
        let ranked = rank_phrases(
            "Cell membrane proteins are vital. The membrane is thin.",
            &UnicodeSentenceSplitter,
        );
        let top = &ranked[0];
        assert_eq!(top.phrase, "cell membrane proteins");

        // "membrane" alone scores below the longer phrase containing it.
        let membrane = ranked.iter().find(|r| r.phrase == "membrane").unwrap();
        assert!(membrane.score > 0.0);
        assert!(top.score > membrane.score);
    }

    #[test]
    fn test_ties_break_by_phrase_descending() {
        let ranked = phrases("Apples, pears, quinces.");
        assert_eq!(ranked, vec!["quinces", "pears", "apples"]);
    }

    #[test]
    fn test_repeated_phrases_are_deduplicated() {
        let ranked = phrases("Krebs cycle. The krebs cycle again.");
        assert_eq!(
            ranked.iter().filter(|p| p.as_str() == "krebs cycle").count(),
            1
        );
    }

    #[test]
    fn test_only_stopwords() {
        assert!(phrases("It is what it is, and so it was.").is_empty());
    }
}
