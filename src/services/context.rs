//! Context sentence lookup.

use crate::models::Document;
use crate::nlp::SentenceSplitter;

/// First sentence of `document` whose lower-cased text contains the
/// lower-cased `phrase`, or an empty string.
///
/// This is a first-match policy: later sentences are never considered once
/// one matches, even if they mention the phrase more prominently.
#[must_use]
pub fn find_context(
    phrase: &str,
    document: &Document,
    splitter: &dyn SentenceSplitter,
) -> String {
    first_matching_sentence(phrase, &document.sentences(splitter))
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// First of `sentences` containing `phrase`, case-insensitively.
#[must_use]
pub fn first_matching_sentence<'a>(phrase: &str, sentences: &'a [String]) -> Option<&'a str> {
    let needle = phrase.to_lowercase();
    sentences
        .iter()
        .find(|sentence| sentence.to_lowercase().contains(&needle))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::UnicodeSentenceSplitter;

    fn document() -> Document {
        Document::new(
            "Cells need energy. Mitochondria produce energy for the cell. \
             Energy is stored as ATP.",
        )
    }

    #[test]
    fn test_first_match_wins() {
        let context = find_context("ENERGY", &document(), &UnicodeSentenceSplitter);
        assert_eq!(context, "Cells need energy.");
    }

    #[test]
    fn test_multi_word_phrase() {
        let context = find_context(
            "mitochondria produce",
            &document(),
            &UnicodeSentenceSplitter,
        );
        assert_eq!(context, "Mitochondria produce energy for the cell.");
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(find_context("ribosome", &document(), &UnicodeSentenceSplitter).is_empty());
    }

    #[test]
    fn test_first_matching_sentence_on_empty_list() {
        assert!(first_matching_sentence("cell", &[]).is_none());
    }
}
