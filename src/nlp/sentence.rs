//! Sentence and word segmentation.

use unicode_segmentation::UnicodeSegmentation;

/// Splits text into sentences.
pub trait SentenceSplitter: Send + Sync {
    /// Returns the sentences of `text` in document order, trimmed, without empties.
    fn split(&self, text: &str) -> Vec<String>;

    /// Identifies the splitting behavior for cached sentence lists.
    ///
    /// Two splitters with the same key must split text identically. Splitters
    /// whose output depends on their configuration override this.
    fn cache_key(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Sentence splitter using Unicode (UAX #29) sentence boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self, text: &str) -> Vec<String> {
        text.unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect()
    }
}

/// A word or punctuation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A word containing at least one letter or digit.
    Word(&'a str),
    /// Punctuation or a symbol.
    Punct(&'a str),
}

/// Splits text into word and punctuation tokens, dropping whitespace.
///
/// Apostrophes inside words stay attached ("don't", "cell's").
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    text.split_word_bounds()
        .filter(|segment| !segment.trim().is_empty())
        .map(|segment| {
            if segment.chars().any(char::is_alphanumeric) {
                Token::Word(segment)
            } else {
                Token::Punct(segment)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let sentences = UnicodeSentenceSplitter.split(
            "Mitochondria are the powerhouse of the cell. They produce ATP through respiration.",
        );
        assert_eq!(
            sentences,
            vec![
                "Mitochondria are the powerhouse of the cell.",
                "They produce ATP through respiration."
            ]
        );
    }

    #[test]
    fn test_split_handles_questions_and_exclamations() {
        let sentences = UnicodeSentenceSplitter.split("Is it alive? Yes!  It is.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[2], "It is.");
    }

    #[test]
    fn test_split_empty_text() {
        assert!(UnicodeSentenceSplitter.split("   ").is_empty());
    }

    #[test]
    fn test_tokenize_words_and_punctuation() {
        let tokens = tokenize("Cells don't divide, usually.");
        assert_eq!(
            tokens,
            vec![
                Token::Word("Cells"),
                Token::Word("don't"),
                Token::Word("divide"),
                Token::Punct(","),
                Token::Word("usually"),
                Token::Punct("."),
            ]
        );
    }
}
