//! English stopword list.

use std::collections::HashSet;
use std::sync::LazyLock;
use stop_words::{LANGUAGE, get};

/// English stopwords used for keyword ranking (the NLTK English list).
pub static ENGLISH_STOPWORDS: LazyLock<Vec<String>> = LazyLock::new(|| get(LANGUAGE::English));

/// Lookup set over [`ENGLISH_STOPWORDS`].
pub static STOPWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOPWORDS.iter().map(String::as_str).collect());

/// Returns true if `word` (already lower-cased) is an English stopword.
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_stopwords() {
        for word in ["the", "of", "they", "are", "through", "ourselves"] {
            assert!(is_stopword(word), "{word} should be a stopword");
        }
    }

    #[test]
    fn test_content_words_are_not_stopwords() {
        for word in ["mitochondria", "energy", "cell", "produce", "every", "inside"] {
            assert!(!is_stopword(word), "{word} should not be a stopword");
        }
    }

    #[test]
    fn test_list_is_lower_case() {
        assert!(!ENGLISH_STOPWORDS.is_empty());
        assert!(
            ENGLISH_STOPWORDS
                .iter()
                .all(|w| w.to_lowercase() == *w)
        );
    }
}
