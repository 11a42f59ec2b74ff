//! Noun and verb phrase extraction from a syntactic parse.

use crate::nlp::{ParsedSentence, PartOfSpeech};
use std::collections::HashSet;

/// Multi-word noun chunks and lower-cased verb-object phrases, deduplicated
/// in first-seen order.
///
/// A verb phrase is the verb followed by the noun chunk of each object or
/// complement child (or the child alone when it heads no chunk).
#[must_use]
pub fn syntactic_phrases(sentences: &[ParsedSentence]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut phrases = Vec::new();
    let mut push = |phrase: String| {
        if seen.insert(phrase.clone()) {
            phrases.push(phrase);
        }
    };

    for sentence in sentences {
        for chunk in &sentence.noun_chunks {
            if chunk.len() > 1 {
                push(sentence.span_text(chunk));
            }
        }

        for (index, token) in sentence.tokens.iter().enumerate() {
            if token.pos != PartOfSpeech::Verb {
                continue;
            }
            for child in sentence.children(index) {
                if !sentence.tokens[child].dep.is_object_or_complement() {
                    continue;
                }
                let object = sentence.chunk_containing(child).map_or_else(
                    || sentence.tokens[child].text.clone(),
                    |chunk| sentence.span_text(chunk),
                );
                push(format!("{} {object}", token.text).to_lowercase());
            }
        }
    }
    phrases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{HeuristicParser, SyntaxParser};

    fn extract(text: &str) -> Vec<String> {
        syntactic_phrases(&HeuristicParser.parse(text).unwrap())
    }

    #[test]
    fn test_noun_and_verb_phrases() {
        let phrases = extract("Mitochondria produce chemical energy.");
        assert!(phrases.contains(&"chemical energy".to_string()));
        assert!(phrases.contains(&"produce chemical energy".to_string()));
        assert!(!phrases.contains(&"Mitochondria".to_string()));
    }

    #[test]
    fn test_verb_phrases_are_lowercased() {
        let phrases = extract("Chloroplasts Capture Sunlight.");
        assert!(phrases.iter().all(|p| p.split_whitespace().count() > 1));
        assert!(phrases.contains(&"capture sunlight".to_string()));
    }

    #[test]
    fn test_duplicates_removed() {
        let phrases = extract("The cell wall protects. The cell wall supports.");
        assert_eq!(
            phrases.iter().filter(|p| p.as_str() == "The cell wall").count(),
            1
        );
    }
}
