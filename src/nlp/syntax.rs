//! Syntactic parsing: part-of-speech tags, dependencies and noun chunks.
//!
//! The [`SyntaxParser`] trait is the seam for a real dependency parser. The
//! bundled [`HeuristicParser`] is a rule-based stand-in: closed-class word
//! lists and suffix rules for tagging, `DET? (ADJ|NUM)* NOUN+` runs for noun
//! chunks, and "the noun chunk right after a verb is its direct object" for
//! dependencies.

use super::sentence::{SentenceSplitter, Token, UnicodeSentenceSplitter, tokenize};
use crate::Result;
use std::ops::Range;

/// Coarse part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    /// Common noun.
    Noun,
    /// Proper noun.
    ProperNoun,
    /// Main verb.
    Verb,
    /// Auxiliary or copula.
    Auxiliary,
    /// Adjective.
    Adjective,
    /// Adverb.
    Adverb,
    /// Determiner.
    Determiner,
    /// Pronoun.
    Pronoun,
    /// Preposition or postposition.
    Adposition,
    /// Coordinating or subordinating conjunction.
    Conjunction,
    /// Number.
    Numeral,
    /// Punctuation.
    Punctuation,
}

impl PartOfSpeech {
    /// Returns true for nouns and proper nouns.
    #[must_use]
    pub const fn is_nominal(self) -> bool {
        matches!(self, Self::Noun | Self::ProperNoun)
    }
}

/// Dependency relation of a token to its head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyLabel {
    /// Root of the sentence or of an unattached span.
    Root,
    /// Nominal subject.
    Subject,
    /// Direct object.
    DirectObject,
    /// Attribute of a copula.
    Attribute,
    /// Open clausal or adjectival complement.
    Complement,
    /// Modifier inside a noun chunk.
    Modifier,
    /// Any other relation.
    Other,
}

impl DependencyLabel {
    /// Returns true for object and complement relations.
    #[must_use]
    pub const fn is_object_or_complement(self) -> bool {
        matches!(self, Self::DirectObject | Self::Attribute | Self::Complement)
    }
}

/// One token of a parsed sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedToken {
    /// Surface text.
    pub text: String,
    /// Part of speech.
    pub pos: PartOfSpeech,
    /// Relation to the head.
    pub dep: DependencyLabel,
    /// Index of the head token; roots point at themselves.
    pub head: usize,
}

/// A parsed sentence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedSentence {
    /// Tokens in order.
    pub tokens: Vec<ParsedToken>,
    /// Noun chunk spans as token index ranges.
    pub noun_chunks: Vec<Range<usize>>,
}

impl ParsedSentence {
    /// Indices of the tokens whose head is `index`, excluding `index` itself.
    #[must_use]
    pub fn children(&self, index: usize) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(i, token)| *i != index && token.head == index)
            .map(|(i, _)| i)
            .collect()
    }

    /// The noun chunk containing token `index`, if any.
    #[must_use]
    pub fn chunk_containing(&self, index: usize) -> Option<&Range<usize>> {
        self.noun_chunks.iter().find(|chunk| chunk.contains(&index))
    }

    /// Space-joined text of the tokens in `span`.
    #[must_use]
    pub fn span_text(&self, span: &Range<usize>) -> String {
        self.tokens[span.clone()]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Produces part-of-speech tags, dependencies and noun chunks.
pub trait SyntaxParser: Send + Sync {
    /// Parses `text` into sentences.
    ///
    /// # Errors
    ///
    /// Returns a transient error if the parser is unavailable or fails.
    fn parse(&self, text: &str) -> Result<Vec<ParsedSentence>>;
}

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "my", "your", "his", "her", "its", "our",
    "their", "some", "any", "each", "every", "no", "another", "many", "several",
];
const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "who", "which",
    "what", "something", "everything", "nothing",
];
const ADPOSITIONS: &[&str] = &[
    "of", "in", "on", "at", "by", "for", "with", "about", "through", "into", "from", "to",
    "during", "over", "under", "between", "against", "after", "before", "without", "within",
    "across", "via", "per", "like",
];
const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "while", "if", "although", "whereas",
    "than",
];
const AUXILIARIES: &[&str] = &[
    "is", "are", "was", "were", "be", "been", "being", "am", "has", "have", "had", "do", "does",
    "did", "can", "could", "will", "would", "shall", "should", "may", "might", "must",
];
const ADVERBS: &[&str] = &[
    "not", "very", "also", "often", "always", "never", "too", "just", "then", "only", "still",
    "mostly", "here", "there", "now",
];
const VERB_STEMS: &[&str] = &[
    "produce", "generate", "convert", "use", "make", "store", "release", "contain", "form",
    "create", "require", "provide", "break", "transport", "synthesize", "absorb", "regulate",
    "control", "carry", "build", "help", "cause", "drive", "power", "supply", "consume",
    "capture", "split", "replicate", "encode", "bind", "move", "pump", "transfer", "explain",
    "describe", "show", "define", "include", "reduce", "increase", "support", "protect",
];
const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ary", "ular", "ish",
];

/// Rule-based parser for English.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicParser;

impl HeuristicParser {
    /// Creates the parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn is_known_verb(word: &str) -> bool {
        VERB_STEMS.iter().any(|stem| {
            let stem_e = stem.strip_suffix('e').unwrap_or(stem);
            word == *stem
                || word == format!("{stem}s")
                || word == format!("{stem}es")
                || word == format!("{stem}d")
                || word == format!("{stem}ed")
                || word == format!("{stem_e}ed")
                || word == format!("{stem_e}ing")
                || word == format!("{stem}ing")
        })
    }

    fn has_adjective_suffix(word: &str) -> bool {
        word.chars().count() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s))
    }

    /// First pass: closed classes, verbs and nominal defaults.
    fn tag_word(word: &str, position: usize, previous: Option<PartOfSpeech>) -> PartOfSpeech {
        let lower = word.to_lowercase();
        let lower = lower.as_str();

        if DETERMINERS.contains(&lower) {
            PartOfSpeech::Determiner
        } else if PRONOUNS.contains(&lower) {
            PartOfSpeech::Pronoun
        } else if ADPOSITIONS.contains(&lower) {
            PartOfSpeech::Adposition
        } else if CONJUNCTIONS.contains(&lower) {
            PartOfSpeech::Conjunction
        } else if AUXILIARIES.contains(&lower) {
            PartOfSpeech::Auxiliary
        } else if ADVERBS.contains(&lower) || (lower.len() > 4 && lower.ends_with("ly")) {
            PartOfSpeech::Adverb
        } else if lower.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            PartOfSpeech::Numeral
        } else if (Self::is_known_verb(lower)
            && !matches!(
                previous,
                Some(PartOfSpeech::Determiner | PartOfSpeech::Adjective)
            ))
            || (matches!(
                previous,
                Some(PartOfSpeech::Pronoun | PartOfSpeech::Auxiliary)
            ) && (lower.ends_with("ed") || lower.ends_with("ing")))
            || previous == Some(PartOfSpeech::Pronoun)
        {
            PartOfSpeech::Verb
        } else if position > 0 && word.chars().next().is_some_and(char::is_uppercase) {
            PartOfSpeech::ProperNoun
        } else if Self::has_adjective_suffix(lower) {
            PartOfSpeech::Adjective
        } else {
            PartOfSpeech::Noun
        }
    }

    fn tag_sentence(words: &[Token<'_>]) -> Vec<ParsedToken> {
        let mut tokens: Vec<ParsedToken> = Vec::with_capacity(words.len());
        for (i, token) in words.iter().enumerate() {
            let (text, pos) = match token {
                Token::Punct(p) => (*p, PartOfSpeech::Punctuation),
                Token::Word(w) => (*w, Self::tag_word(w, i, tokens.last().map(|t| t.pos))),
            };
            tokens.push(ParsedToken {
                text: text.to_string(),
                pos,
                dep: DependencyLabel::Root,
                head: i,
            });
        }

        // An adjective candidate that does not modify a following noun is a noun,
        // unless it is the complement of a copula.
        for i in 0..tokens.len() {
            if tokens[i].pos != PartOfSpeech::Adjective {
                continue;
            }
            let modifies_next = tokens.get(i + 1).is_some_and(|t| {
                matches!(
                    t.pos,
                    PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Adjective
                )
            });
            let after_copula = i > 0 && tokens[i - 1].pos == PartOfSpeech::Auxiliary;
            if !modifies_next && !after_copula {
                tokens[i].pos = PartOfSpeech::Noun;
            }
        }
        tokens
    }

    /// Maximal `DET? (ADJ|NUM)* NOUN+` runs and lone pronouns.
    fn noun_chunks(tokens: &[ParsedToken]) -> Vec<Range<usize>> {
        let mut chunks = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            if tokens[i].pos == PartOfSpeech::Pronoun {
                chunks.push(i..i + 1);
                i += 1;
                continue;
            }

            let start = i;
            let mut j = i;
            if tokens[j].pos == PartOfSpeech::Determiner {
                j += 1;
            }
            while j < tokens.len()
                && matches!(
                    tokens[j].pos,
                    PartOfSpeech::Adjective | PartOfSpeech::Numeral
                )
            {
                j += 1;
            }
            let nouns_start = j;
            while j < tokens.len() && tokens[j].pos.is_nominal() {
                j += 1;
            }

            if j > nouns_start {
                chunks.push(start..j);
                i = j;
            } else {
                i += 1;
            }
        }
        chunks
    }

    /// Attaches chunk members to chunk roots and chunks to neighboring verbs.
    fn attach_dependencies(tokens: &mut [ParsedToken], chunks: &[Range<usize>]) {
        for chunk in chunks {
            let root = chunk.end - 1;
            for i in chunk.start..root {
                tokens[i].dep = DependencyLabel::Modifier;
                tokens[i].head = root;
            }
        }

        for v in 0..tokens.len() {
            let pos = tokens[v].pos;
            if pos != PartOfSpeech::Verb && pos != PartOfSpeech::Auxiliary {
                continue;
            }

            if let Some(chunk) = chunks.iter().find(|c| c.start == v + 1) {
                let root = chunk.end - 1;
                tokens[root].head = v;
                tokens[root].dep = if pos == PartOfSpeech::Verb {
                    DependencyLabel::DirectObject
                } else {
                    DependencyLabel::Attribute
                };
            } else if pos == PartOfSpeech::Auxiliary
                && tokens.get(v + 1).map(|t| t.pos) == Some(PartOfSpeech::Adjective)
            {
                tokens[v + 1].head = v;
                tokens[v + 1].dep = DependencyLabel::Complement;
            }

            if let Some(chunk) = chunks.iter().find(|c| c.end == v) {
                let root = chunk.end - 1;
                if tokens[root].dep == DependencyLabel::Root {
                    tokens[root].head = v;
                    tokens[root].dep = DependencyLabel::Subject;
                }
            }
        }

        for token in tokens.iter_mut() {
            if token.dep == DependencyLabel::Root
                && matches!(
                    token.pos,
                    PartOfSpeech::Punctuation
                        | PartOfSpeech::Adposition
                        | PartOfSpeech::Conjunction
                        | PartOfSpeech::Adverb
                )
            {
                token.dep = DependencyLabel::Other;
            }
        }
    }
}

impl SyntaxParser for HeuristicParser {
    fn parse(&self, text: &str) -> Result<Vec<ParsedSentence>> {
        let sentences = UnicodeSentenceSplitter
            .split(text)
            .into_iter()
            .map(|sentence| {
                let words = tokenize(&sentence);
                let mut tokens = Self::tag_sentence(&words);
                let noun_chunks = Self::noun_chunks(&tokens);
                Self::attach_dependencies(&mut tokens, &noun_chunks);
                ParsedSentence {
                    tokens,
                    noun_chunks,
                }
            })
            .collect();
        Ok(sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> ParsedSentence {
        let mut sentences = HeuristicParser.parse(text).unwrap();
        assert_eq!(sentences.len(), 1);
        sentences.remove(0)
    }

    fn chunk_texts(sentence: &ParsedSentence) -> Vec<String> {
        sentence
            .noun_chunks
            .iter()
            .map(|c| sentence.span_text(c))
            .collect()
    }

    #[test]
    fn test_noun_chunks() {
        let sentence = parse_one("The inner membrane contains the respiratory chain.");
        assert_eq!(
            chunk_texts(&sentence),
            vec!["The inner membrane", "the respiratory chain"]
        );
    }

    #[test]
    fn test_verb_form_after_determiner_is_nominal() {
        let sentence = parse_one("The use of oxygen matters.");
        assert_eq!(sentence.tokens[1].pos, PartOfSpeech::Noun);
    }

    #[test]
    fn test_verb_takes_direct_object() {
        let sentence = parse_one("Mitochondria produce chemical energy.");
        let verb = sentence
            .tokens
            .iter()
            .position(|t| t.text == "produce")
            .unwrap();
        assert_eq!(sentence.tokens[verb].pos, PartOfSpeech::Verb);

        let children = sentence.children(verb);
        let object = children
            .iter()
            .find(|&&c| sentence.tokens[c].dep == DependencyLabel::DirectObject)
            .copied()
            .unwrap();
        assert_eq!(sentence.tokens[object].text, "energy");
        assert_eq!(
            sentence.span_text(sentence.chunk_containing(object).unwrap()),
            "chemical energy"
        );
    }

    #[test]
    fn test_subject_attachment() {
        let sentence = parse_one("Chloroplasts capture light.");
        let subject = &sentence.tokens[0];
        assert_eq!(subject.dep, DependencyLabel::Subject);
        assert_eq!(sentence.tokens[subject.head].text, "capture");
    }

    #[test]
    fn test_copula_attribute() {
        let sentence = parse_one("Mitochondria are the powerhouse of the cell.");
        let powerhouse = sentence
            .tokens
            .iter()
            .position(|t| t.text == "powerhouse")
            .unwrap();
        assert_eq!(sentence.tokens[powerhouse].dep, DependencyLabel::Attribute);
        assert_eq!(sentence.tokens[sentence.tokens[powerhouse].head].text, "are");
    }

    #[test]
    fn test_pronoun_followed_by_verb() {
        let sentence = parse_one("They generate ATP.");
        assert_eq!(sentence.tokens[0].pos, PartOfSpeech::Pronoun);
        assert_eq!(sentence.tokens[1].pos, PartOfSpeech::Verb);
        assert_eq!(sentence.tokens[2].dep, DependencyLabel::DirectObject);
    }

    #[test]
    fn test_multiple_sentences() {
        let sentences = HeuristicParser
            .parse("Cells divide. Enzymes speed reactions.")
            .unwrap();
        assert_eq!(sentences.len(), 2);
    }
}
