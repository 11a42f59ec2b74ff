//! Language collaborators used by extraction and comparison.
//!
//! Each concern sits behind a trait so that a heavier implementation can be
//! swapped in without touching the services:
//!
//! | Trait | Default |
//! |-------|---------|
//! | [`SentenceSplitter`] | [`UnicodeSentenceSplitter`] |
//! | [`SentimentAnalyzer`] | [`LexiconSentimentAnalyzer`] |
//! | [`SyntaxParser`] | [`HeuristicParser`] |

mod sentence;
mod sentiment;
mod stopwords;
mod syntax;

pub use sentence::{SentenceSplitter, Token, UnicodeSentenceSplitter, tokenize};
pub use sentiment::{LexiconSentimentAnalyzer, Polarity, SentimentAnalyzer};
pub use stopwords::{ENGLISH_STOPWORDS, STOPWORDS, is_stopword};
pub use syntax::{
    DependencyLabel, HeuristicParser, ParsedSentence, ParsedToken, PartOfSpeech, SyntaxParser,
};
