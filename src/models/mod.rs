//! Data models for notegap.
//!
//! - [`Document`]: an immutable submitted note with lazily split sentences
//! - [`Phrase`]: a candidate concept with its normalized form
//! - [`ConceptGroup`]: phrases judged equivalent by one grouping call
//! - [`ComparisonReport`]: the result of comparing a note against its peers

mod document;
mod phrase;
mod report;

pub use document::{Document, DocumentId};
pub use phrase::{ConceptGroup, Phrase, normalize_phrase, word_count};
pub use report::{
    CommonConcept, ComparisonReport, ConceptClusters, KeyPoint, MissingConcept, SentimentSummary,
    SimilarConcept, TopicSummary,
};
