//! Concept extraction and comparison services.
//!
//! Services orchestrate the language collaborators and the document store.

mod comparison;
mod context;
mod extraction;
mod grouping;
mod importance;
mod notes;
mod similarity;
mod store;

pub use comparison::ComparisonEngine;
pub use context::{find_context, first_matching_sentence};
pub use extraction::{
    ConceptExtractor, ExtractionStrategy, RankedPhrase, rank_phrases, syntactic_phrases,
};
pub use grouping::SimilarityGrouper;
pub use importance::{ImportanceScorer, ImportanceSignals};
pub use notes::{NoteComparisonService, Submission};
pub use similarity::{SimilarityMethod, filter_similar, is_similar, sequence_ratio, similarity};
pub use store::{DocumentStore, InMemoryDocumentStore};
