//! Comparison report types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A sentence singled out for its strong sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPoint {
    /// The sentence text.
    pub text: String,
    /// Polarity of the sentence in `[-1, 1]`.
    pub polarity: f32,
}

/// Sentiment of a concept's context.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Mean polarity over the context's sentences, in `[-1, 1]`.
    pub overall_sentiment: f32,
    /// Mean subjectivity over the context's sentences, in `[0, 1]`.
    pub subjectivity: f32,
    /// Sentences whose absolute polarity reaches the key-point floor.
    pub key_points: Vec<KeyPoint>,
}

/// A co-grouped phrase with its weighted similarity to the concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarConcept {
    /// The similar phrase.
    pub phrase: String,
    /// Weighted phrase/context similarity.
    pub score: f32,
}

/// A concept present in the target and in at least one peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonConcept {
    /// The target's phrase.
    pub phrase: String,
    /// First target sentence containing the phrase, or empty.
    pub context: String,
    /// Number of peer documents whose phrase set contains the phrase.
    pub mentioned_by_peers: usize,
    /// Sentiment of the context sentence.
    pub sentiment: SentimentSummary,
    /// Co-grouped phrases, highest score first.
    pub similar_concepts: Vec<SimilarConcept>,
    /// Importance of the phrase within the target text.
    pub importance: f32,
}

/// A concept mentioned by enough peers but absent from the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingConcept {
    /// The peers' phrase.
    pub phrase: String,
    /// First matching sentence of the first peer containing the phrase.
    pub context: String,
    /// Number of peer documents whose phrase set contains the phrase.
    pub mentioned_by_peers: usize,
    /// Sentiment of the context sentence.
    pub sentiment: SentimentSummary,
    /// Target phrases grouped with this concept.
    pub similar_in_target: Vec<String>,
    /// Importance of the phrase within its context sentence.
    pub importance: f32,
}

/// Greedy concept clusters per document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConceptClusters {
    /// Clusters over the target's phrases.
    pub target_clusters: Vec<Vec<String>>,
    /// Clusters over each peer's phrases, in peer order.
    pub peer_clusters: Vec<Vec<Vec<String>>>,
}

impl ConceptClusters {
    /// Returns true when no document produced a cluster.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target_clusters.is_empty() && self.peer_clusters.iter().all(Vec::is_empty)
    }
}

/// A topic derived from one concept group of the combined vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    /// Position of the topic in the report, starting at 0.
    pub topic_id: usize,
    /// Most frequent content words of the group's phrases.
    pub top_words: Vec<String>,
    /// The group's share of all document mentions, in `[0, 1]`.
    pub topic_weight: f32,
}

/// Result of comparing one target document against its peers.
///
/// Built once per comparison call and not modified afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Concepts shared with peers, most important first.
    pub common_concepts: Vec<CommonConcept>,
    /// Concepts the target is missing, most mentioned first.
    pub missing_concepts: Vec<MissingConcept>,
    /// Greedy clusters for the target and each peer.
    pub concept_clusters: ConceptClusters,
    /// Importance of every target phrase within the target text.
    pub importance_scores: BTreeMap<String, f32>,
    /// Topic summaries over the combined vocabulary.
    pub topics: Vec<TopicSummary>,
    /// Lexical threshold chosen for this comparison.
    pub lexical_threshold: f32,
}

impl ComparisonReport {
    /// The short-circuited report returned when there are no peers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when the report carries no concepts or clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.common_concepts.is_empty()
            && self.missing_concepts.is_empty()
            && self.concept_clusters.is_empty()
    }
}
