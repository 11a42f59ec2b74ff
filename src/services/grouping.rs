//! Concept grouping over phrase embeddings.
//!
//! Two operations with different guarantees:
//!
//! - [`SimilarityGrouper::group`] builds the full similarity graph and returns
//!   its connected components. Similarity chains transitively: if A~B and B~C,
//!   then A, B and C share a group even when A and C are dissimilar.
//! - [`SimilarityGrouper::cluster`] is a single greedy pass. Each unassigned
//!   phrase seeds a cluster and absorbs later unassigned phrases similar to the
//!   seed itself. There is no chaining.
//!
//! Both return a partition of the input positions.

use super::similarity::embed_all;
use crate::Result;
use crate::embedding::{Embedder, cosine_similarity, similarity_matrix};
use crate::models::ConceptGroup;
use petgraph::algo::tarjan_scc;
use petgraph::graph::UnGraph;
use std::sync::Arc;
use tracing::instrument;

/// Groups phrases by embedding similarity.
#[derive(Clone)]
pub struct SimilarityGrouper {
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for SimilarityGrouper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityGrouper")
            .field("dimensions", &self.embedder.dimensions())
            .finish()
    }
}

impl SimilarityGrouper {
    /// Creates a grouper over `embedder`.
    #[must_use]
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    /// Connected components of the graph with an edge wherever cosine
    /// similarity exceeds `threshold`.
    ///
    /// Phrases are embedded in one batch. Groups are ordered by their first
    /// member's input position and members keep input order.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails.
    #[instrument(skip(self, phrases), fields(phrase_count = phrases.len()))]
    pub fn group<S: AsRef<str>>(
        &self,
        phrases: &[S],
        threshold: f32,
    ) -> Result<Vec<ConceptGroup>> {
        let texts: Vec<&str> = phrases.iter().map(AsRef::as_ref).collect();
        let embeddings = embed_all(self.embedder.as_ref(), &texts)?;
        let groups = Self::group_embedded(&embeddings, threshold);
        tracing::debug!(groups = groups.len(), "Grouped phrases");
        Ok(to_concept_groups(&texts, groups))
    }

    /// Same as [`group`](Self::group) over precomputed embeddings, returning
    /// groups of input positions.
    #[must_use]
    pub fn group_embedded(embeddings: &[Vec<f32>], threshold: f32) -> Vec<Vec<usize>> {
        let matrix = similarity_matrix(embeddings);

        let mut graph = UnGraph::<usize, f32>::with_capacity(embeddings.len(), 0);
        let nodes: Vec<_> = (0..embeddings.len()).map(|i| graph.add_node(i)).collect();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let weight = matrix[i][j];
                if weight > threshold {
                    graph.add_edge(nodes[i], nodes[j], weight);
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .map(|component| {
                let mut members: Vec<usize> = component.into_iter().map(|n| graph[n]).collect();
                members.sort_unstable();
                members
            })
            .collect();
        groups.sort_unstable_by_key(|members| members.first().copied());
        groups
    }

    /// Greedy single-pass clustering with similarity to the seed at least
    /// `threshold`.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails.
    #[instrument(skip(self, phrases), fields(phrase_count = phrases.len()))]
    pub fn cluster<S: AsRef<str>>(
        &self,
        phrases: &[S],
        threshold: f32,
    ) -> Result<Vec<ConceptGroup>> {
        let texts: Vec<&str> = phrases.iter().map(AsRef::as_ref).collect();
        let embeddings = embed_all(self.embedder.as_ref(), &texts)?;
        Ok(to_concept_groups(
            &texts,
            Self::cluster_embedded(&embeddings, threshold),
        ))
    }

    /// Same as [`cluster`](Self::cluster) over precomputed embeddings,
    /// returning clusters of input positions.
    #[must_use]
    pub fn cluster_embedded(embeddings: &[Vec<f32>], threshold: f32) -> Vec<Vec<usize>> {
        let mut assigned = vec![false; embeddings.len()];
        let mut clusters = Vec::new();

        for seed in 0..embeddings.len() {
            if assigned[seed] {
                continue;
            }
            assigned[seed] = true;
            let mut members = vec![seed];
            for other in (seed + 1)..embeddings.len() {
                if !assigned[other]
                    && cosine_similarity(&embeddings[seed], &embeddings[other]) >= threshold
                {
                    assigned[other] = true;
                    members.push(other);
                }
            }
            clusters.push(members);
        }
        clusters
    }
}

fn to_concept_groups(texts: &[&str], groups: Vec<Vec<usize>>) -> Vec<ConceptGroup> {
    groups
        .into_iter()
        .map(|members| {
            ConceptGroup::new(members.into_iter().map(|i| texts[i].to_string()).collect())
        })
        .collect()
}
