//! Embedding generation.
//!
//! Provides phrase and sentence embeddings using fastembed, or deterministic
//! bag-of-words hash embeddings when the `fastembed-embeddings` feature is off.

// Allow cast precision loss for hash-based embedding calculations.
#![allow(clippy::cast_precision_loss)]
// Allow cast possible truncation for hash index calculations on 32-bit platforms.
#![allow(clippy::cast_possible_truncation)]

mod fastembed;
mod guarded;
mod hash;

pub use fastembed::FastEmbedEmbedder;
pub use guarded::{EmbeddingGuardConfig, GuardedEmbedder};
pub use hash::HashEmbedder;

use crate::Result;

/// Embedding dimensions of all-MiniLM-L6-v2.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Trait for embedding generators.
pub trait Embedder: Send + Sync {
    /// Returns the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Generates an embedding for the given text.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generates embeddings for multiple texts.
    ///
    /// Callers encode every phrase of one grouping or clustering call in a
    /// single batch.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding generation fails.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed_batch(texts)
    }
}

/// Computes cosine similarity between two embedding vectors.
///
/// # Returns
///
/// Cosine similarity clamped to `[-1.0, 1.0]`, or 0.0 if the vectors differ in
/// length, are empty, or either has zero norm.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Computes the full pairwise cosine-similarity matrix for `embeddings`.
///
/// The diagonal is 1.0 by definition.
#[must_use]
pub fn similarity_matrix(embeddings: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let n = embeddings.len();
    let mut matrix = vec![vec![0.0f32; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let sim = cosine_similarity(&embeddings[i], &embeddings[j]);
            matrix[i][j] = sim;
            matrix[j][i] = sim;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let v = vec![1.0, 2.0, 3.0];
        let similarity = cosine_similarity(&v, &v);
        assert!(
            (similarity - 1.0).abs() < 0.001,
            "Identical vectors should have similarity ~1.0"
        );
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let v1 = vec![1.0, 0.0, 0.0];
        let v2 = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&v1, &v2).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let v1 = vec![1.0, 0.0, 0.0];
        let v2 = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&v1, &v2) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_different_lengths() {
        let similarity = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!(
            similarity.abs() < f32::EPSILON,
            "Different length vectors should return 0.0, got {similarity}"
        );
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[], &[]).abs() < f32::EPSILON);
    }

    #[test]
    fn test_similarity_matrix_symmetric() {
        let embeddings = vec![vec![1.0, 0.0], vec![0.6, 0.8], vec![0.0, 1.0]];
        let matrix = similarity_matrix(&embeddings);

        assert_eq!(matrix.len(), 3);
        for (i, row) in matrix.iter().enumerate() {
            assert!((row[i] - 1.0).abs() < f32::EPSILON);
            for (j, value) in row.iter().enumerate() {
                assert!((value - matrix[j][i]).abs() < f32::EPSILON);
            }
        }
        assert!((matrix[0][1] - 0.6).abs() < 0.001);
    }

    #[test]
    fn test_arc_embedder_delegates() {
        let embedder = std::sync::Arc::new(HashEmbedder::new());
        assert_eq!(embedder.dimensions(), DEFAULT_DIMENSIONS);
        assert_eq!(
            embedder.embed("cell biology").ok(),
            HashEmbedder::new().embed("cell biology").ok()
        );
    }
}
