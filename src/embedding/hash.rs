//! Deterministic bag-of-words hash embeddings.

use super::{DEFAULT_DIMENSIONS, Embedder};
use crate::{Error, Result};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Embedder that hashes lower-cased word tokens into a fixed-size vector.
///
/// Word order is ignored, so phrases sharing words score a cosine similarity
/// roughly proportional to their overlap: "mitochondria produce energy" and
/// "mitochondria" land near 0.58. This captures lexical overlap only; it does
/// NOT capture meaning ("ATP" and "energy" are unrelated). Enable the
/// `fastembed-embeddings` feature for real semantic embeddings.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Limit on words hashed per text.
    const MAX_WORDS: usize = 1000;

    /// Creates a hash embedder with [`DEFAULT_DIMENSIONS`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Creates a hash embedder with custom dimensions (at least 1).
    #[must_use]
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn pseudo_embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .take(Self::MAX_WORDS);
        for word in words {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            Self::distribute_hash(&mut embedding, hasher.finish());
        }

        Self::normalize_embedding(&mut embedding);
        embedding
    }

    /// Spreads one word hash over eight signed dimensions.
    fn distribute_hash(embedding: &mut [f32], hash: u64) {
        let dimensions = embedding.len();
        for j in 0..8 {
            let idx = (hash.rotate_left(j * 8) as usize) % dimensions;
            let sign = if (hash >> (j + 56)) & 1 == 0 { 1.0 } else { -1.0 };
            embedding[idx] += sign;
        }
    }

    fn normalize_embedding(embedding: &mut [f32]) {
        let norm_sq: f32 = embedding.iter().map(|x| x * x).sum();
        if norm_sq <= 0.0 {
            return;
        }
        let inv_norm = norm_sq.sqrt().recip();
        for v in embedding.iter_mut() {
            *v *= inv_norm;
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::InvalidArgument("Cannot embed empty text".to_string()));
        }
        Ok(self.pseudo_embed(text))
    }
}
