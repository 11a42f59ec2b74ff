//! FastEmbed-based embedder.
//!
//! Provides semantic embeddings using the all-MiniLM-L6-v2 model via fastembed-rs.
//! When the `fastembed-embeddings` feature is enabled, this uses real ONNX-based
//! semantic embeddings. Otherwise, it delegates to [`HashEmbedder`](super::HashEmbedder).

use super::{DEFAULT_DIMENSIONS, Embedder};
use crate::Result;

// ============================================================================
// Native FastEmbed Implementation (with feature)
// ============================================================================

#[cfg(feature = "fastembed-embeddings")]
mod native {
    use super::{DEFAULT_DIMENSIONS, Embedder, Result};
    use crate::Error;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::{Mutex, OnceLock};
    use std::time::Instant;

    /// Process-wide embedding model, loaded on first use.
    static EMBEDDING_MODEL: OnceLock<Mutex<fastembed::TextEmbedding>> = OnceLock::new();

    /// `FastEmbed` embedder using all-MiniLM-L6-v2.
    ///
    /// The model is lazily loaded on the first embed call.
    pub struct FastEmbedEmbedder {
        model_name: &'static str,
    }

    impl FastEmbedEmbedder {
        /// Default embedding dimensions for all-MiniLM-L6-v2.
        pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

        /// Creates a new `FastEmbed` embedder.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                model_name: "all-MiniLM-L6-v2",
            }
        }

        /// Gets or initializes the embedding model.
        ///
        /// The first call blocks while the ONNX model loads.
        fn get_model() -> Result<&'static Mutex<fastembed::TextEmbedding>> {
            if let Some(model) = EMBEDDING_MODEL.get() {
                return Ok(model);
            }

            tracing::info!("Loading embedding model (first use)...");
            let start = Instant::now();

            let options = fastembed::InitOptions::new(fastembed::EmbeddingModel::AllMiniLML6V2)
                .with_show_download_progress(false);
            let model = fastembed::TextEmbedding::try_new(options)
                .map_err(|e| Error::transient("load_embedding_model", e))?;

            tracing::info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                model = "all-MiniLM-L6-v2",
                "Embedding model loaded"
            );

            // Another thread may have won the race; either model is fine.
            let _ = EMBEDDING_MODEL.set(Mutex::new(model));
            EMBEDDING_MODEL
                .get()
                .ok_or_else(|| Error::transient("get_embedding_model", "model not initialized"))
        }

        /// Returns the model name.
        #[must_use]
        pub const fn model_name(&self) -> &'static str {
            self.model_name
        }
    }

    impl Default for FastEmbedEmbedder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn dimensions(&self) -> usize {
            Self::DEFAULT_DIMENSIONS
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.embed_batch(&[text])?
                .into_iter()
                .next()
                .ok_or_else(|| Error::transient("embed", "no embedding returned from model"))
        }

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            if texts.is_empty() {
                return Ok(Vec::new());
            }
            if texts.iter().any(|t| t.is_empty()) {
                return Err(Error::InvalidArgument("Cannot embed empty text".to_string()));
            }

            let model = Self::get_model()?;
            let texts_owned: Vec<String> = texts.iter().map(|s| (*s).to_string()).collect();

            // ONNX runtime can panic on malformed inputs; surface it as a transient failure.
            let result = catch_unwind(AssertUnwindSafe(|| {
                let mut guard = model
                    .lock()
                    .map_err(|e| Error::transient("embed_batch", e.to_string()))?;
                guard
                    .embed(texts_owned, None)
                    .map_err(|e| Error::transient("embed_batch", e))
            }));

            result.map_err(|panic_info| {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(
                    panic_message = %panic_msg,
                    batch_size = texts.len(),
                    "ONNX runtime panicked during batch embedding"
                );
                Error::transient("embed_batch", format!("ONNX runtime panic: {panic_msg}"))
            })?
        }
    }
}

// ============================================================================
// Fallback Implementation (without feature)
// ============================================================================

#[cfg(not(feature = "fastembed-embeddings"))]
mod fallback {
    use super::{DEFAULT_DIMENSIONS, Embedder, Result};
    use crate::embedding::HashEmbedder;

    /// `FastEmbed` embedder stand-in backed by [`HashEmbedder`].
    ///
    /// Hash embeddings reflect shared words only. "cellular respiration" and
    /// "ATP production" will NOT be similar. Enable the `fastembed-embeddings`
    /// feature for semantic similarity.
    pub struct FastEmbedEmbedder {
        inner: HashEmbedder,
    }

    impl FastEmbedEmbedder {
        /// Default embedding dimensions for all-MiniLM-L6-v2.
        pub const DEFAULT_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

        /// Creates a new embedder.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                inner: HashEmbedder::new(),
            }
        }

        /// Returns the model name.
        #[must_use]
        pub const fn model_name(&self) -> &'static str {
            "hash-bag-of-words"
        }
    }

    impl Default for FastEmbedEmbedder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Embedder for FastEmbedEmbedder {
        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            tracing::trace!("Using hash embedding fallback (fastembed-embeddings feature not enabled)");
            self.inner.embed(text)
        }
    }
}

#[cfg(feature = "fastembed-embeddings")]
pub use native::FastEmbedEmbedder;

#[cfg(not(feature = "fastembed-embeddings"))]
pub use fallback::FastEmbedEmbedder;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = FastEmbedEmbedder::new();
        assert_eq!(embedder.dimensions(), FastEmbedEmbedder::DEFAULT_DIMENSIONS);
        assert!(!embedder.model_name().is_empty());
    }

    #[test]
    fn test_embed_empty_text() {
        assert!(FastEmbedEmbedder::new().embed("").is_err());
    }

    #[test]
    fn test_embed_batch_empty_list() {
        let embedder = FastEmbedEmbedder::default();
        let result = embedder.embed_batch(&[]);
        assert!(result.expect("embed_batch failed").is_empty());
    }

    #[test]
    fn test_embed_batch_with_empty_fails() {
        let embedder = FastEmbedEmbedder::new();
        assert!(embedder.embed_batch(&["Valid text", "", "Another"]).is_err());
    }

    #[cfg(feature = "fastembed-embeddings")]
    mod fastembed_tests {
        use super::*;
        use crate::embedding::cosine_similarity;

        #[test]
        fn test_embed_success() {
            let embedding = FastEmbedEmbedder::new().embed("Hello, world!").unwrap();
            assert_eq!(embedding.len(), FastEmbedEmbedder::DEFAULT_DIMENSIONS);
        }

        #[test]
        fn test_semantic_similarity() {
            let embedder = FastEmbedEmbedder::new();
            let a = embedder.embed("mitochondria produce energy").unwrap();
            let b = embedder.embed("cells generate ATP in mitochondria").unwrap();
            let c = embedder.embed("the stock market fell today").unwrap();
            assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
        }
    }
}
