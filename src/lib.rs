//! # Notegap
//!
//! Concept extraction and peer-note comparison.
//!
//! Notegap pulls candidate concept phrases out of free-text notes and compares
//! one note against a corpus of peer notes, reporting which concepts are shared
//! and which ones the note is missing, each annotated with a context sentence,
//! sentiment, peer mention count and an importance score.
//!
//! ## Pipeline
//!
//! ```text
//! raw text ─► ConceptExtractor ─► phrase set ─► SimilarityGrouper ─► concept groups
//!                                                  (Embedder)               │
//!                                                                          ▼
//!                       ComparisonEngine (context locator + importance scorer)
//!                                                                          │
//!                                                                          ▼
//!                                                               ComparisonReport
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use notegap::{ComparisonEngine, NotegapConfig};
//! use notegap::embedding::FastEmbedEmbedder;
//!
//! let engine = ComparisonEngine::new(Arc::new(FastEmbedEmbedder::new()), NotegapConfig::default())?;
//! let report = engine.compare(&target, &[peer_a.as_str(), peer_b.as_str()])?;
//! for concept in &report.missing_concepts {
//!     println!("{} (mentioned by {} peers)", concept.phrase, concept.mentioned_by_peers);
//! }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod config;
pub mod embedding;
pub mod models;
pub mod nlp;
pub mod observability;
pub mod resilience;
pub mod services;

pub use config::{NotegapConfig, PhraseLengthPolicy, ThresholdPolicy};
pub use embedding::Embedder;
pub use models::{ComparisonReport, ConceptGroup, Document, DocumentId, Phrase};
pub use services::{
    ComparisonEngine, ConceptExtractor, DocumentStore, ExtractionStrategy, ImportanceScorer,
    InMemoryDocumentStore, NoteComparisonService, SimilarityGrouper, SimilarityMethod, Submission,
    filter_similar, find_context, is_similar,
};

/// Error type for notegap operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidArgument` | Unsupported similarity method or strategy, malformed threshold or weights |
/// | `Transient` | Embedding or parser call failed for one document |
/// | `Timeout` | Embedding or parser call exceeded its caller-supplied timeout |
/// | `OperationFailed` | Config files, logging setup, document store access |
///
/// Too-short text and an empty peer list are not errors; they produce empty
/// results.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A caller-facing contract violation.
    ///
    /// Raised when:
    /// - A similarity method name other than `string`/`lexical`/`semantic` is given
    /// - A threshold is NaN, infinite or outside `[0, 1]`
    /// - Importance or similar-concept weights are negative or non-finite
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An external collaborator failed while processing one document.
    ///
    /// Recovered inside multi-document comparisons by treating that document's
    /// contribution as empty.
    #[error("transient failure in '{operation}': {cause}")]
    Transient {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// An external call did not finish within its timeout.
    #[error("'{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// An ambient operation failed.
    ///
    /// Raised when:
    /// - A config file cannot be read or parsed
    /// - Logging is initialized twice
    /// - The document store lock is poisoned
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns true for failures that are local to one document and recoverable.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::Timeout { .. })
    }

    /// Builds a `Transient` error.
    pub fn transient(operation: impl Into<String>, cause: impl ToString) -> Self {
        Self::Transient {
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for notegap operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks that a threshold is a finite value in `[0, 1]`.
///
/// # Errors
///
/// Returns `InvalidArgument` naming the offending parameter otherwise.
pub fn validate_threshold(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Returns the current Unix timestamp in seconds.
///
/// Falls back to 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
