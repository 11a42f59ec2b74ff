//! Note submission: compare a new note against everything submitted before.

use super::comparison::ComparisonEngine;
use super::store::DocumentStore;
use crate::models::{ComparisonReport, Document};
use crate::{Error, Result};
use std::sync::Arc;
use tracing::instrument;

/// A stored note and the report computed when it was submitted.
#[derive(Debug, Clone)]
pub struct Submission {
    /// The stored note.
    pub document: Arc<Document>,
    /// Comparison against the notes stored before it.
    pub report: ComparisonReport,
}

/// Compares submitted notes against the store, then stores them.
#[derive(Clone)]
pub struct NoteComparisonService {
    engine: Arc<ComparisonEngine>,
    store: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for NoteComparisonService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteComparisonService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl NoteComparisonService {
    /// Creates a service over `engine` and `store`.
    #[must_use]
    pub fn new(engine: Arc<ComparisonEngine>, store: Arc<dyn DocumentStore>) -> Self {
        Self { engine, store }
    }

    /// Returns the document store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Compares `text` against every stored note, then appends it.
    ///
    /// The first submission has no peers and gets an empty report. Two
    /// submissions racing each other each compare against the snapshot taken
    /// before either was appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    #[instrument(skip_all, fields(text_length = text.len()))]
    pub fn submit(&self, text: &str) -> Result<Submission> {
        let document = Document::new(text);
        let prior = self.store.all()?;
        let peers: Vec<&Document> = prior.iter().map(AsRef::as_ref).collect();

        let report = self.engine.compare_documents(&document, &peers)?;
        let document = self.store.append(document)?;

        metrics::counter!("notegap_submissions_total").increment(1);
        tracing::info!(
            document_id = %document.id(),
            peers = peers.len(),
            missing = report.missing_concepts.len(),
            "Note submitted"
        );
        Ok(Submission { document, report })
    }

    /// Runs [`submit`](Self::submit) on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns the error of `submit`, or [`Error::OperationFailed`] if the
    /// blocking task panicked or was cancelled.
    pub async fn submit_async(&self, text: String) -> Result<Submission> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.submit(&text))
            .await
            .map_err(|e| Error::OperationFailed {
                operation: "submit_note".to_string(),
                cause: e.to_string(),
            })?
    }
}
