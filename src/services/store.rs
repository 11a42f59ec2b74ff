//! Document store backends.

use crate::models::Document;
use crate::{Error, Result};
use std::sync::{Arc, RwLock};

/// Append-only storage of submitted documents.
///
/// Documents are never mutated or removed once appended. Comparisons read a
/// snapshot through [`all`](Self::all). A stored document caches its
/// sentences per splitter, so engines with different splitters can share one
/// store.
pub trait DocumentStore: Send + Sync {
    /// Appends a document and returns the stored handle.
    fn append(&self, document: Document) -> Result<Arc<Document>>;

    /// Returns every stored document in submission order.
    fn all(&self) -> Result<Vec<Arc<Document>>>;

    /// Returns the number of stored documents.
    fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }
}

/// Process-local document store.
///
/// Uses `RwLock` so concurrent comparisons can read while a submission waits
/// to append. Data is not persisted between runs.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Arc<Document>>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(operation: &str) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: "document store lock poisoned".to_string(),
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn append(&self, document: Document) -> Result<Arc<Document>> {
        let document = Arc::new(document);
        let mut documents = self
            .documents
            .write()
            .map_err(|_| poisoned("document_store_append"))?;
        documents.push(Arc::clone(&document));
        tracing::debug!(
            document_id = %document.id(),
            stored = documents.len(),
            "Appended document"
        );
        Ok(document)
    }

    fn all(&self) -> Result<Vec<Arc<Document>>> {
        self.documents
            .read()
            .map(|documents| documents.clone())
            .map_err(|_| poisoned("document_store_all"))
    }

    fn count(&self) -> Result<usize> {
        self.documents
            .read()
            .map(|documents| documents.len())
            .map_err(|_| poisoned("document_store_count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let store = InMemoryDocumentStore::new();
        let first = store.append(Document::new("first note")).unwrap();
        store.append(Document::new("second note")).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id(), first.id());
        assert_eq!(all[1].text(), "second note");
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_appends() {
        let store = InMemoryDocumentStore::new();
        store.append(Document::new("first note")).unwrap();
        let snapshot = store.all().unwrap();
        store.append(Document::new("second note")).unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_poisoned_lock_is_operation_failure() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(
            store.all(),
            Err(Error::OperationFailed { .. })
        ));
    }
}
