//! Submitted documents.

use crate::nlp::SentenceSplitter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::OnceLock;

/// Unique identifier for a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Creates a document ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh time-ordered ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An immutable text blob submitted by a user.
///
/// The sentence list is derived on first access and cached for the lifetime
/// of the document, keyed by the splitter that produced it. The text itself is never mutated.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    text: String,
    submitted_at: u64,
    sentences: OnceLock<(&'static str, Vec<String>)>,
}

impl Document {
    /// Creates a document with a generated ID.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(DocumentId::generate(), text)
    }

    /// Creates a document with an explicit ID.
    #[must_use]
    pub fn with_id(id: DocumentId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            submitted_at: crate::current_timestamp(),
            sentences: OnceLock::new(),
        }
    }

    /// Returns the document ID.
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Returns the raw text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the submission timestamp (Unix epoch seconds).
    #[must_use]
    pub const fn submitted_at(&self) -> u64 {
        self.submitted_at
    }

    /// Returns the sentences of this document, splitting on first use.
    ///
    /// The list produced by the first splitter is cached under its
    /// [`cache_key`](SentenceSplitter::cache_key). A splitter with a different
    /// key gets a fresh, uncached split.
    pub fn sentences(&self, splitter: &dyn SentenceSplitter) -> Cow<'_, [String]> {
        let key = splitter.cache_key();
        let (cached_key, cached) = self
            .sentences
            .get_or_init(|| (key, splitter.split(&self.text)));
        if *cached_key == key {
            Cow::Borrowed(cached.as_slice())
        } else {
            Cow::Owned(splitter.split(&self.text))
        }
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        let sentences = OnceLock::new();
        if let Some(cached) = self.sentences.get() {
            let _ = sentences.set(cached.clone());
        }
        Self {
            id: self.id.clone(),
            text: self.text.clone(),
            submitted_at: self.submitted_at,
            sentences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::UnicodeSentenceSplitter;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSplitter(AtomicUsize);

    impl SentenceSplitter for CountingSplitter {
        fn split(&self, text: &str) -> Vec<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            UnicodeSentenceSplitter.split(text)
        }
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Document::new("first");
        let b = Document::new("second");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_sentences_are_split_once() {
        let splitter = CountingSplitter(AtomicUsize::new(0));
        let doc = Document::with_id(DocumentId::from("doc-1"), "One sentence. Two sentences.");

        assert_eq!(doc.sentences(&splitter).len(), 2);
        assert_eq!(doc.sentences(&splitter).len(), 2);
        assert_eq!(splitter.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clone_keeps_cached_sentences() {
        let doc = Document::new("Alpha. Beta.");
        let _ = doc.sentences(&CountingSplitter(AtomicUsize::new(0)));
        let copy = doc.clone();

        let splitter = CountingSplitter(AtomicUsize::new(0));
        assert_eq!(copy.sentences(&splitter).len(), 2);
        assert_eq!(splitter.0.load(Ordering::SeqCst), 0);
        assert_eq!(copy.id(), doc.id());
    }

    struct WholeTextSplitter;

    impl SentenceSplitter for WholeTextSplitter {
        fn split(&self, text: &str) -> Vec<String> {
            vec![text.to_string()]
        }
    }

    #[test]
    fn test_other_splitter_is_not_served_cached_sentences() {
        let doc = Document::new("Alpha. Beta.");
        assert_eq!(doc.sentences(&UnicodeSentenceSplitter).len(), 2);
        assert_eq!(
            doc.sentences(&WholeTextSplitter).to_vec(),
            vec!["Alpha. Beta.".to_string()]
        );
        assert!(matches!(doc.sentences(&UnicodeSentenceSplitter), Cow::Borrowed(_)));
        assert!(matches!(doc.sentences(&WholeTextSplitter), Cow::Owned(_)));
    }

    #[test]
    fn test_document_id_display() {
        let id = DocumentId::new("note-42");
        assert_eq!(id.to_string(), "note-42");
        assert_eq!(id.as_str(), "note-42");
    }
}
