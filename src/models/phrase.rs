//! Phrases and concept groups.

use super::DocumentId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Runs of anything that is not a letter or digit.
static NON_ALPHANUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"[^\p{L}\p{N}]+").expect("static regex: non-alphanumeric runs")
});

/// Normalizes a phrase for comparison.
///
/// Lower-cases, collapses every run of non-alphanumeric characters (including
/// underscores) into one space, and trims.
#[must_use]
pub fn normalize_phrase(text: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&text.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Number of whitespace separated words in `text`.
#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// A candidate concept phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phrase {
    /// Surface text as extracted.
    pub text: String,
    /// Case and punctuation folded form.
    pub normalized: String,
    /// Source document, for lookup only.
    pub source: Option<DocumentId>,
}

impl Phrase {
    /// Creates a phrase with no source reference.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let normalized = normalize_phrase(&text);
        Self {
            text,
            normalized,
            source: None,
        }
    }

    /// Attaches the source document reference.
    #[must_use]
    pub fn with_source(mut self, source: DocumentId) -> Self {
        self.source = Some(source);
        self
    }
}

/// A set of phrases judged semantically equivalent.
///
/// Groups returned by one grouping call partition the phrases given to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptGroup {
    members: Vec<String>,
}

impl ConceptGroup {
    /// Creates a group from its members.
    #[must_use]
    pub const fn new(members: Vec<String>) -> Self {
        Self { members }
    }

    /// Returns the member phrases.
    #[must_use]
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Returns true if `phrase` is a member.
    #[must_use]
    pub fn contains(&self, phrase: &str) -> bool {
        self.members.iter().any(|m| m == phrase)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true for an empty group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns true if the group holds exactly one phrase.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    /// Consumes the group and returns its members.
    #[must_use]
    pub fn into_members(self) -> Vec<String> {
        self.members
    }
}
