//! Phrase similarity and order-preserving deduplication.

use crate::embedding::{Embedder, cosine_similarity};
use crate::models::normalize_phrase;
use crate::{Error, Result, validate_threshold};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// How two phrases are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityMethod {
    /// Sequence-matching ratio over normalized phrases.
    #[default]
    Lexical,
    /// Cosine similarity of phrase embeddings.
    Semantic,
}

impl SimilarityMethod {
    /// Parses a method name.
    ///
    /// Accepts `string` or `lexical` and `semantic`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for any other name.
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "string" | "lexical" => Ok(Self::Lexical),
            "semantic" => Ok(Self::Semantic),
            other => Err(Error::InvalidArgument(format!(
                "unsupported similarity method '{other}' (expected 'string' or 'semantic')"
            ))),
        }
    }

    /// Returns the canonical method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "string",
            Self::Semantic => "semantic",
        }
    }
}

impl fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimilarityMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`. Among equally long blocks the one starting
/// earliest in `a` wins, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let width = bhi - blo + 1;
    let mut previous = vec![0usize; width];
    let mut current = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let size = previous[slot - 1] + 1;
                current[slot] = size;
                if size > best.2 {
                    best = (i + 1 - size, j + 1 - size, size);
                }
            } else {
                current[slot] = 0;
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    best
}

/// Gestalt pattern-matching ratio of two strings, in `[0, 1]`.
///
/// Finds the longest common block, recurses on both sides of it, and returns
/// `2 * matched / (len(a) + len(b))`. Two empty strings have ratio 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sequence_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut matched = 0;
    let mut pending = vec![((0, a.len()), (0, b.len()))];
    while let Some(((alo, ahi), (blo, bhi))) = pending.pop() {
        let (i, j, size) = longest_match(&a, &b, (alo, ahi), (blo, bhi));
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push(((alo, i), (blo, j)));
        }
        if i + size < ahi && j + size < bhi {
            pending.push(((i + size, ahi), (j + size, bhi)));
        }
    }

    (2 * matched) as f32 / total as f32
}

/// Similarity of two phrases under `method`, in `[0, 1]` for lexical and
/// `[-1, 1]` for semantic.
///
/// Identical phrases score 1 under both methods.
///
/// # Errors
///
/// Returns an error if embedding either phrase fails.
pub fn similarity(
    a: &str,
    b: &str,
    method: SimilarityMethod,
    embedder: &dyn Embedder,
) -> Result<f32> {
    match method {
        SimilarityMethod::Lexical => {
            Ok(sequence_ratio(&normalize_phrase(a), &normalize_phrase(b)))
        },
        SimilarityMethod::Semantic => {
            if a == b {
                return Ok(1.0);
            }
            let vectors = embed_all(embedder, &[a, b])?;
            Ok(cosine_similarity(&vectors[0], &vectors[1]))
        },
    }
}

/// Returns true if `a` and `b` are at least `threshold` similar.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for a threshold outside `[0, 1]`, or an
/// embedding error for the semantic method.
pub fn is_similar(
    a: &str,
    b: &str,
    threshold: f32,
    method: SimilarityMethod,
    embedder: &dyn Embedder,
) -> Result<bool> {
    validate_threshold("threshold", threshold)?;
    Ok(similarity(a, b, method, embedder)? >= threshold)
}

/// Greedy order-preserving deduplication.
///
/// Walks `phrases` in order and keeps a phrase only if it is less than
/// `threshold` similar to every phrase kept so far. The semantic method embeds
/// all phrases in one batch.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for a malformed threshold, or an
/// embedding error for the semantic method.
#[instrument(skip(phrases, embedder), fields(phrase_count = phrases.len(), method = %method))]
pub fn filter_similar<S: AsRef<str>>(
    phrases: &[S],
    threshold: f32,
    method: SimilarityMethod,
    embedder: &dyn Embedder,
) -> Result<Vec<String>> {
    validate_threshold("threshold", threshold)?;

    let kept_indices = match method {
        SimilarityMethod::Lexical => {
            let normalized: Vec<String> = phrases
                .iter()
                .map(|p| normalize_phrase(p.as_ref()))
                .collect();
            greedy_keep(phrases.len(), |candidate, kept| {
                sequence_ratio(&normalized[candidate], &normalized[kept]) >= threshold
            })
        },
        SimilarityMethod::Semantic => {
            let texts: Vec<&str> = phrases.iter().map(AsRef::as_ref).collect();
            let vectors = embed_all(embedder, &texts)?;
            greedy_keep(phrases.len(), |candidate, kept| {
                texts[candidate] == texts[kept]
                    || cosine_similarity(&vectors[candidate], &vectors[kept]) >= threshold
            })
        },
    };

    tracing::debug!(
        input = phrases.len(),
        kept = kept_indices.len(),
        "Filtered similar phrases"
    );

    Ok(kept_indices
        .into_iter()
        .map(|i| phrases[i].as_ref().to_string())
        .collect())
}

/// Embeds `texts` in one batch, checking that every text got a vector.
pub(crate) fn embed_all(embedder: &dyn Embedder, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
        return Ok(Vec::new());
    }
    let vectors = embedder.embed_batch(texts)?;
    if vectors.len() != texts.len() {
        return Err(Error::transient(
            "embed_batch",
            format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
        ));
    }
    Ok(vectors)
}

fn greedy_keep(count: usize, similar: impl Fn(usize, usize) -> bool) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::new();
    for candidate in 0..count {
        if !kept.iter().any(|&k| similar(candidate, k)) {
            kept.push(candidate);
        }
    }
    kept
}
