//! Property-based tests for extraction, deduplication and grouping.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Grouping partitions its input
//! - Greedy deduplication is idempotent
//! - Every phrase is fully similar to itself under both methods
//! - Text under the minimum length yields no concepts

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use notegap::config::ExtractionConfig;
use notegap::embedding::HashEmbedder;
use notegap::models::normalize_phrase;
use notegap::services::{sequence_ratio, similarity};
use notegap::{ConceptExtractor, SimilarityGrouper, SimilarityMethod, filter_similar};
use proptest::prelude::*;
use std::sync::Arc;

fn phrase() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "cell", "membrane", "energy", "atp", "krebs", "cycle", "protein", "ribosome",
            "mitochondria", "produce", "build", "nucleus", "chain",
        ]),
        1..4,
    )
    .prop_map(|words| words.join(" "))
}

fn method() -> impl Strategy<Value = SimilarityMethod> {
    prop_oneof![
        Just(SimilarityMethod::Lexical),
        Just(SimilarityMethod::Semantic)
    ]
}

proptest! {
    /// Property: grouping and clustering return every input position exactly once.
    #[test]
    fn prop_group_is_partition(
        phrases in prop::collection::vec(phrase(), 0..20),
        threshold in 0.0f32..1.0,
    ) {
        let grouper = SimilarityGrouper::new(Arc::new(HashEmbedder::new()));

        for groups in [
            grouper.group(&phrases, threshold).unwrap(),
            grouper.cluster(&phrases, threshold).unwrap(),
        ] {
            let mut seen: Vec<String> = groups
                .iter()
                .flat_map(|g| g.members().iter().cloned())
                .collect();
            let mut expected = phrases.clone();
            seen.sort();
            expected.sort();
            prop_assert_eq!(seen, expected);
            prop_assert!(groups.iter().all(|g| !g.is_empty()));
        }
    }

    /// Property: filtering an already filtered list changes nothing.
    #[test]
    fn prop_filter_similar_idempotent(
        phrases in prop::collection::vec(phrase(), 0..15),
        threshold in 0.05f32..1.0,
        method in method(),
    ) {
        let embedder = HashEmbedder::new();
        let once = filter_similar(&phrases, threshold, method, &embedder).unwrap();
        let twice = filter_similar(&once, threshold, method, &embedder).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Property: kept phrases preserve input order.
    #[test]
    fn prop_filter_similar_is_subsequence(
        phrases in prop::collection::vec(phrase(), 0..15),
        threshold in 0.05f32..1.0,
    ) {
        let embedder = HashEmbedder::new();
        let kept = filter_similar(&phrases, threshold, SimilarityMethod::Lexical, &embedder)
            .unwrap();
        let mut remaining = phrases.iter();
        for phrase in &kept {
            prop_assert!(remaining.any(|p| p == phrase));
        }
    }

    /// Property: every phrase is fully similar to itself.
    #[test]
    fn prop_self_similarity(p in phrase(), method in method()) {
        let embedder = HashEmbedder::new();
        let score = similarity(&p, &p, method, &embedder).unwrap();
        prop_assert!((score - 1.0).abs() < 1e-5);
    }

    /// Property: the sequence ratio is bounded and maximal for equal strings.
    #[test]
    fn prop_sequence_ratio_bounded(a in "[a-z ]{0,30}", b in "[a-z ]{0,30}") {
        let ratio = sequence_ratio(&a, &b);
        prop_assert!((0.0..=1.0).contains(&ratio));
        prop_assert!((sequence_ratio(&a, &a) - 1.0).abs() < f32::EPSILON);
    }

    /// Property: normalization is idempotent.
    #[test]
    fn prop_normalize_idempotent(s in "[A-Za-z0-9 ,.!?_-]{0,60}") {
        let once = normalize_phrase(&s);
        prop_assert_eq!(normalize_phrase(&once), once);
    }

    /// Property: text under 50 characters yields no concepts.
    #[test]
    fn prop_short_text_has_no_concepts(text in "[A-Za-z .,]{0,49}") {
        let extractor = ConceptExtractor::new(
            ExtractionConfig::default(),
            Arc::new(HashEmbedder::new()),
        );
        let concepts = extractor.extract_concepts(&text, 10, 0.75, "string").unwrap();
        prop_assert!(concepts.is_empty());
    }
}
