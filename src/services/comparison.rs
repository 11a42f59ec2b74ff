//! Target-versus-peers concept comparison.
//!
//! # Pipeline
//!
//! 1. Extract phrases from the target and from every peer.
//! 2. Count, per normalized phrase, how many peers mention it.
//! 3. Embed the combined vocabulary once and group it into connected
//!    components at the semantic threshold.
//! 4. Pick the lexical threshold from the target's phrases.
//! 5. Emit common concepts (target phrases some peer also has).
//! 6. Emit missing concepts (peer-only phrases with enough mentions).
//! 7. Greedy-cluster each document's phrases.
//! 8. Score target phrases and summarize topics.
//!
//! A failure confined to one document (parser error, timeout) empties that
//! document's phrases and the comparison continues. If the vocabulary cannot
//! be embedded, every phrase becomes its own group. Only invalid
//! configuration fails the call.

use super::context::find_context;
use super::extraction::ConceptExtractor;
use super::grouping::SimilarityGrouper;
use super::importance::ImportanceScorer;
use super::similarity::embed_all;
use crate::config::{NotegapConfig, ThresholdPolicy};
use crate::embedding::{Embedder, cosine_similarity};
use crate::models::{
    CommonConcept, ComparisonReport, ConceptClusters, Document, KeyPoint, MissingConcept, Phrase,
    SentimentSummary, SimilarConcept, TopicSummary, normalize_phrase,
};
use crate::nlp::{
    LexiconSentimentAnalyzer, SentenceSplitter, SentimentAnalyzer, SyntaxParser, Token,
    UnicodeSentenceSplitter, is_stopword, tokenize,
};
use crate::Result;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Combined phrase vocabulary of one comparison, target phrases first.
///
/// Each normalized form appears once, attributed to the first document that
/// produced it.
#[derive(Debug, Default)]
struct Vocabulary {
    phrases: Vec<Phrase>,
    index: HashMap<String, usize>,
    target_count: usize,
}

impl Vocabulary {
    fn build(
        target: &Document,
        target_phrases: &[String],
        peers: &[&Document],
        peer_phrases: &[Vec<String>],
    ) -> Self {
        let mut vocabulary = Self::default();
        for phrase in target_phrases {
            vocabulary.insert(phrase, target);
        }
        vocabulary.target_count = vocabulary.phrases.len();
        for (peer, phrases) in peers.iter().zip(peer_phrases) {
            for phrase in phrases {
                vocabulary.insert(phrase, peer);
            }
        }
        vocabulary
    }

    fn insert(&mut self, text: &str, source: &Document) {
        let phrase = Phrase::new(text).with_source(source.id().clone());
        if !self.index.contains_key(&phrase.normalized) {
            self.index.insert(phrase.normalized.clone(), self.phrases.len());
            self.phrases.push(phrase);
        }
    }

    fn text(&self, position: usize) -> &str {
        &self.phrases[position].text
    }

    fn position(&self, phrase: &str) -> Option<usize> {
        self.index.get(&normalize_phrase(phrase)).copied()
    }

    const fn is_target(&self, position: usize) -> bool {
        position < self.target_count
    }

    fn len(&self) -> usize {
        self.phrases.len()
    }
}

/// Intermediate state shared by the report builders.
struct Analysis<'a> {
    target: &'a Document,
    peers: &'a [&'a Document],
    target_phrases: Vec<String>,
    peer_phrases: Vec<Vec<String>>,
    peer_mentions: HashMap<String, usize>,
    vocabulary: Vocabulary,
    embeddings: Option<Vec<Vec<f32>>>,
    groups: Vec<Vec<usize>>,
    group_of: Vec<usize>,
}

impl Analysis<'_> {
    fn mentions(&self, position: usize) -> usize {
        self.peer_mentions
            .get(&self.vocabulary.phrases[position].normalized)
            .copied()
            .unwrap_or(0)
    }

    fn group_members(&self, position: usize) -> &[usize] {
        &self.groups[self.group_of[position]]
    }
}

/// Compares a target document against peer documents.
#[derive(Clone)]
pub struct ComparisonEngine {
    config: NotegapConfig,
    embedder: Arc<dyn Embedder>,
    extractor: ConceptExtractor,
    scorer: ImportanceScorer,
    sentiment: Arc<dyn SentimentAnalyzer>,
    splitter: Arc<dyn SentenceSplitter>,
    threshold_policy: Arc<dyn ThresholdPolicy>,
}

impl std::fmt::Debug for ComparisonEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComparisonEngine")
            .field("config", &self.config)
            .field("threshold_policy", &self.threshold_policy)
            .finish_non_exhaustive()
    }
}

impl ComparisonEngine {
    /// Creates an engine with the default language collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if
    /// `config` fails validation.
    pub fn new(embedder: Arc<dyn Embedder>, config: NotegapConfig) -> Result<Self> {
        config.validate()?;

        let sentiment: Arc<dyn SentimentAnalyzer> = Arc::new(LexiconSentimentAnalyzer::new());
        let splitter: Arc<dyn SentenceSplitter> = Arc::new(UnicodeSentenceSplitter);
        let extractor = ConceptExtractor::new(config.extraction.clone(), Arc::clone(&embedder))
            .with_splitter(Arc::clone(&splitter));
        let scorer = ImportanceScorer::new(config.importance, Arc::clone(&sentiment));
        let threshold_policy: Arc<dyn ThresholdPolicy> = Arc::new(config.comparison.lexical);

        Ok(Self {
            config,
            embedder,
            extractor,
            scorer,
            sentiment,
            splitter,
            threshold_policy,
        })
    }

    /// Replaces the sentiment analyzer used for contexts and importance.
    #[must_use]
    pub fn with_sentiment_analyzer(mut self, sentiment: Arc<dyn SentimentAnalyzer>) -> Self {
        self.scorer = ImportanceScorer::new(self.config.importance, Arc::clone(&sentiment));
        self.sentiment = sentiment;
        self
    }

    /// Replaces the syntactic parser used by the syntactic strategy.
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn SyntaxParser>) -> Self {
        self.extractor = self.extractor.with_parser(parser);
        self
    }

    /// Replaces the dynamic lexical threshold policy.
    #[must_use]
    pub fn with_threshold_policy(mut self, policy: Arc<dyn ThresholdPolicy>) -> Self {
        self.threshold_policy = policy;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &NotegapConfig {
        &self.config
    }

    /// Returns the phrase extractor.
    #[must_use]
    pub const fn extractor(&self) -> &ConceptExtractor {
        &self.extractor
    }

    /// Compares raw texts. See [`compare_documents`](Self::compare_documents).
    ///
    /// # Errors
    ///
    /// Never fails for a validated engine; the `Result` is reserved for
    /// contract violations.
    pub fn compare(&self, target: &str, peers: &[&str]) -> Result<ComparisonReport> {
        let target = Document::new(target);
        let peers: Vec<Document> = peers.iter().map(|text| Document::new(*text)).collect();
        let peer_refs: Vec<&Document> = peers.iter().collect();
        self.compare_documents(&target, &peer_refs)
    }

    /// Compares `target` against `peers`.
    ///
    /// With no peers the report is [`ComparisonReport::empty`].
    ///
    /// # Errors
    ///
    /// Never fails for a validated engine; the `Result` is reserved for
    /// contract violations.
    #[instrument(skip_all, fields(peer_count = peers.len(), target_length = target.text().len()))]
    pub fn compare_documents(
        &self,
        target: &Document,
        peers: &[&Document],
    ) -> Result<ComparisonReport> {
        if peers.is_empty() {
            tracing::info!("No peer documents, returning empty report");
            return Ok(ComparisonReport::empty());
        }
        let start = Instant::now();

        let analysis = self.analyze(target, peers);
        let lexical_threshold = self
            .threshold_policy
            .lexical_threshold(&analysis.target_phrases);
        tracing::debug!(lexical_threshold, "Chose lexical threshold");

        let report = ComparisonReport {
            common_concepts: self.common_concepts(&analysis),
            missing_concepts: self.missing_concepts(&analysis),
            concept_clusters: ConceptClusters {
                target_clusters: Self::clusters(
                    &analysis,
                    &analysis.target_phrases,
                    lexical_threshold,
                ),
                peer_clusters: analysis
                    .peer_phrases
                    .iter()
                    .map(|phrases| Self::clusters(&analysis, phrases, lexical_threshold))
                    .collect(),
            },
            importance_scores: analysis
                .target_phrases
                .iter()
                .map(|phrase| (phrase.clone(), self.scorer.score(phrase, target.text())))
                .collect(),
            topics: self.topics(&analysis),
            lexical_threshold,
        };

        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("notegap_comparison_duration_ms").record(duration_ms);
        tracing::info!(
            common = report.common_concepts.len(),
            missing = report.missing_concepts.len(),
            topics = report.topics.len(),
            duration_ms,
            "Comparison complete"
        );

        Ok(report)
    }

    /// Steps 1 to 3: extraction, peer counts, vocabulary grouping.
    fn analyze<'a>(&self, target: &'a Document, peers: &'a [&'a Document]) -> Analysis<'a> {
        let target_phrases = dedup_normalized(self.extractor.extract_phrases(target.text()));
        let peer_phrases: Vec<Vec<String>> = peers
            .iter()
            .map(|peer| dedup_normalized(self.extractor.extract_phrases(peer.text())))
            .collect();

        let mut peer_mentions: HashMap<String, usize> = HashMap::new();
        for phrase in peer_phrases.iter().flatten() {
            *peer_mentions.entry(normalize_phrase(phrase)).or_default() += 1;
        }

        let vocabulary = Vocabulary::build(target, &target_phrases, peers, &peer_phrases);
        let texts: Vec<&str> = vocabulary.phrases.iter().map(|p| p.text.as_str()).collect();
        let embeddings = match embed_all(self.embedder.as_ref(), &texts) {
            Ok(embeddings) => Some(embeddings),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    vocabulary = vocabulary.len(),
                    "Embedding vocabulary failed, treating every phrase as its own group"
                );
                None
            },
        };

        let groups: Vec<Vec<usize>> = embeddings.as_ref().map_or_else(
            || (0..vocabulary.len()).map(|i| vec![i]).collect(),
            |embeddings| {
                SimilarityGrouper::group_embedded(
                    embeddings,
                    self.config.comparison.semantic_threshold,
                )
            },
        );
        let mut group_of = vec![0; vocabulary.len()];
        for (group, members) in groups.iter().enumerate() {
            for &member in members {
                group_of[member] = group;
            }
        }

        tracing::debug!(
            target_phrases = target_phrases.len(),
            vocabulary = vocabulary.len(),
            groups = groups.len(),
            "Grouped combined vocabulary"
        );

        Analysis {
            target,
            peers,
            target_phrases,
            peer_phrases,
            peer_mentions,
            vocabulary,
            embeddings,
            groups,
            group_of,
        }
    }

    /// Step 5.
    fn common_concepts(&self, analysis: &Analysis<'_>) -> Vec<CommonConcept> {
        let vocabulary = &analysis.vocabulary;
        let common: Vec<usize> = (0..vocabulary.target_count)
            .filter(|&position| analysis.mentions(position) > 0)
            .collect();

        let needed: BTreeSet<usize> = common
            .iter()
            .flat_map(|&position| analysis.group_members(position).iter().copied())
            .collect();
        let contexts: HashMap<usize, String> = needed
            .into_iter()
            .map(|position| (position, self.locate_context(analysis, position)))
            .collect();
        let context_embeddings = self.embed_contexts(&contexts);

        let mut concepts: Vec<CommonConcept> = common
            .into_iter()
            .map(|position| {
                let phrase = vocabulary.text(position).to_string();
                let context = find_context(&phrase, analysis.target, self.splitter.as_ref());

                let mut similar_concepts: Vec<SimilarConcept> = analysis
                    .group_members(position)
                    .iter()
                    .filter(|&&other| other != position)
                    .map(|&other| SimilarConcept {
                        phrase: vocabulary.text(other).to_string(),
                        score: self.pair_score(analysis, &context_embeddings, position, other),
                    })
                    .collect();
                similar_concepts.sort_by(|a, b| descending(a.score, b.score));

                CommonConcept {
                    importance: self.scorer.score(&phrase, analysis.target.text()),
                    sentiment: self.summarize_sentiment(&context),
                    mentioned_by_peers: analysis.mentions(position),
                    similar_concepts,
                    context,
                    phrase,
                }
            })
            .collect();

        concepts.sort_by(|a, b| descending(a.importance, b.importance));
        concepts
    }

    /// Step 6.
    fn missing_concepts(&self, analysis: &Analysis<'_>) -> Vec<MissingConcept> {
        let vocabulary = &analysis.vocabulary;
        let floor = self.config.comparison.min_peer_mentions;

        let mut concepts: Vec<MissingConcept> = (vocabulary.target_count..vocabulary.len())
            .filter(|&position| analysis.mentions(position) >= floor)
            .map(|position| {
                let phrase = vocabulary.text(position).to_string();

                // First peer whose text mentions the phrase; later peers are not consulted.
                let located = analysis.peers.iter().find_map(|peer| {
                    let context = find_context(&phrase, peer, self.splitter.as_ref());
                    (!context.is_empty()).then_some(context)
                });
                let (context, importance) = match located {
                    Some(context) => {
                        let importance = self.scorer.score(&phrase, &context);
                        (context, importance)
                    },
                    None => (
                        String::new(),
                        Self::source_peer(analysis, position)
                            .map_or(0.0, |peer| self.scorer.score(&phrase, peer.text())),
                    ),
                };

                let similar_in_target = analysis
                    .group_members(position)
                    .iter()
                    .filter(|&&member| vocabulary.is_target(member))
                    .map(|&member| vocabulary.text(member).to_string())
                    .collect();

                MissingConcept {
                    sentiment: self.summarize_sentiment(&context),
                    mentioned_by_peers: analysis.mentions(position),
                    similar_in_target,
                    importance,
                    context,
                    phrase,
                }
            })
            .collect();

        concepts.sort_by(|a, b| {
            b.mentioned_by_peers
                .cmp(&a.mentioned_by_peers)
                .then_with(|| descending(a.importance, b.importance))
        });
        concepts
    }

    /// Step 7 for one document's phrases.
    fn clusters(analysis: &Analysis<'_>, phrases: &[String], threshold: f32) -> Vec<Vec<String>> {
        let Some(embeddings) = analysis.embeddings.as_ref() else {
            return phrases.iter().map(|p| vec![p.clone()]).collect();
        };

        let vectors: Vec<Vec<f32>> = phrases
            .iter()
            .map(|phrase| {
                analysis
                    .vocabulary
                    .position(phrase)
                    .map(|position| embeddings[position].clone())
                    .unwrap_or_default()
            })
            .collect();

        SimilarityGrouper::cluster_embedded(&vectors, threshold)
            .into_iter()
            .map(|members| members.into_iter().map(|i| phrases[i].clone()).collect())
            .collect()
    }

    /// Topic summaries over the vocabulary groups, heaviest first.
    #[allow(clippy::cast_precision_loss)]
    fn topics(&self, analysis: &Analysis<'_>) -> Vec<TopicSummary> {
        let vocabulary = &analysis.vocabulary;
        let weight_of = |position: usize| {
            usize::from(vocabulary.is_target(position)) + analysis.mentions(position)
        };

        let mut weighted: Vec<(usize, usize)> = analysis
            .groups
            .iter()
            .enumerate()
            .map(|(group, members)| (group, members.iter().map(|&m| weight_of(m)).sum()))
            .collect();
        let total: usize = weighted.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return Vec::new();
        }
        weighted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        weighted
            .into_iter()
            .take(self.config.comparison.max_topics)
            .enumerate()
            .map(|(topic_id, (group, weight))| TopicSummary {
                topic_id,
                top_words: self.top_words(
                    analysis.groups[group]
                        .iter()
                        .map(|&m| vocabulary.text(m)),
                ),
                topic_weight: weight as f32 / total as f32,
            })
            .collect()
    }

    fn top_words<'p>(&self, phrases: impl Iterator<Item = &'p str>) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for phrase in phrases {
            for token in tokenize(phrase) {
                if let Token::Word(word) = token {
                    let word = word.to_lowercase();
                    if !is_stopword(&word) {
                        *counts.entry(word).or_default() += 1;
                    }
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .take(self.config.comparison.top_words_per_topic)
            .map(|(word, _)| word)
            .collect()
    }

    /// Context of a vocabulary phrase: its first target sentence for target
    /// phrases, else its first peer sentence, else the phrase itself.
    fn locate_context(&self, analysis: &Analysis<'_>, position: usize) -> String {
        let phrase = analysis.vocabulary.text(position);
        let splitter = self.splitter.as_ref();

        let context = if analysis.vocabulary.is_target(position) {
            find_context(phrase, analysis.target, splitter)
        } else {
            analysis
                .peers
                .iter()
                .map(|peer| find_context(phrase, peer, splitter))
                .find(|context| !context.is_empty())
                .unwrap_or_default()
        };

        if context.is_empty() {
            phrase.to_string()
        } else {
            context
        }
    }

    fn embed_contexts(&self, contexts: &HashMap<usize, String>) -> HashMap<usize, Vec<f32>> {
        let positions: Vec<usize> = contexts.keys().copied().collect();
        let texts: Vec<&str> = positions.iter().map(|p| contexts[p].as_str()).collect();

        match embed_all(self.embedder.as_ref(), &texts) {
            Ok(vectors) => positions.into_iter().zip(vectors).collect(),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    contexts = texts.len(),
                    "Embedding contexts failed, scoring similar concepts by phrase only"
                );
                HashMap::new()
            },
        }
    }

    fn pair_score(
        &self,
        analysis: &Analysis<'_>,
        context_embeddings: &HashMap<usize, Vec<f32>>,
        a: usize,
        b: usize,
    ) -> f32 {
        let Some(embeddings) = analysis.embeddings.as_ref() else {
            return 0.0;
        };
        let phrase_similarity = cosine_similarity(&embeddings[a], &embeddings[b]);
        match (context_embeddings.get(&a), context_embeddings.get(&b)) {
            (Some(ca), Some(cb)) => {
                self.concept_score(phrase_similarity, cosine_similarity(ca, cb))
            },
            _ => phrase_similarity,
        }
    }

    /// Weighted mean of a phrase similarity and a context similarity.
    ///
    /// Identical phrase and context similarities of 1 score exactly 1.
    #[must_use]
    pub fn concept_score(&self, phrase_similarity: f32, context_similarity: f32) -> f32 {
        let phrase_weight = self.config.comparison.phrase_weight;
        let context_weight = self.config.comparison.context_weight;
        let total = phrase_weight + context_weight;
        if total <= 0.0 {
            return 0.0;
        }
        if phrase_similarity >= 1.0 && context_similarity >= 1.0 {
            return 1.0;
        }
        (phrase_weight * phrase_similarity + context_weight * context_similarity) / total
    }

    /// Polarity and key points of a context passage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize_sentiment(&self, context: &str) -> SentimentSummary {
        let sentences = self.splitter.split(context);
        if sentences.is_empty() {
            return SentimentSummary::default();
        }

        let scored: Vec<(String, f32, f32)> = sentences
            .into_iter()
            .map(|sentence| {
                let polarity = self.sentiment.analyze(&sentence);
                (sentence, polarity.polarity, polarity.subjectivity)
            })
            .collect();

        let count = scored.len() as f32;
        let overall_sentiment = scored.iter().map(|(_, p, _)| p).sum::<f32>() / count;
        let subjectivity = scored.iter().map(|(_, _, s)| s).sum::<f32>() / count;
        let floor = self.config.comparison.key_point_polarity;
        let key_points = scored
            .into_iter()
            .filter(|(_, polarity, _)| polarity.abs() >= floor)
            .map(|(text, polarity, _)| KeyPoint { text, polarity })
            .collect();

        SentimentSummary {
            overall_sentiment,
            subjectivity,
            key_points,
        }
    }

    /// The peer the vocabulary attributes a phrase to.
    fn source_peer<'a>(analysis: &Analysis<'a>, position: usize) -> Option<&'a Document> {
        let source = analysis.vocabulary.phrases[position].source.as_ref()?;
        analysis
            .peers
            .iter()
            .copied()
            .find(|peer| peer.id() == source)
    }
}

/// Keeps the first phrase of each normalized form.
fn dedup_normalized(phrases: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    phrases
        .into_iter()
        .filter(|phrase| seen.insert(normalize_phrase(phrase)))
        .collect()
}

fn descending(a: f32, b: f32) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::embedding::HashEmbedder;

    const TARGET: &str = "Mitochondria are the powerhouse of the cell. \
                          They produce ATP through respiration.";
    const PEER_A: &str = "In every cell, mitochondria produce energy for the organism. \
                          The cell membrane protects the cell.";
    const PEER_B: &str = "Inside a cell, mitochondria produce energy as ATP. \
                          Ribosomes build proteins.";

    fn engine() -> ComparisonEngine {
        ComparisonEngine::new(Arc::new(HashEmbedder::new()), NotegapConfig::default()).unwrap()
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dimensions(&self) -> usize {
            8
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::transient("embed", "model unavailable"))
        }
    }

    /// Embeds single phrases but fails on whole sentences.
    struct PhraseOnlyEmbedder(HashEmbedder);

    impl Embedder for PhraseOnlyEmbedder {
        fn dimensions(&self) -> usize {
            self.0.dimensions()
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            if text.contains('.') {
                return Err(Error::transient("embed", "sentence too long"));
            }
            self.0.embed(text)
        }
    }

    #[test]
    fn test_no_peers_is_empty() {
        let report = engine().compare(TARGET, &[]).unwrap();
        assert!(report.is_empty());
        assert!(report.importance_scores.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = NotegapConfig::default();
        config.comparison.semantic_threshold = 2.0;
        let result = ComparisonEngine::new(Arc::new(HashEmbedder::new()), config);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_missing_concept_found() {
        let report = engine().compare(TARGET, &[PEER_A, PEER_B]).unwrap();
        let missing = report
            .missing_concepts
            .iter()
            .find(|c| c.phrase == "mitochondria produce energy")
            .unwrap();
        assert_eq!(missing.mentioned_by_peers, 2);
        assert_eq!(
            missing.context,
            "In every cell, mitochondria produce energy for the organism."
        );
        assert!(missing.importance > 0.0);
    }

    #[test]
    fn test_common_concept_found() {
        let report = engine().compare(TARGET, &[PEER_A, PEER_B]).unwrap();
        let common = report
            .common_concepts
            .iter()
            .find(|c| c.phrase == "cell")
            .unwrap();
        assert_eq!(common.mentioned_by_peers, 2);
        assert_eq!(common.context, "Mitochondria are the powerhouse of the cell.");
        assert!(
            report
                .missing_concepts
                .iter()
                .all(|c| c.phrase != "cell")
        );
    }

    #[test]
    fn test_single_mention_is_not_missing() {
        let report = engine().compare(TARGET, &[PEER_A, PEER_B]).unwrap();
        assert!(
            report
                .missing_concepts
                .iter()
                .all(|c| c.phrase != "ribosomes build proteins")
        );
    }

    #[test]
    fn test_report_shapes() {
        let report = engine().compare(TARGET, &[PEER_A, PEER_B]).unwrap();
        assert_eq!(report.concept_clusters.peer_clusters.len(), 2);
        assert!(!report.concept_clusters.target_clusters.is_empty());
        assert!(report.importance_scores.contains_key("mitochondria"));
        assert!((report.lexical_threshold - 0.7).abs() < f32::EPSILON);
        assert!(report.topics.len() <= 5);
        let weight: f32 = report.topics.iter().map(|t| t.topic_weight).sum();
        assert!(weight <= 1.0 + 1e-6);
        for (i, topic) in report.topics.iter().enumerate() {
            assert_eq!(topic.topic_id, i);
        }
    }

    #[test]
    fn test_common_sorted_by_importance() {
        let report = engine().compare(TARGET, &[PEER_A, PEER_B]).unwrap();
        for pair in report.common_concepts.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
        for pair in report.missing_concepts.windows(2) {
            assert!(pair[0].mentioned_by_peers >= pair[1].mentioned_by_peers);
        }
    }

    #[test]
    fn test_embedding_failure_still_reports() {
        let engine =
            ComparisonEngine::new(Arc::new(FailingEmbedder), NotegapConfig::default()).unwrap();
        let report = engine.compare(TARGET, &[PEER_A, PEER_B]).unwrap();
        assert!(
            report
                .missing_concepts
                .iter()
                .any(|c| c.phrase == "mitochondria produce energy")
        );
        assert!(
            report
                .common_concepts
                .iter()
                .all(|c| c.similar_concepts.is_empty())
        );
        assert!(
            report
                .concept_clusters
                .target_clusters
                .iter()
                .all(|c| c.len() == 1)
        );
    }

    #[test]
    fn test_context_failure_scores_by_phrase_alone() {
        let engine = ComparisonEngine::new(
            Arc::new(PhraseOnlyEmbedder(HashEmbedder::new())),
            NotegapConfig::default(),
        )
        .unwrap();
        let report = engine.compare(TARGET, &[PEER_A, PEER_B]).unwrap();

        let hash = HashEmbedder::new();
        let mut checked = 0;
        for common in &report.common_concepts {
            for similar in &common.similar_concepts {
                let expected = cosine_similarity(
                    &hash.embed(&common.phrase).unwrap(),
                    &hash.embed(&similar.phrase).unwrap(),
                );
                assert!((similar.score - expected).abs() < 1e-5);
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_short_peer_contributes_nothing() {
        let report = engine().compare(TARGET, &[PEER_A, "Too short."]).unwrap();
        assert!(report.missing_concepts.is_empty());
        assert_eq!(report.concept_clusters.peer_clusters[1].len(), 0);
    }

    #[test]
    fn test_concept_score_self_is_one() {
        let engine = engine();
        assert!((engine.concept_score(1.0, 1.0) - 1.0).abs() < f32::EPSILON);
        assert!((engine.concept_score(1.0, 0.0) - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_summarize_sentiment_key_points() {
        let summary = engine().summarize_sentiment("This is excellent. Cells divide.");
        assert!(summary.overall_sentiment > 0.0);
        assert_eq!(summary.key_points.len(), 1);
        assert_eq!(summary.key_points[0].text, "This is excellent.");

        assert_eq!(
            engine().summarize_sentiment(""),
            SentimentSummary::default()
        );
    }

    #[test]
    fn test_threshold_policy_is_replaceable() {
        #[derive(Debug)]
        struct Fixed;
        impl ThresholdPolicy for Fixed {
            fn lexical_threshold(&self, _target_phrases: &[String]) -> f32 {
                0.95
            }
        }

        let report = engine()
            .with_threshold_policy(Arc::new(Fixed))
            .compare(TARGET, &[PEER_A, PEER_B])
            .unwrap();
        assert!((report.lexical_threshold - 0.95).abs() < f32::EPSILON);
    }
}
