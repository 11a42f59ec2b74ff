//! Configuration management.
//!
//! Configuration is resolved in three layers: built-in defaults, an optional
//! TOML file, then `NOTEGAP_*` environment variables.
//!
//! ```toml
//! [extraction]
//! strategy = "keyword"
//! max_concepts = 10
//! similarity_threshold = 0.75
//! similarity_method = "string"
//!
//! [comparison]
//! semantic_threshold = 0.5
//! min_peer_mentions = 2
//!
//! [comparison.lexical]
//! word_limit = 5.0
//! short_threshold = 0.7
//! long_threshold = 0.8
//!
//! [importance]
//! frequency = 0.4
//! position = 0.3
//! sentiment = 0.3
//!
//! [embedding]
//! max_concurrent = 2
//! call_timeout_ms = 30000
//!
//! [logging]
//! format = "json"
//! level = "debug"
//! ```

mod policy;

pub use policy::{PhraseLengthPolicy, ThresholdPolicy};

use crate::embedding::EmbeddingGuardConfig;
use crate::observability::{LogFormat, LoggingConfig};
use crate::services::{ExtractionStrategy, SimilarityMethod};
use crate::{Error, Result, validate_threshold};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Phrase extraction settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Strategy used by `compare()` to extract phrases.
    pub strategy: ExtractionStrategy,
    /// Maximum phrases returned by `extract_concepts`.
    pub max_concepts: usize,
    /// Deduplication threshold for `filter_similar`.
    pub similarity_threshold: f32,
    /// Deduplication method for `filter_similar`.
    pub similarity_method: SimilarityMethod,
    /// Texts shorter than this many characters yield no phrases.
    pub min_text_length: usize,
    /// Shortest keyword phrase kept, in characters.
    pub min_phrase_chars: usize,
    /// Longest keyword phrase kept, in characters.
    pub max_phrase_chars: usize,
    /// Timeout for one syntactic parse in milliseconds (0 = none).
    pub parser_timeout_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::Keyword,
            max_concepts: 10,
            similarity_threshold: 0.75,
            similarity_method: SimilarityMethod::Lexical,
            min_text_length: 50,
            min_phrase_chars: 3,
            max_phrase_chars: 100,
            parser_timeout_ms: 10_000,
        }
    }
}

/// Comparison engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonConfig {
    /// Cosine threshold for grouping the combined vocabulary.
    pub semantic_threshold: f32,
    /// Peers that must mention a phrase before it counts as missing.
    pub min_peer_mentions: usize,
    /// Dynamic lexical threshold policy.
    pub lexical: PhraseLengthPolicy,
    /// Weight of phrase similarity in a similar-concept score.
    pub phrase_weight: f32,
    /// Weight of context similarity in a similar-concept score.
    pub context_weight: f32,
    /// Minimum absolute polarity for a sentence to be a key point.
    pub key_point_polarity: f32,
    /// Maximum topic summaries in a report.
    pub max_topics: usize,
    /// Maximum words per topic summary.
    pub top_words_per_topic: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: 0.5,
            min_peer_mentions: 2,
            lexical: PhraseLengthPolicy::default(),
            phrase_weight: 0.7,
            context_weight: 0.3,
            key_point_polarity: 0.5,
            max_topics: 5,
            top_words_per_topic: 5,
        }
    }
}

/// Weights of the importance signals.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportanceWeights {
    /// Weight of the raw occurrence count.
    pub frequency: f32,
    /// Weight of the first-occurrence position.
    pub position: f32,
    /// Weight of the phrase's absolute polarity.
    pub sentiment: f32,
}

impl Default for ImportanceWeights {
    fn default() -> Self {
        Self {
            frequency: 0.4,
            position: 0.3,
            sentiment: 0.3,
        }
    }
}

/// Main configuration for notegap.
#[derive(Debug, Clone, Default)]
pub struct NotegapConfig {
    /// Extraction settings.
    pub extraction: ExtractionConfig,
    /// Comparison settings.
    pub comparison: ComparisonConfig,
    /// Importance weights.
    pub importance: ImportanceWeights,
    /// Embedding guard settings.
    pub embedding: EmbeddingGuardConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Extraction section.
    pub extraction: Option<ConfigFileExtraction>,
    /// Comparison section.
    pub comparison: Option<ConfigFileComparison>,
    /// Importance section.
    pub importance: Option<ImportanceWeights>,
    /// Embedding section.
    pub embedding: Option<ConfigFileEmbedding>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
}

/// Extraction section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileExtraction {
    /// Strategy name.
    pub strategy: Option<String>,
    /// Max concepts.
    pub max_concepts: Option<usize>,
    /// Dedup threshold.
    pub similarity_threshold: Option<f32>,
    /// Dedup method name.
    pub similarity_method: Option<String>,
    /// Minimum text length.
    pub min_text_length: Option<usize>,
    /// Minimum phrase characters.
    pub min_phrase_chars: Option<usize>,
    /// Maximum phrase characters.
    pub max_phrase_chars: Option<usize>,
    /// Parser timeout.
    pub parser_timeout_ms: Option<u64>,
}

/// Comparison section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileComparison {
    /// Grouping threshold.
    pub semantic_threshold: Option<f32>,
    /// Peer mention floor.
    pub min_peer_mentions: Option<usize>,
    /// Lexical threshold policy.
    pub lexical: Option<PhraseLengthPolicy>,
    /// Phrase weight.
    pub phrase_weight: Option<f32>,
    /// Context weight.
    pub context_weight: Option<f32>,
    /// Key point polarity floor.
    pub key_point_polarity: Option<f32>,
    /// Topic limit.
    pub max_topics: Option<usize>,
    /// Words per topic.
    pub top_words_per_topic: Option<usize>,
}

/// Embedding section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileEmbedding {
    /// Concurrency limit.
    pub max_concurrent: Option<usize>,
    /// Permit acquire timeout.
    pub acquire_timeout_ms: Option<u64>,
    /// Per-call timeout.
    pub call_timeout_ms: Option<u64>,
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// "pretty" or "json".
    pub format: Option<String>,
    /// Default filter level.
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

impl NotegapConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or names an
    /// unknown strategy or similarity method.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the platform config dir, then `~/.config/notegap/config.toml`.
    /// Returns the default configuration if neither exists or loads.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("notegap").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("notegap")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `NotegapConfig`.
    fn from_config_file(file: ConfigFile) -> Result<Self> {
        let mut config = Self::default();

        if let Some(extraction) = file.extraction {
            let target = &mut config.extraction;
            if let Some(strategy) = extraction.strategy {
                target.strategy = ExtractionStrategy::parse(&strategy)?;
            }
            if let Some(method) = extraction.similarity_method {
                target.similarity_method = SimilarityMethod::parse(&method)?;
            }
            if let Some(v) = extraction.max_concepts {
                target.max_concepts = v;
            }
            if let Some(v) = extraction.similarity_threshold {
                target.similarity_threshold = v;
            }
            if let Some(v) = extraction.min_text_length {
                target.min_text_length = v;
            }
            if let Some(v) = extraction.min_phrase_chars {
                target.min_phrase_chars = v;
            }
            if let Some(v) = extraction.max_phrase_chars {
                target.max_phrase_chars = v;
            }
            if let Some(v) = extraction.parser_timeout_ms {
                target.parser_timeout_ms = v;
            }
        }

        if let Some(comparison) = file.comparison {
            let target = &mut config.comparison;
            if let Some(v) = comparison.semantic_threshold {
                target.semantic_threshold = v;
            }
            if let Some(v) = comparison.min_peer_mentions {
                target.min_peer_mentions = v;
            }
            if let Some(v) = comparison.lexical {
                target.lexical = v;
            }
            if let Some(v) = comparison.phrase_weight {
                target.phrase_weight = v;
            }
            if let Some(v) = comparison.context_weight {
                target.context_weight = v;
            }
            if let Some(v) = comparison.key_point_polarity {
                target.key_point_polarity = v;
            }
            if let Some(v) = comparison.max_topics {
                target.max_topics = v;
            }
            if let Some(v) = comparison.top_words_per_topic {
                target.top_words_per_topic = v;
            }
        }

        if let Some(importance) = file.importance {
            config.importance = importance;
        }

        if let Some(embedding) = file.embedding {
            if let Some(v) = embedding.max_concurrent {
                config.embedding.max_concurrent = v.max(1);
            }
            if let Some(v) = embedding.acquire_timeout_ms {
                config.embedding.acquire_timeout_ms = v;
            }
            if let Some(v) = embedding.call_timeout_ms {
                config.embedding.call_timeout_ms = v;
            }
        }

        if let Some(logging) = file.logging {
            if let Some(format) = logging.format {
                config.logging.format = LogFormat::parse(&format);
            }
            if let Some(level) = logging.level {
                config.logging.level = level;
            }
            config.logging.file = logging.file.map(PathBuf::from);
        }

        Ok(config)
    }

    /// Applies `NOTEGAP_*` environment variable overrides.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `NOTEGAP_EXTRACTION_STRATEGY` | `extraction.strategy` |
    /// | `NOTEGAP_MAX_CONCEPTS` | `extraction.max_concepts` |
    /// | `NOTEGAP_SIMILARITY_THRESHOLD` | `extraction.similarity_threshold` |
    /// | `NOTEGAP_SIMILARITY_METHOD` | `extraction.similarity_method` |
    /// | `NOTEGAP_PARSER_TIMEOUT_MS` | `extraction.parser_timeout_ms` |
    /// | `NOTEGAP_SEMANTIC_THRESHOLD` | `comparison.semantic_threshold` |
    /// | `NOTEGAP_MIN_PEER_MENTIONS` | `comparison.min_peer_mentions` |
    ///
    /// Embedding and logging variables are handled by their own sections.
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("NOTEGAP_EXTRACTION_STRATEGY") {
            match ExtractionStrategy::parse(&v) {
                Ok(strategy) => self.extraction.strategy = strategy,
                Err(e) => tracing::warn!(error = %e, "Ignoring NOTEGAP_EXTRACTION_STRATEGY"),
            }
        }
        if let Ok(v) = std::env::var("NOTEGAP_SIMILARITY_METHOD") {
            match SimilarityMethod::parse(&v) {
                Ok(method) => self.extraction.similarity_method = method,
                Err(e) => tracing::warn!(error = %e, "Ignoring NOTEGAP_SIMILARITY_METHOD"),
            }
        }
        if let Ok(v) = std::env::var("NOTEGAP_MAX_CONCEPTS")
            && let Ok(parsed) = v.parse::<usize>()
        {
            self.extraction.max_concepts = parsed;
        }
        if let Ok(v) = std::env::var("NOTEGAP_SIMILARITY_THRESHOLD")
            && let Ok(parsed) = v.parse::<f32>()
        {
            self.extraction.similarity_threshold = parsed;
        }
        if let Ok(v) = std::env::var("NOTEGAP_PARSER_TIMEOUT_MS")
            && let Ok(parsed) = v.parse::<u64>()
        {
            self.extraction.parser_timeout_ms = parsed;
        }
        if let Ok(v) = std::env::var("NOTEGAP_SEMANTIC_THRESHOLD")
            && let Ok(parsed) = v.parse::<f32>()
        {
            self.comparison.semantic_threshold = parsed;
        }
        if let Ok(v) = std::env::var("NOTEGAP_MIN_PEER_MENTIONS")
            && let Ok(parsed) = v.parse::<usize>()
        {
            self.comparison.min_peer_mentions = parsed;
        }

        self.embedding = self.embedding.with_env_overrides();
        self.logging = self.logging.with_env_overrides();
        self
    }

    /// Checks thresholds and weights.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a threshold outside `[0, 1]`, a
    /// negative or non-finite weight, all-zero weights, an empty phrase-length
    /// range or a zero peer-mention floor.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(
            "extraction.similarity_threshold",
            self.extraction.similarity_threshold,
        )?;
        validate_threshold(
            "comparison.semantic_threshold",
            self.comparison.semantic_threshold,
        )?;
        validate_threshold(
            "comparison.lexical.short_threshold",
            self.comparison.lexical.short_threshold,
        )?;
        validate_threshold(
            "comparison.lexical.long_threshold",
            self.comparison.lexical.long_threshold,
        )?;
        validate_threshold(
            "comparison.key_point_polarity",
            self.comparison.key_point_polarity,
        )?;

        validate_weights(
            "comparison similar-concept weights",
            &[self.comparison.phrase_weight, self.comparison.context_weight],
        )?;
        validate_weights(
            "importance weights",
            &[
                self.importance.frequency,
                self.importance.position,
                self.importance.sentiment,
            ],
        )?;

        if self.extraction.min_phrase_chars > self.extraction.max_phrase_chars {
            return Err(Error::InvalidArgument(format!(
                "extraction.min_phrase_chars ({}) exceeds extraction.max_phrase_chars ({})",
                self.extraction.min_phrase_chars, self.extraction.max_phrase_chars
            )));
        }
        if self.comparison.min_peer_mentions == 0 {
            return Err(Error::InvalidArgument(
                "comparison.min_peer_mentions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn validate_weights(name: &str, weights: &[f32]) -> Result<()> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(Error::InvalidArgument(format!(
            "{name} must be finite and non-negative, got {weights:?}"
        )));
    }
    if weights.iter().sum::<f32>() <= 0.0 {
        return Err(Error::InvalidArgument(format!(
            "{name} must not all be zero"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = NotegapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.max_concepts, 10);
        assert!((config.extraction.similarity_threshold - 0.75).abs() < f32::EPSILON);
        assert_eq!(config.extraction.similarity_method, SimilarityMethod::Lexical);
        assert_eq!(config.comparison.min_peer_mentions, 2);
        assert!((config.importance.frequency - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[extraction]
strategy = "syntactic"
similarity_method = "semantic"
max_concepts = 5

[comparison]
semantic_threshold = 0.6

[comparison.lexical]
word_limit = 3.0

[importance]
frequency = 0.5

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = NotegapConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.extraction.strategy, ExtractionStrategy::Syntactic);
        assert_eq!(config.extraction.similarity_method, SimilarityMethod::Semantic);
        assert_eq!(config.extraction.max_concepts, 5);
        assert!((config.comparison.semantic_threshold - 0.6).abs() < f32::EPSILON);
        assert!((config.comparison.lexical.word_limit - 3.0).abs() < f32::EPSILON);
        assert!((config.comparison.lexical.long_threshold - 0.8).abs() < f32::EPSILON);
        assert!((config.importance.frequency - 0.5).abs() < f32::EPSILON);
        assert!((config.importance.position - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_rejects_unknown_method() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extraction]\nsimilarity_method = \"phonetic\"").unwrap();

        let result = NotegapConfig::load_from_file(file.path());
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = NotegapConfig::load_from_file(Path::new("/nonexistent/notegap.toml"));
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let mut config = NotegapConfig::default();
        config.comparison.semantic_threshold = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let mut config = NotegapConfig::default();
        config.extraction.similarity_threshold = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let mut config = NotegapConfig::default();
        config.importance = ImportanceWeights {
            frequency: 0.0,
            position: 0.0,
            sentiment: 0.0,
        };
        assert!(config.validate().is_err());

        let mut config = NotegapConfig::default();
        config.comparison.phrase_weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_phrase_range() {
        let mut config = NotegapConfig::default();
        config.extraction.min_phrase_chars = 200;
        assert!(config.validate().is_err());
    }
}
