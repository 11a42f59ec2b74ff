//! Concurrency limiting and call timeouts for embedding operations.
//!
//! Embedding generation is CPU and memory intensive, and parallel comparison
//! requests share one model. [`GuardedEmbedder`] limits how many embedding
//! calls run at once (semaphore bulkhead) and bounds each call with a
//! caller-supplied timeout.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notegap::embedding::{EmbeddingGuardConfig, FastEmbedEmbedder, GuardedEmbedder};
//!
//! let config = EmbeddingGuardConfig::default().with_call_timeout_ms(5_000);
//! let embedder = GuardedEmbedder::new(FastEmbedEmbedder::new(), config);
//! let vectors = embedder.embed_batch(&["cell membrane", "lipid bilayer"])?;
//! ```

use super::Embedder;
use crate::resilience::call_with_timeout;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Configuration for [`GuardedEmbedder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingGuardConfig {
    /// Maximum concurrent embedding calls.
    ///
    /// Default: 2.
    pub max_concurrent: usize,

    /// Timeout for acquiring a permit in milliseconds.
    ///
    /// Default: 30000ms.
    pub acquire_timeout_ms: u64,

    /// Timeout for a single `embed`/`embed_batch` call in milliseconds (0 = none).
    ///
    /// Default: 30000ms.
    pub call_timeout_ms: u64,
}

impl Default for EmbeddingGuardConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingGuardConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_concurrent: 2,
            acquire_timeout_ms: 30_000,
            call_timeout_ms: 30_000,
        }
    }

    /// Applies environment variable overrides.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `NOTEGAP_EMBEDDING_MAX_CONCURRENT` | Max concurrent calls | 2 |
    /// | `NOTEGAP_EMBEDDING_ACQUIRE_TIMEOUT_MS` | Permit timeout | 30000 |
    /// | `NOTEGAP_EMBEDDING_TIMEOUT_MS` | Per-call timeout | 30000 |
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("NOTEGAP_EMBEDDING_MAX_CONCURRENT")
            && let Ok(parsed) = v.parse::<usize>()
        {
            self.max_concurrent = parsed.max(1);
        }
        if let Ok(v) = std::env::var("NOTEGAP_EMBEDDING_ACQUIRE_TIMEOUT_MS")
            && let Ok(parsed) = v.parse::<u64>()
        {
            self.acquire_timeout_ms = parsed;
        }
        if let Ok(v) = std::env::var("NOTEGAP_EMBEDDING_TIMEOUT_MS")
            && let Ok(parsed) = v.parse::<u64>()
        {
            self.call_timeout_ms = parsed;
        }
        self
    }

    /// Sets the maximum concurrent calls.
    #[must_use]
    pub const fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = max;
        self
    }

    /// Sets the permit acquire timeout in milliseconds.
    #[must_use]
    pub const fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = timeout_ms;
        self
    }

    /// Sets the per-call timeout in milliseconds.
    #[must_use]
    pub const fn with_call_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.call_timeout_ms = timeout_ms;
        self
    }
}

/// Embedder wrapper enforcing a concurrency limit and a per-call timeout.
pub struct GuardedEmbedder<E: Embedder + 'static> {
    inner: Arc<E>,
    config: EmbeddingGuardConfig,
    semaphore: Arc<Semaphore>,
}

impl<E: Embedder + 'static> GuardedEmbedder<E> {
    /// Creates a new guarded embedder.
    #[must_use]
    pub fn new(inner: E, config: EmbeddingGuardConfig) -> Self {
        Self::from_arc(Arc::new(inner), config)
    }

    /// Creates a guarded embedder around a shared inner embedder.
    #[must_use]
    pub fn from_arc(inner: Arc<E>, config: EmbeddingGuardConfig) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));
        Self {
            inner,
            config,
            semaphore,
        }
    }

    /// Returns the current number of available permits.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a permit until the acquire timeout passes.
    fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        let timeout = Duration::from_millis(self.config.acquire_timeout_ms);
        let start = Instant::now();

        loop {
            if let Ok(permit) = Arc::clone(&self.semaphore).try_acquire_owned() {
                return Ok(permit);
            }

            if start.elapsed() >= timeout {
                metrics::counter!("notegap_embedding_rejections_total", "reason" => "timeout")
                    .increment(1);
                return Err(Error::Timeout {
                    operation: "embedding_acquire".to_string(),
                    timeout_ms: self.config.acquire_timeout_ms,
                });
            }

            std::thread::sleep(Duration::from_millis(5));
        }
    }

    /// Executes a call with a permit held and the call timeout applied.
    fn execute<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<E>) -> Result<T> + Send + 'static,
    {
        let permit = self.acquire_permit()?;
        let inner = Arc::clone(&self.inner);
        let timeout = Duration::from_millis(self.config.call_timeout_ms);

        tracing::trace!(operation = operation, "Acquired embedding permit");

        // The permit moves into the worker so an abandoned call keeps its slot.
        let result = call_with_timeout(operation, timeout, move || {
            let _permit = permit;
            call(inner)
        });

        if matches!(result, Err(Error::Timeout { .. })) {
            metrics::counter!("notegap_embedding_timeouts_total", "operation" => operation)
                .increment(1);
        }
        result
    }
}

impl<E: Embedder + 'static> Embedder for GuardedEmbedder<E> {
    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_string();
        self.execute("embed", move |inner| inner.embed(&text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let owned: Vec<String> = texts.iter().map(|t| (*t).to_string()).collect();
        self.execute("embed_batch", move |inner| {
            let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
            inner.embed_batch(&refs)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowEmbedder {
        delay_ms: u64,
        call_count: AtomicUsize,
    }

    impl SlowEmbedder {
        fn new(delay_ms: u64) -> Self {
            Self {
                delay_ms,
                call_count: AtomicUsize::new(0),
            }
        }
    }

    impl Embedder for SlowEmbedder {
        fn dimensions(&self) -> usize {
            8
        }

        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.delay_ms));
            }
            Ok(vec![1.0; 8])
        }
    }

    #[test]
    fn test_config_default() {
        let config = EmbeddingGuardConfig::default();
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.acquire_timeout_ms, 30_000);
        assert_eq!(config.call_timeout_ms, 30_000);
    }

    #[test]
    fn test_config_builder() {
        let config = EmbeddingGuardConfig::new()
            .with_max_concurrent(4)
            .with_acquire_timeout_ms(10)
            .with_call_timeout_ms(20);
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.acquire_timeout_ms, 10);
        assert_eq!(config.call_timeout_ms, 20);
    }

    #[test]
    fn test_embed_within_limits() {
        let guarded = GuardedEmbedder::new(SlowEmbedder::new(0), EmbeddingGuardConfig::default());
        assert_eq!(guarded.embed("test").unwrap().len(), 8);
        assert_eq!(guarded.embed_batch(&["a", "b"]).unwrap().len(), 2);
        assert_eq!(guarded.dimensions(), 8);
    }

    #[test]
    fn test_slow_call_times_out() {
        let config = EmbeddingGuardConfig::new().with_call_timeout_ms(20);
        let guarded = GuardedEmbedder::new(SlowEmbedder::new(300), config);

        let err = guarded.embed("slow").unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[test]
    fn test_permits_are_released() {
        let config = EmbeddingGuardConfig::new().with_max_concurrent(3);
        let guarded = GuardedEmbedder::new(SlowEmbedder::new(0), config);
        assert_eq!(guarded.available_permits(), 3);
        guarded.embed("x").unwrap();
        assert_eq!(guarded.available_permits(), 3);
    }

    #[test]
    fn test_full_bulkhead_times_out_on_acquire() {
        let config = EmbeddingGuardConfig::new()
            .with_max_concurrent(1)
            .with_acquire_timeout_ms(10)
            .with_call_timeout_ms(0);
        let guarded = Arc::new(GuardedEmbedder::new(SlowEmbedder::new(200), config));

        let background = Arc::clone(&guarded);
        let handle = std::thread::spawn(move || background.embed("slow"));
        std::thread::sleep(Duration::from_millis(50));

        let result = guarded.embed("fast");
        let _ = handle.join();

        assert!(matches!(result, Err(Error::Timeout { ref operation, .. }) if operation == "embedding_acquire"));
    }
}
