//! Logging configuration.

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name; anything other than "json" is pretty.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Level for the `notegap` target when no filter variable is set.
    pub level: String,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Applies `NOTEGAP_LOG_FORMAT` and `NOTEGAP_LOG_FILE`.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = std::env::var("NOTEGAP_LOG_FORMAT") {
            self.format = LogFormat::parse(&v);
        }
        if let Ok(v) = std::env::var("NOTEGAP_LOG_FILE")
            && !v.trim().is_empty()
        {
            self.file = Some(PathBuf::from(v));
        }
        self
    }

    /// Builds the event filter.
    ///
    /// `NOTEGAP_LOG` wins, then `RUST_LOG`, then `notegap=<level>` where
    /// `verbose` raises the level to `debug`.
    #[must_use]
    pub fn filter(&self, verbose: bool) -> EnvFilter {
        for var in ["NOTEGAP_LOG", "RUST_LOG"] {
            if let Ok(directives) = std::env::var(var)
                && let Ok(filter) = EnvFilter::try_new(&directives)
            {
                return filter;
            }
        }

        let level = if verbose { "debug" } else { self.level.as_str() };
        EnvFilter::try_new(format!("notegap={level}"))
            .unwrap_or_else(|_| EnvFilter::new("notegap=info"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, "info");
        assert!(config.file.is_none());
    }
}
