use crate::types::{NewsError, Result, Source};
use crate::SourceRegistry;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Runtime configuration, resolved once at startup. Missing optional values
/// fall back to the reference defaults; invalid values are fatal.
#[derive(Debug, Clone)]
pub struct Config {
    /// Keyword an entry's title or summary must contain.
    pub topic: String,
    pub sources: Vec<Source>,
    /// Cap on entries per batch, keeping the most recent.
    pub max_entries: usize,
    pub cache_ttl: Duration,
    /// Per-request deadline for feed and article fetches.
    pub request_timeout: Duration,
    pub article_char_cap: usize,
    /// Extra attempts per feed fetch. 0 = single attempt.
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: "استقلال".to_string(),
            sources: SourceRegistry::default_sources(),
            max_entries: 10,
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(10),
            article_char_cap: 3000,
            max_retries: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let sources = match env::var("NEWS_SOURCES") {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| NewsError::Config(format!("NEWS_SOURCES is not valid JSON: {}", e)))?,
            Err(_) => defaults.sources,
        };

        let config = Self {
            topic: env::var("NEWS_TOPIC").unwrap_or(defaults.topic),
            sources,
            max_entries: parse_env("NEWS_MAX_ENTRIES", defaults.max_entries)?,
            cache_ttl: Duration::from_secs(parse_env(
                "NEWS_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            request_timeout: Duration::from_secs(parse_env(
                "NEWS_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            article_char_cap: parse_env("NEWS_ARTICLE_CHAR_CAP", defaults.article_char_cap)?,
            max_retries: parse_env("NEWS_MAX_RETRIES", defaults.max_retries)?,
        };

        config.validate()?;

        info!(
            topic = %config.topic,
            sources = config.sources.len(),
            max_entries = config.max_entries,
            cache_ttl_secs = config.cache_ttl.as_secs(),
            "configuration loaded"
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(NewsError::Config("topic keyword is empty".to_string()));
        }
        if self.sources.is_empty() {
            return Err(NewsError::Config("no feed sources configured".to_string()));
        }
        if self.max_entries == 0 {
            return Err(NewsError::Config("max_entries must be at least 1".to_string()));
        }
        if self.article_char_cap == 0 {
            return Err(NewsError::Config(
                "article_char_cap must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(NewsError::Config(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| NewsError::Config(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}
