use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A configured feed endpoint. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub feed_url: String,
}

/// An item pulled out of a single feed, before topic filtering.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub source_id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

/// A filtered entry inside one batch.
///
/// `id` is the entry's position within the batch that produced it and is
/// invalidated by the next refresh; it is never globally stable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsEntry {
    pub id: usize,
    pub source_id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsEntry {
    pub fn from_item(id: usize, item: FeedItem) -> Self {
        Self {
            id,
            source_id: item.source_id,
            title: item.title,
            summary: item.summary,
            url: item.url,
            published_at: item.published_at,
        }
    }
}

/// One filtered, ordered result set from a single fetch cycle.
/// Replaced wholesale on refresh, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultBatch {
    pub entries: Vec<NewsEntry>,
    pub fetched_at: DateTime<Utc>,
    pub signature: String,
}

/// Outcome of fetching a single source. A failed source carries its error
/// here instead of propagating it; the entries of other sources are never
/// affected.
#[derive(Debug)]
pub struct FetchResult {
    pub source: Source,
    pub entries: Vec<FeedItem>,
    pub error: Option<NewsError>,
}

impl FetchResult {
    pub fn ok(source: Source, entries: Vec<FeedItem>) -> Self {
        Self {
            source,
            entries,
            error: None,
        }
    }

    pub fn failed(source: Source, error: NewsError) -> Self {
        Self {
            source,
            entries: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Full,
    Truncated,
    Unavailable,
}

/// Best-effort extracted article text. Computed per request, never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleContent {
    pub url: String,
    pub text: String,
    pub status: ExtractionStatus,
}

impl ArticleContent {
    pub fn unavailable(url: &str) -> Self {
        Self {
            url: url.to_string(),
            text: String::new(),
            status: ExtractionStatus::Unavailable,
        }
    }
}

// Hand-written Display/Error impls instead of `thiserror::Error`: the
// derive treats any field named `source` as the error's cause, but here
// `source` is a feed-source id string and must stay named as the spec says.
#[derive(Debug)]
pub enum NewsError {
    /// source {source} unavailable: {reason}
    SourceUnavailable { source: String, reason: String },

    /// source {source} timed out
    Timeout { source: String },

    /// feed parse error: {0}
    Parse(String),

    /// entry {index} not found in batch of {len}
    EntryNotFound { index: usize, len: usize },

    /// invalid URL: {0}
    InvalidUrl(url::ParseError),

    /// HTTP error: {0}
    Http(reqwest::Error),

    /// configuration error: {0}
    Config(String),
}

impl std::fmt::Display for NewsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NewsError::SourceUnavailable { source, reason } => {
                write!(f, "source {} unavailable: {}", source, reason)
            }
            NewsError::Timeout { source } => write!(f, "source {} timed out", source),
            NewsError::Parse(msg) => write!(f, "feed parse error: {}", msg),
            NewsError::EntryNotFound { index, len } => {
                write!(f, "entry {} not found in batch of {}", index, len)
            }
            NewsError::InvalidUrl(e) => write!(f, "invalid URL: {}", e),
            NewsError::Http(e) => write!(f, "HTTP error: {}", e),
            NewsError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for NewsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NewsError::InvalidUrl(e) => Some(e),
            NewsError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<url::ParseError> for NewsError {
    fn from(e: url::ParseError) -> Self {
        NewsError::InvalidUrl(e)
    }
}

impl From<reqwest::Error> for NewsError {
    fn from(e: reqwest::Error) -> Self {
        NewsError::Http(e)
    }
}

pub type Result<T> = std::result::Result<T, NewsError>;
