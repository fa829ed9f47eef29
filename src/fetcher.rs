use crate::config::Config;
use crate::filter;
use crate::types::{FeedItem, FetchResult, NewsError, Result, Source};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use chrono::Utc;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Items taken from a single feed per cycle; the rest are ignored.
const PER_SOURCE_CAP: usize = 10;

const USER_AGENT: &str = "sports-news-aggregator/0.1";
const RETRY_DELAY: Duration = Duration::from_secs(2);
const MAX_REDIRECTS: usize = 5;

/// Fetches every configured feed concurrently, isolating per-source
/// failures. Cheap to clone; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    request_timeout: Duration,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        // No client-level timeout: the per-source deadline in
        // `fetch_source` covers the whole request including the body read.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
            max_retries: config.max_retries,
        })
    }

    /// Fetch all sources concurrently, one task per source. Returns once
    /// every source has completed or timed out; a failed source yields a
    /// `FetchResult` carrying its error and no entries.
    pub async fn fetch_all(&self, sources: &[Source]) -> Vec<FetchResult> {
        info!(sources = sources.len(), "fetching all feeds");

        let handles: Vec<_> = sources
            .iter()
            .cloned()
            .map(|source| {
                let fetcher = self.clone();
                tokio::spawn(async move { fetcher.fetch_source(source).await })
            })
            .collect();

        // Barrier: wait for every source to settle before assembling the
        // batch, so observed ordering never depends on response order.
        let joined = futures::future::join_all(handles).await;

        let mut results = Vec::with_capacity(joined.len());
        for (handle, source) in joined.into_iter().zip(sources) {
            match handle {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(source = %source.id, error = %e, "fetch task failed");
                    results.push(FetchResult::failed(
                        source.clone(),
                        NewsError::SourceUnavailable {
                            source: source.id.clone(),
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        let fetched: usize = results.iter().map(|r| r.entries.len()).sum();
        let failed = results.iter().filter(|r| r.error.is_some()).count();
        info!(entries = fetched, failed_sources = failed, "fetch cycle complete");

        results
    }

    /// Fetch and parse one feed. All failures, including the per-source
    /// deadline, become a typed result rather than a propagated error.
    async fn fetch_source(&self, source: Source) -> FetchResult {
        debug!(source = %source.id, url = %source.feed_url, "fetching feed");

        let body = match timeout(self.request_timeout, self.fetch_with_retry(&source)).await {
            Err(_) => {
                warn!(source = %source.id, "feed fetch timed out");
                return FetchResult::failed(
                    source.clone(),
                    NewsError::Timeout {
                        source: source.id.clone(),
                    },
                );
            }
            Ok(Err(e)) => {
                warn!(source = %source.id, error = %e, "feed fetch failed");
                return FetchResult::failed(source, e);
            }
            Ok(Ok(body)) => body,
        };

        match parse_items(&source.id, &body, PER_SOURCE_CAP) {
            Ok(entries) => {
                info!(source = %source.id, entries = entries.len(), "feed fetched");
                FetchResult::ok(source, entries)
            }
            Err(e) => {
                warn!(source = %source.id, error = %e, "feed unparseable");
                FetchResult::failed(source, e)
            }
        }
    }

    async fn fetch_with_retry(&self, source: &Source) -> Result<String> {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: RETRY_DELAY,
            initial_interval: RETRY_DELAY,
            ..Default::default()
        };

        let mut attempt = 0;
        loop {
            match self.request_feed(source).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(e);
                    }
                    attempt += 1;
                    match backoff.next_backoff() {
                        Some(delay) => {
                            warn!(source = %source.id, attempt, delay = ?delay, "retrying feed fetch");
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(e),
                    }
                }
            }
        }
    }

    async fn request_feed(&self, source: &Source) -> Result<String> {
        let response = self.client.get(&source.feed_url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(NewsError::SourceUnavailable {
                source: source.id.clone(),
                reason: format!("HTTP {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

/// Parse a feed payload into items, keeping at most `cap` of them.
/// Malformed items are skipped individually; a feed with some broken
/// entries still contributes its valid ones.
pub fn parse_items(source_id: &str, content: &str, cap: usize) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(content.as_bytes())
        .map_err(|e| NewsError::Parse(format!("failed to parse feed: {}", e)))?;

    let mut items = Vec::new();
    for entry in feed.entries {
        if items.len() >= cap {
            break;
        }
        if let Some(item) = parse_entry(source_id, entry) {
            items.push(item);
        }
    }

    debug!(source = source_id, items = items.len(), "parsed feed");
    Ok(items)
}

fn parse_entry(source_id: &str, entry: feed_rs::model::Entry) -> Option<FeedItem> {
    let title = filter::clean_text(&entry.title.map(|t| t.content)?);
    if title.is_empty() {
        debug!(source = source_id, "skipping entry with empty title");
        return None;
    }

    let url = entry.links.first()?.href.clone();

    // Prefer the summary, fall back to full content.
    let summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .map(|s| filter::clean_text(&s))
        .unwrap_or_default();

    let published_at = entry.published.map(|dt| dt.with_timezone(&Utc));

    Some(FeedItem {
        source_id: source_id.to_string(),
        title,
        summary,
        url,
        published_at,
    })
}
