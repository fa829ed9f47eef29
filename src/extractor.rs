use crate::config::Config;
use crate::types::{ArticleContent, ExtractionStatus, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Paragraphs at or below this many characters are treated as navigation
/// or boilerplate noise and discarded.
const MIN_BLOCK_CHARS: usize = 30;

const USER_AGENT: &str = "sports-news-aggregator/0.1";

/// Best-effort full-text extraction from an entry's source page. One
/// attempt per call, no retries; any failure degrades to
/// `ExtractionStatus::Unavailable` instead of an error.
pub struct ArticleExtractor {
    client: Client,
    request_timeout: Duration,
    char_cap: usize,
}

impl ArticleExtractor {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout,
            char_cap: config.article_char_cap,
        })
    }

    /// Fetch the page and derive readable text. Never raises to the
    /// caller; the front end offers a retry by re-invoking.
    pub async fn extract(&self, url: &str) -> ArticleContent {
        debug!(%url, "extracting article");

        let response = match timeout(self.request_timeout, self.client.get(url).send()).await {
            Err(_) => {
                warn!(%url, "article fetch timed out");
                return ArticleContent::unavailable(url);
            }
            Ok(Err(e)) => {
                warn!(%url, error = %e, "article fetch failed");
                return ArticleContent::unavailable(url);
            }
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "article page returned non-success status");
            return ArticleContent::unavailable(url);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%url, error = %e, "failed to read article body");
                return ArticleContent::unavailable(url);
            }
        };

        let (text, truncated) = extract_text(&body, MIN_BLOCK_CHARS, self.char_cap);
        if text.is_empty() {
            // Page parsed but nothing survived the boilerplate filter.
            warn!(%url, "no readable paragraphs found");
            return ArticleContent::unavailable(url);
        }

        let status = if truncated {
            ExtractionStatus::Truncated
        } else {
            ExtractionStatus::Full
        };

        info!(%url, chars = text.chars().count(), ?status, "article extracted");

        ArticleContent {
            url: url.to_string(),
            text,
            status,
        }
    }
}

/// Pure HTML-to-text step: collect paragraph blocks in document order,
/// drop blocks of `min_block_chars` or fewer characters, join the rest
/// with blank lines and truncate at `char_cap` characters. Returns the
/// text and whether truncation happened.
pub fn extract_text(html: &str, min_block_chars: usize, char_cap: usize) -> (String, bool) {
    let document = Html::parse_document(html);
    let paragraphs = Selector::parse("p").expect("static selector");

    let mut blocks = Vec::new();
    for element in document.select(&paragraphs) {
        let block = element.text().collect::<Vec<_>>().join(" ");
        let block = block.split_whitespace().collect::<Vec<_>>().join(" ");
        if block.chars().count() > min_block_chars {
            blocks.push(block);
        }
    }

    let text = blocks.join("\n\n");
    if text.chars().count() > char_cap {
        (text.chars().take(char_cap).collect(), true)
    } else {
        (text, false)
    }
}
