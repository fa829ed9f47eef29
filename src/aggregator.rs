use crate::cache::ResultCache;
use crate::config::Config;
use crate::extractor::ArticleExtractor;
use crate::fetcher::Fetcher;
use crate::filter;
use crate::registry::SourceRegistry;
use crate::types::{ArticleContent, NewsError, Result, ResultBatch};
use tracing::{info, warn};

/// Composes registry, fetcher, filter, cache and extractor into the two
/// operations the front end consumes. Stateless between calls apart from
/// the cache; entry ids resolve against a batch the caller holds.
pub struct NewsAggregator {
    config: Config,
    registry: SourceRegistry,
    fetcher: Fetcher,
    extractor: ArticleExtractor,
    cache: ResultCache,
}

impl NewsAggregator {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let registry = SourceRegistry::new(config.sources.clone())?;
        let fetcher = Fetcher::new(&config)?;
        let extractor = ArticleExtractor::new(&config)?;

        Ok(Self {
            config,
            registry,
            fetcher,
            extractor,
            cache: ResultCache::new(),
        })
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Current filtered batch for the configured topic. Served from cache
    /// while fresh; otherwise one fetch cycle runs across all sources.
    /// All sources failing yields an empty batch, not an error.
    pub async fn get_news(&self) -> Result<ResultBatch> {
        let signature = self.registry.signature(&self.config.topic);
        let fetcher = &self.fetcher;
        let registry = &self.registry;
        let config = &self.config;

        self.cache
            .get_or_refresh(&signature, config.cache_ttl, || async move {
                let results = fetcher.fetch_all(registry.sources()).await;
                for result in &results {
                    if let Some(error) = &result.error {
                        warn!(source = %result.source.id, %error, "source excluded from this cycle");
                    }
                }
                let entries = filter::filter(results, &config.topic, config.max_entries);
                if entries.is_empty() {
                    info!(topic = %config.topic, "no entries matched this cycle");
                }
                Ok(entries)
            })
            .await
    }

    /// Full text for entry `index` of a batch previously returned by
    /// [`get_news`](Self::get_news). Ids are positional and die with their
    /// batch, so the index is checked against that batch before any
    /// network activity.
    pub async fn get_article(&self, batch: &ResultBatch, index: usize) -> Result<ArticleContent> {
        let entry = batch.entries.get(index).ok_or(NewsError::EntryNotFound {
            index,
            len: batch.entries.len(),
        })?;

        Ok(self.extractor.extract(&entry.url).await)
    }
}
