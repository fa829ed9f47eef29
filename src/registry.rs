use crate::types::{NewsError, Result, Source};
use url::Url;

/// The set of feed endpoints one deployment aggregates. Built once at
/// startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    sources: Vec<Source>,
}

impl SourceRegistry {
    pub fn new(sources: Vec<Source>) -> Result<Self> {
        if sources.is_empty() {
            return Err(NewsError::Config("no feed sources configured".to_string()));
        }
        for source in &sources {
            let url = Url::parse(&source.feed_url)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(NewsError::Config(format!(
                    "source {} has non-HTTP feed URL: {}",
                    source.id, source.feed_url
                )));
            }
        }
        Ok(Self { sources })
    }

    /// The reference deployment: five Persian sports outlets.
    pub fn default_sources() -> Vec<Source> {
        let feeds = [
            ("varzesh3", "Varzesh3", "https://www.varzesh3.com/rss/all"),
            ("tarafdari", "Tarafdari", "https://www.tarafdari.com/rss/all"),
            ("footballi", "Footballi", "https://footballi.net/rss/news"),
            (
                "metafootball",
                "Metafootball",
                "https://metafootball.com/fa/news/feed",
            ),
            (
                "khabarvarzeshi",
                "Khabar Varzeshi",
                "https://www.khabarvarzeshi.com/rss",
            ),
        ];

        feeds
            .iter()
            .map(|(id, name, url)| Source {
                id: id.to_string(),
                name: name.to_string(),
                feed_url: url.to_string(),
            })
            .collect()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn display_name(&self, source_id: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|s| s.id == source_id)
            .map(|s| s.name.as_str())
    }

    /// Key identifying which topic + source set a cached batch answers.
    pub fn signature(&self, topic: &str) -> String {
        let ids: Vec<&str> = self.sources.iter().map(|s| s.id.as_str()).collect();
        format!("{}|{}", topic, ids.join(","))
    }
}
