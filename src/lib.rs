pub mod aggregator;
pub mod cache;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod filter;
pub mod registry;
pub mod types;

pub use aggregator::NewsAggregator;
pub use cache::ResultCache;
pub use config::Config;
pub use extractor::ArticleExtractor;
pub use fetcher::Fetcher;
pub use registry::SourceRegistry;
pub use types::*;
