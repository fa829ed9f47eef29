use sports_news_aggregator::types::{FeedItem, NewsEntry};
use sports_news_aggregator::ResultCache;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn entry(id: usize, title: &str) -> NewsEntry {
    NewsEntry::from_item(
        id,
        FeedItem {
            source_id: "test".to_string(),
            title: title.to_string(),
            summary: String::new(),
            url: format!("https://example.com/{}", id),
            published_at: None,
        },
    )
}

#[tokio::test]
async fn second_call_within_ttl_does_not_refresh() {
    let cache = ResultCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = calls.clone();
        let batch = cache
            .get_or_refresh("sig", Duration::from_secs(60), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![entry(0, "first")])
            })
            .await
            .unwrap();
        assert_eq!(batch.entries.len(), 1);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_batch_is_refreshed() {
    let cache = ResultCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = calls.clone();
        cache
            .get_or_refresh("sig", Duration::ZERO, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            })
            .await
            .unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let cache = Arc::new(ResultCache::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = cache.clone();
        let calls = calls.clone();
        handles.push(tokio::spawn(async move {
            cache
                .get_or_refresh("sig", Duration::from_secs(60), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    // Slow refresh; the other callers must wait for it.
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(vec![entry(0, "shared")])
                })
                .await
                .unwrap()
        }));
    }

    for handle in handles {
        let batch = handle.await.unwrap();
        assert_eq!(batch.entries[0].title, "shared");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn signatures_are_cached_independently() {
    let cache = ResultCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    for signature in ["esteghlal|a,b", "perspolis|a,b"] {
        let calls = calls.clone();
        let batch = cache
            .get_or_refresh(signature, Duration::from_secs(60), || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            })
            .await
            .unwrap();
        assert_eq!(batch.signature, signature);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_error_leaves_cache_retryable() {
    let cache = ResultCache::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let first = cache
        .get_or_refresh("sig", Duration::from_secs(60), || async {
            Err(sports_news_aggregator::NewsError::Parse(
                "bad cycle".to_string(),
            ))
        })
        .await;
    assert!(first.is_err());

    let calls_clone = calls.clone();
    let second = cache
        .get_or_refresh("sig", Duration::from_secs(60), || async move {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        })
        .await;
    assert!(second.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
