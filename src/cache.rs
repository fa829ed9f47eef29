use crate::types::{NewsEntry, Result, ResultBatch};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Time-bounded store of the last filtered batch per signature.
///
/// A per-signature async mutex gives the single-flight guarantee: while a
/// refresh is in progress every other caller for the same signature waits
/// on the lock, re-checks freshness once it acquires it, and shares the
/// stored batch instead of fetching again. Batches are replaced wholesale;
/// a reader never sees a partially written one.
pub struct ResultCache {
    slots: Mutex<HashMap<String, Arc<Mutex<Option<ResultBatch>>>>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached batch for `signature` if it is younger than `ttl`;
    /// otherwise run `refresh`, store its result and return it.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        signature: &str,
        ttl: Duration,
        refresh: F,
    ) -> Result<ResultBatch>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<NewsEntry>>>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(signature.to_string()).or_default().clone()
        };

        // Holding the slot lock across the refresh is what serializes
        // concurrent refreshes for this signature.
        let mut guard = slot.lock().await;

        let ttl = ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX);
        if let Some(batch) = guard.as_ref() {
            if Utc::now().signed_duration_since(batch.fetched_at) < ttl {
                debug!(signature, "cache hit");
                return Ok(batch.clone());
            }
        }

        info!(signature, "cache miss, refreshing batch");
        let entries = refresh().await?;
        let batch = ResultBatch {
            entries,
            fetched_at: Utc::now(),
            signature: signature.to_string(),
        };
        *guard = Some(batch.clone());

        Ok(batch)
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}
