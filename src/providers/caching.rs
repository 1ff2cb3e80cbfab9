use crate::core::rates::{RateSource, RateTable};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Process-lifetime cache of the rate table.
///
/// The table is fetched lazily, at most once. Concurrent first callers wait on
/// the same fetch. A failed fetch or parse leaves an empty table behind and is
/// not retried, so every later conversion simply reports "not convertible".
pub struct RateCache<S: RateSource> {
    source: S,
    table: OnceCell<RateTable>,
}

impl<S: RateSource> RateCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            table: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.table.initialized()
    }

    /// Returns the rate table, fetching it on the first call only.
    pub async fn ensure_loaded(&self) -> &RateTable {
        self.table
            .get_or_init(|| async {
                debug!("Rate table not loaded yet, fetching");
                match self.source.fetch_rates().await {
                    Ok(table) => {
                        info!(
                            currencies = table.len(),
                            published = ?table.published(),
                            "Loaded exchange rates"
                        );
                        table
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to load exchange rates, conversions are disabled");
                        RateTable::empty()
                    }
                }
            })
            .await
    }

    pub async fn rate_for(&self, code: &str) -> Option<f64> {
        self.ensure_loaded().await.rate_for(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockSource {
        call_count: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl MockSource {
        fn new(fail: bool) -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for MockSource {
        async fn fetch_rates(&self) -> Result<RateTable> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                Err(anyhow!("HTTP error: 503 Service Unavailable"))
            } else {
                Ok(RateTable::from_rates([("USD", 1.10), ("JPY", 150.0)]))
            }
        }
    }

    #[tokio::test]
    async fn test_rates_are_fetched_once() {
        let cache = RateCache::new(MockSource::new(false));
        assert!(!cache.is_loaded());

        // First call - hits the source
        assert_eq!(cache.rate_for("usd").await, Some(1.10));
        assert_eq!(cache.source().calls(), 1);
        assert!(cache.is_loaded());

        // Later calls - served from the cache
        assert_eq!(cache.rate_for("JPY").await, Some(150.0));
        assert_eq!(cache.rate_for("GBP").await, None);
        cache.ensure_loaded().await;
        assert_eq!(cache.source().calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_retried() {
        let cache = RateCache::new(MockSource::new(true));

        let table = cache.ensure_loaded().await;
        assert!(table.is_empty());
        assert!(cache.is_loaded());

        assert_eq!(cache.rate_for("USD").await, None);
        assert!(cache.ensure_loaded().await.is_empty());
        assert_eq!(cache.source().calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_fetches_once() {
        let mut source = MockSource::new(false);
        source.delay = Duration::from_millis(50);
        let cache = Arc::new(RateCache::new(source));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.ensure_loaded().await.len() })
            })
            .collect();

        for handle in handles {
            // Every caller sees the fully loaded table
            assert_eq!(handle.await.unwrap(), 2);
        }
        assert_eq!(cache.source().calls(), 1);
    }
}
