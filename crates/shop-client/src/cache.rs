//! Query cache keyed by endpoint path.
//!
//! Reads go through `fetch`, which loads a key at most once at a time:
//! concurrent callers of a missing key wait on the same load. Mutations
//! call `invalidate` so the next read refetches.

use crate::error::{ClientError, ClientResult};
use moka::future::Cache;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Cached JSON responses, keyed by endpoint path (`/api/cart`).
#[derive(Clone)]
pub struct QueryCache {
    inner: Cache<String, Value>,
}

impl QueryCache {
    /// Create a cache whose entries expire after `ttl`
    pub fn new(ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(256)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Cached value for `key`, or the result of `loader`.
    ///
    /// Failed loads are not cached.
    pub async fn fetch<F, Fut>(&self, key: &str, loader: F) -> ClientResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<Value>>,
    {
        self.inner
            .try_get_with(key.to_string(), async {
                debug!("Cache miss for {}", key);
                loader().await
            })
            .await
            .map_err(|e: std::sync::Arc<ClientError>| (*e).clone())
    }

    /// Mark `key` stale
    pub async fn invalidate(&self, key: &str) {
        debug!("Invalidating {}", key);
        self.inner.invalidate(key).await;
    }

    /// Mark everything stale (login/logout)
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Whether a fresh value is cached for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fetch_caches_until_invalidated() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let loads = AtomicUsize::new(0);

        let load = || async {
            loads.fetch_add(1, Ordering::SeqCst);
            Ok(json!([1, 2]))
        };

        assert_eq!(cache.fetch("/api/cart", load).await.unwrap(), json!([1, 2]));
        assert_eq!(cache.fetch("/api/cart", load).await.unwrap(), json!([1, 2]));
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        cache.invalidate("/api/cart").await;
        assert!(!cache.contains("/api/cart"));
        cache.fetch("/api/cart", load).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));

        let err = cache
            .fetch("/api/user", || async {
                Err(ClientError::Network("refused".into()))
            })
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Network("refused".into()));

        let value = cache
            .fetch("/api/user", || async { Ok(json!({"id": 1})) })
            .await
            .unwrap();
        assert_eq!(value["id"], 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_load() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let loads = Arc::new(AtomicUsize::new(0));

        let fetches = (0..8).map(|_| {
            let cache = cache.clone();
            let loads = loads.clone();
            tokio::spawn(async move {
                cache
                    .fetch("/api/products", || async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(json!([]))
                    })
                    .await
            })
        });

        for handle in fetches.collect::<Vec<_>>() {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
