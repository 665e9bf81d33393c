//! DID resolution with optional caching

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use nuwa_did_common::{Document, split_fragment};
use tracing::debug;

use crate::errors::Result;

/// Anything that turns a DID into its current document
#[async_trait]
pub trait DIDResolver: Send + Sync {
    /// `force_refresh` bypasses any cache between the caller and the registry
    async fn resolve_did(&self, did: &str, force_refresh: bool) -> Result<Option<Document>>;
}

/// Configuration for [CachedResolver]
///
/// Use the [CachedResolverConfigBuilder] to create a new configuration.
#[derive(Clone, Debug)]
pub struct CachedResolverConfig {
    pub(crate) cache_capacity: u64,
    pub(crate) cache_ttl: Duration,
}

/// - cache_capacity: maximum number of cached documents (default: 1000)
/// - cache_ttl: time-to-live of each cached document (default: 300 seconds)
pub struct CachedResolverConfigBuilder {
    cache_capacity: u64,
    cache_ttl: Duration,
}

impl Default for CachedResolverConfigBuilder {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl CachedResolverConfigBuilder {
    /// Set the cache capacity (approx)
    /// Default: 1000 documents
    pub fn with_cache_capacity(mut self, cache_capacity: u64) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    /// Default: 300 seconds
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    pub fn build(self) -> CachedResolverConfig {
        CachedResolverConfig {
            cache_capacity: self.cache_capacity,
            cache_ttl: self.cache_ttl,
        }
    }
}

/// TTL cache in front of another resolver
///
/// Only found documents are cached, a DID that doesn't resolve is asked
/// again next time.
pub struct CachedResolver {
    inner: Arc<dyn DIDResolver>,
    cache: Cache<String, Document>,
}

impl CachedResolver {
    pub fn new(inner: Arc<dyn DIDResolver>, config: CachedResolverConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();
        CachedResolver { inner, cache }
    }

    /// Removes `did` from the cache
    pub async fn invalidate(&self, did: &str) {
        self.cache.invalidate(split_fragment(did).0).await;
    }

    /// Replaces the cached document, used after a successful local publish
    pub async fn insert(&self, document: Document) {
        self.cache.insert(document.id.clone(), document).await;
    }

    /// Access to the underlying cache, e.g. for statistics
    pub fn get_cache(&self) -> Cache<String, Document> {
        self.cache.clone()
    }
}

#[async_trait]
impl DIDResolver for CachedResolver {
    async fn resolve_did(&self, did: &str, force_refresh: bool) -> Result<Option<Document>> {
        let did = split_fragment(did).0;
        if !force_refresh && let Some(document) = self.cache.get(did).await {
            debug!(%did, "found DID document in cache");
            return Ok(Some(document));
        }

        debug!(%did, force_refresh, "resolving DID document");
        let resolved = self.inner.resolve_did(did, force_refresh).await?;
        match &resolved {
            Some(document) => self.cache.insert(did.to_string(), document.clone()).await,
            None => self.cache.invalidate(did).await,
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DID: &str = "did:example:alice";

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DIDResolver for Counting {
        async fn resolve_did(&self, did: &str, _force_refresh: bool) -> Result<Option<Document>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((did == DID).then(|| Document::new(did)))
        }
    }

    fn cached(inner: Arc<Counting>) -> CachedResolver {
        CachedResolver::new(inner, CachedResolverConfigBuilder::default().build())
    }

    #[tokio::test]
    async fn caches_found_documents() {
        let inner = Arc::new(Counting::default());
        let resolver = cached(inner.clone());

        assert!(resolver.resolve_did(DID, false).await.unwrap().is_some());
        assert!(
            resolver
                .resolve_did(&format!("{DID}#key-1"), false)
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        resolver.resolve_did(DID, true).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);

        resolver.invalidate(DID).await;
        resolver.resolve_did(DID, false).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn misses_are_not_cached() {
        let inner = Arc::new(Counting::default());
        let resolver = cached(inner.clone());

        assert!(resolver.resolve_did("did:example:bob", false).await.unwrap().is_none());
        assert!(resolver.resolve_did("did:example:bob", false).await.unwrap().is_none());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let inner = Arc::new(Counting::default());
        let resolver = CachedResolver::new(
            inner.clone(),
            CachedResolverConfigBuilder::default()
                .with_cache_ttl(Duration::from_millis(20))
                .build(),
        );

        resolver.resolve_did(DID, false).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        resolver.resolve_did(DID, false).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
