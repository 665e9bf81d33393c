//! Replay protection
//!
//! A nonce is keyed by `(signer_did, domain_separator, nonce)` and remembered
//! until its signed timestamp falls out of the clock skew window, after which
//! the timestamp check rejects the request anyway.

use std::time::{Duration, Instant};

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Records the nonce unless it is already present and unexpired
    ///
    /// Returns `true` if the nonce was stored. Implementations must be atomic:
    /// two concurrent calls with the same key never both return `true`.
    async fn try_store_nonce(
        &self,
        did: &str,
        domain_separator: &str,
        nonce: &str,
        ttl: Duration,
    ) -> bool;
}

type NonceKey = (String, String, String);

struct Inner {
    entries: HashMap<NonceKey, Instant>,
    inserts_since_sweep: usize,
}

/// Process local [NonceStore]
///
/// Expired entries are swept lazily every `sweep_interval` inserts.
pub struct InMemoryNonceStore {
    inner: Mutex<Inner>,
    sweep_interval: usize,
}

impl Default for InMemoryNonceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNonceStore {
    pub fn new() -> Self {
        Self::with_sweep_interval(256)
    }

    pub fn with_sweep_interval(sweep_interval: usize) -> Self {
        InMemoryNonceStore {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                inserts_since_sweep: 0,
            }),
            sweep_interval: sweep_interval.max(1),
        }
    }

    /// Number of remembered nonces, expired ones included until swept
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl NonceStore for InMemoryNonceStore {
    async fn try_store_nonce(
        &self,
        did: &str,
        domain_separator: &str,
        nonce: &str,
        ttl: Duration,
    ) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock().await;

        let key = (
            did.to_string(),
            domain_separator.to_string(),
            nonce.to_string(),
        );
        if let Some(expires) = inner.entries.get(&key)
            && *expires > now
        {
            return false;
        }

        inner.entries.insert(key, now + ttl);
        inner.inserts_since_sweep += 1;
        if inner.inserts_since_sweep >= self.sweep_interval {
            let before = inner.entries.len();
            inner.entries.retain(|_, expires| *expires > now);
            inner.inserts_since_sweep = 0;
            debug!(
                removed = before - inner.entries.len(),
                "swept expired nonces"
            );
        }
        true
    }
}
