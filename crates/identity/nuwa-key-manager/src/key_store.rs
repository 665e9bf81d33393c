//! Key persistence

use std::fmt;

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use nuwa_crypto::KeyType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::errors::Result;

/// Local key record. Only the public half is ever published.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredKey {
    /// Full verification method id, `did#fragment`
    pub key_id: String,
    pub key_type: KeyType,
    pub public_key_multibase: String,
    pub private_key_multibase: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<Value>,
}

impl StoredKey {
    /// DID part of the key id
    pub fn did(&self) -> &str {
        nuwa_did_common::split_fragment(&self.key_id).0
    }
}

impl fmt::Debug for StoredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredKey")
            .field("key_id", &self.key_id)
            .field("key_type", &self.key_type)
            .field("public_key_multibase", &self.public_key_multibase)
            .field("private_key_multibase", &"<redacted>")
            .field("meta", &self.meta)
            .finish()
    }
}

/// Pluggable key persistence
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn list_key_ids(&self) -> Result<Vec<String>>;

    async fn load(&self, key_id: &str) -> Result<Option<StoredKey>>;

    async fn save(&self, key: StoredKey) -> Result<()>;

    /// Removes one key, or every key when `key_id` is `None`
    async fn clear(&self, key_id: Option<&str>) -> Result<()>;
}

/// In-memory [KeyStore]
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<String, StoredKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn list_key_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.keys.read().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn load(&self, key_id: &str) -> Result<Option<StoredKey>> {
        Ok(self.keys.read().await.get(key_id).cloned())
    }

    async fn save(&self, key: StoredKey) -> Result<()> {
        self.keys.write().await.insert(key.key_id.clone(), key);
        Ok(())
    }

    async fn clear(&self, key_id: Option<&str>) -> Result<()> {
        let mut keys = self.keys.write().await;
        match key_id {
            Some(key_id) => {
                keys.remove(key_id);
            }
            None => keys.clear(),
        }
        Ok(())
    }
}
