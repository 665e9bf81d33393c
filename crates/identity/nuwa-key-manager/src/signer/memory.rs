use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use nuwa_crypto::{KeyPair, provider_for};
use tracing::debug;

use crate::{
    errors::{KeyManagerError, Result},
    signer::{KeyInfo, SignerInterface},
};

/// Signer holding raw key pairs for a single DID
///
/// Intended for tests and short lived processes; keys live only in memory.
#[derive(Debug, Clone)]
pub struct MemorySigner {
    did: String,
    keys: HashMap<String, KeyPair>,
}

impl MemorySigner {
    pub fn new(did: impl Into<String>) -> Self {
        MemorySigner {
            did: did.into(),
            keys: HashMap::new(),
        }
    }

    /// Adds a key pair under its full key id
    pub fn add_key(&mut self, key_id: impl Into<String>, key_pair: KeyPair) -> Result<()> {
        let key_id = key_id.into();
        if nuwa_did_common::split_fragment(&key_id).0 != self.did {
            return Err(KeyManagerError::DidMismatch {
                did: self.did.clone(),
                key_id,
            });
        }
        self.keys.insert(key_id, key_pair);
        Ok(())
    }

    pub fn with_key(mut self, key_id: impl Into<String>, key_pair: KeyPair) -> Result<Self> {
        self.add_key(key_id, key_pair)?;
        Ok(self)
    }
}

#[async_trait]
impl SignerInterface for MemorySigner {
    async fn list_key_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.keys.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn sign_with_key_id(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>> {
        let key_pair = self
            .keys
            .get(key_id)
            .ok_or_else(|| KeyManagerError::KeyNotFound(key_id.to_string()))?;
        debug!(key_id, key_type = %key_pair.key_type, "signing with in-memory key");
        Ok(provider_for(key_pair.key_type).sign(data, &key_pair.private_key)?)
    }

    async fn can_sign_with_key_id(&self, key_id: &str) -> bool {
        self.keys.contains_key(key_id)
    }

    async fn get_did(&self) -> Result<String> {
        Ok(self.did.clone())
    }

    async fn get_key_info(&self, key_id: &str) -> Option<KeyInfo> {
        self.keys.get(key_id).map(|key_pair| KeyInfo {
            key_type: key_pair.key_type,
            public_key: key_pair.public_key.clone(),
        })
    }
}
