//! Key lifecycle for a single DID

use std::sync::Arc;

use async_trait::async_trait;
use nuwa_crypto::{KeyMultibaseCodec, KeyType, did_key_from_public_key, provider_for};
use nuwa_did_common::{ACCOUNT_KEY_FRAGMENT, split_fragment};
use tokio::sync::RwLock;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{
    KeyStore, MemoryKeyStore, StoredKey,
    errors::{KeyManagerError, Result},
    signer::{KeyInfo, SignerInterface},
};

/// Generates, imports and signs with the keys of one DID
///
/// Every key id managed here shares the bound DID as its prefix. Private keys
/// are only used internally through [KeyManager::sign_with_key_id].
pub struct KeyManager {
    store: Arc<dyn KeyStore>,
    did: RwLock<Option<String>>,
    default_key_type: KeyType,
}

impl KeyManager {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        KeyManager {
            store,
            did: RwLock::new(None),
            default_key_type: KeyType::Ed25519,
        }
    }

    /// A key manager backed by a fresh [MemoryKeyStore]
    pub fn with_memory_store() -> Self {
        Self::new(Arc::new(MemoryKeyStore::new()))
    }

    pub fn with_default_key_type(mut self, key_type: KeyType) -> Self {
        self.default_key_type = key_type;
        self
    }

    /// Bootstraps a `did:key` identity and returns it with its master key id
    pub async fn create_with_did_key(key_type: KeyType) -> Result<(Self, String)> {
        let key_pair = provider_for(key_type).generate_key_pair()?;
        let did = did_key_from_public_key(key_type, &key_pair.public_key);
        let key_id = format!("{did}#{ACCOUNT_KEY_FRAGMENT}");

        let manager = Self::with_memory_store().with_default_key_type(key_type);
        manager
            .import_key(StoredKey {
                key_id: key_id.clone(),
                key_type,
                public_key_multibase: KeyMultibaseCodec::encode_with_type(
                    &key_pair.public_key,
                    key_type,
                ),
                private_key_multibase: KeyMultibaseCodec::encode_private_with_type(
                    &key_pair.private_key,
                    key_type,
                ),
                meta: None,
            })
            .await?;

        info!(%did, "created did:key identity");
        Ok((manager, key_id))
    }

    /// Binds the DID; fails if a different DID is already bound
    pub async fn set_did(&self, did: impl Into<String>) -> Result<()> {
        let did = did.into();
        let mut bound = self.did.write().await;
        match bound.as_ref() {
            Some(existing) if *existing != did => Err(KeyManagerError::DidMismatch {
                did: existing.clone(),
                key_id: did,
            }),
            _ => {
                *bound = Some(did);
                Ok(())
            }
        }
    }

    pub async fn did(&self) -> Option<String> {
        self.did.read().await.clone()
    }

    /// Generates and stores a new key under `<did>#<fragment>`
    ///
    /// The fragment defaults to `key-<unix millis>`.
    pub async fn generate_key(
        &self,
        fragment: Option<&str>,
        key_type: Option<KeyType>,
    ) -> Result<StoredKey> {
        let did = self.did().await.ok_or(KeyManagerError::DidNotSet)?;
        let key_type = key_type.unwrap_or(self.default_key_type);
        let fragment = fragment
            .map(str::to_string)
            .unwrap_or_else(|| format!("key-{}", chrono::Utc::now().timestamp_millis()));
        let key_id = format!("{did}#{fragment}");

        if self.store.load(&key_id).await?.is_some() {
            return Err(KeyManagerError::KeyExists(key_id));
        }

        let key_pair = provider_for(key_type).generate_key_pair()?;
        let stored = StoredKey {
            key_id,
            key_type,
            public_key_multibase: KeyMultibaseCodec::encode_with_type(
                &key_pair.public_key,
                key_type,
            ),
            private_key_multibase: KeyMultibaseCodec::encode_private_with_type(
                &key_pair.private_key,
                key_type,
            ),
            meta: None,
        };
        self.store.save(stored.clone()).await?;

        debug!(key_id = %stored.key_id, %key_type, "generated key");
        Ok(stored)
    }

    /// Imports externally generated key material
    ///
    /// The first import binds the DID when none is bound yet.
    pub async fn import_key(&self, key: StoredKey) -> Result<()> {
        let (did, fragment) = split_fragment(&key.key_id);
        if fragment.is_none() {
            return Err(KeyManagerError::InvalidKey(format!(
                "{}: key id must be a DID URL with a fragment",
                key.key_id
            )));
        }

        {
            let mut bound = self.did.write().await;
            match bound.as_ref() {
                Some(existing) if existing != did => {
                    return Err(KeyManagerError::DidMismatch {
                        did: existing.clone(),
                        key_id: key.key_id.clone(),
                    });
                }
                Some(_) => {}
                None => *bound = Some(did.to_string()),
            }
        }

        let (private_type, private_key) =
            KeyMultibaseCodec::decode_private_with_type(&key.private_key_multibase)?;
        let private_key = Zeroizing::new(private_key);
        let (public_type, public_key) =
            KeyMultibaseCodec::decode_with_type(&key.public_key_multibase)?;
        if private_type != key.key_type || public_type != key.key_type {
            return Err(KeyManagerError::InvalidKey(format!(
                "{}: key material doesn't match key type {}",
                key.key_id, key.key_type
            )));
        }
        let derived = provider_for(key.key_type).key_pair_from_private_key(&private_key)?;
        if derived.public_key != public_key {
            return Err(KeyManagerError::InvalidKey(format!(
                "{}: public key doesn't match private key",
                key.key_id
            )));
        }

        debug!(key_id = %key.key_id, "imported key");
        self.store.save(key).await
    }

    /// Deletes a key, returning whether it existed
    pub async fn delete_key(&self, key_id: &str) -> Result<bool> {
        let existed = self.store.load(key_id).await?.is_some();
        if existed {
            self.store.clear(Some(key_id)).await?;
        }
        Ok(existed)
    }

    pub async fn get_stored_key(&self, key_id: &str) -> Result<Option<StoredKey>> {
        self.store.load(key_id).await
    }

    /// Removes every key and unbinds the DID
    pub async fn clear(&self) -> Result<()> {
        self.store.clear(None).await?;
        *self.did.write().await = None;
        Ok(())
    }
}

#[async_trait]
impl SignerInterface for KeyManager {
    async fn list_key_ids(&self) -> Result<Vec<String>> {
        self.store.list_key_ids().await
    }

    async fn sign_with_key_id(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>> {
        let key = self
            .store
            .load(key_id)
            .await?
            .ok_or_else(|| KeyManagerError::KeyNotFound(key_id.to_string()))?;
        let (key_type, private_key) =
            KeyMultibaseCodec::decode_private_with_type(&key.private_key_multibase)?;
        let private_key = Zeroizing::new(private_key);

        debug!(key_id, %key_type, "signing with managed key");
        Ok(provider_for(key_type).sign(data, &private_key)?)
    }

    async fn can_sign_with_key_id(&self, key_id: &str) -> bool {
        matches!(self.store.load(key_id).await, Ok(Some(_)))
    }

    async fn get_did(&self) -> Result<String> {
        self.did().await.ok_or(KeyManagerError::DidNotSet)
    }

    async fn get_key_info(&self, key_id: &str) -> Option<KeyInfo> {
        let key = self.store.load(key_id).await.ok()??;
        let (key_type, public_key) =
            KeyMultibaseCodec::decode_with_type(&key.public_key_multibase).ok()?;
        Some(KeyInfo {
            key_type,
            public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generate_requires_did() {
        let manager = KeyManager::with_memory_store();
        assert!(matches!(
            manager.generate_key(None, None).await,
            Err(KeyManagerError::DidNotSet)
        ));
    }

    #[tokio::test]
    async fn generate_and_sign() {
        let manager = KeyManager::with_memory_store();
        manager.set_did("did:example:alice").await.unwrap();

        let key = manager
            .generate_key(Some("key-1"), Some(KeyType::Secp256k1))
            .await
            .unwrap();
        assert_eq!(key.key_id, "did:example:alice#key-1");
        assert!(matches!(
            manager.generate_key(Some("key-1"), None).await,
            Err(KeyManagerError::KeyExists(_))
        ));

        let signature = manager
            .sign_with_key_id(b"payload", &key.key_id)
            .await
            .unwrap();
        let info = manager.get_key_info(&key.key_id).await.unwrap();
        assert_eq!(info.key_type, KeyType::Secp256k1);
        assert!(provider_for(KeyType::Secp256k1).verify(b"payload", &signature, &info.public_key));

        assert!(manager.can_sign_with_key_id(&key.key_id).await);
        assert!(manager.delete_key(&key.key_id).await.unwrap());
        assert!(!manager.can_sign_with_key_id(&key.key_id).await);
        assert!(!manager.delete_key(&key.key_id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_key_error_names_key() {
        let manager = KeyManager::with_memory_store();
        let err = manager
            .sign_with_key_id(b"payload", "did:example:alice#missing")
            .await
            .unwrap_err();
        assert!(
            matches!(err, KeyManagerError::KeyNotFound(ref id) if id == "did:example:alice#missing")
        );
    }

    #[tokio::test]
    async fn import_binds_and_rejects_conflicts() {
        let (source, key_id) = KeyManager::create_with_did_key(KeyType::Ed25519).await.unwrap();
        let key = source.get_stored_key(&key_id).await.unwrap().unwrap();

        let manager = KeyManager::with_memory_store();
        manager.import_key(key.clone()).await.unwrap();
        assert_eq!(manager.did().await.as_deref(), Some(key.did()));

        let mut foreign = key.clone();
        foreign.key_id = "did:example:mallory#account-key".into();
        assert!(matches!(
            manager.import_key(foreign).await,
            Err(KeyManagerError::DidMismatch { .. })
        ));

        let mut mismatched = key;
        let other = provider_for(KeyType::Ed25519).generate_key_pair().unwrap();
        mismatched.public_key_multibase =
            KeyMultibaseCodec::encode_with_type(&other.public_key, KeyType::Ed25519);
        assert!(matches!(
            manager.import_key(mismatched).await,
            Err(KeyManagerError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn did_key_bootstrap() {
        let (manager, key_id) = KeyManager::create_with_did_key(KeyType::P256).await.unwrap();
        let did = manager.get_did().await.unwrap();
        assert!(did.starts_with("did:key:zDn"));
        assert_eq!(key_id, format!("{did}#account-key"));
        assert_eq!(manager.list_key_ids().await.unwrap(), vec![key_id]);
    }
}
