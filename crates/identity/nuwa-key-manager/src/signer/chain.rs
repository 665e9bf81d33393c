//! Adapter from [SignerInterface] to a chain-native account signer

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use nuwa_crypto::KeyType;
use nuwa_did_common::{DID, DIDError, DIDMethod, DocumentError, RoochAddress};

use crate::{
    errors::{KeyManagerError, Result},
    signer::SignerInterface,
};

/// Signer interface expected by the Rooch transaction client
#[async_trait]
pub trait ChainSigner: Send + Sync {
    /// Account address transactions are sent from
    fn address(&self) -> RoochAddress;

    fn key_type(&self) -> KeyType;

    fn public_key(&self) -> &[u8];

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Exposes a DID bound key of any [SignerInterface] as a [ChainSigner]
///
/// The account address is the method-specific identifier of the signer's
/// `did:rooch` DID.
pub struct DidAccountSigner {
    inner: Arc<dyn SignerInterface>,
    key_id: String,
    key_type: KeyType,
    public_key: Vec<u8>,
    address: RoochAddress,
}

impl DidAccountSigner {
    /// Binds `key_id`, or the first key of the signer when `None`
    pub async fn new(inner: Arc<dyn SignerInterface>, key_id: Option<&str>) -> Result<Self> {
        let did = DID::from_str(&inner.get_did().await?).map_err(DocumentError::from)?;
        if did.method() != &DIDMethod::Rooch {
            let err = DIDError::InvalidMethod(did.method().to_string());
            return Err(DocumentError::from(err).into());
        }
        let address = RoochAddress::from_str(did.identifier())?;

        let key_id = match key_id {
            Some(key_id) => key_id.to_string(),
            None => inner
                .list_key_ids()
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| KeyManagerError::KeyNotFound(format!("{did}#<any>")))?,
        };
        let info = inner
            .get_key_info(&key_id)
            .await
            .ok_or_else(|| KeyManagerError::KeyNotFound(key_id.clone()))?;

        Ok(DidAccountSigner {
            inner,
            key_id,
            key_type: info.key_type,
            public_key: info.public_key,
            address,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[async_trait]
impl ChainSigner for DidAccountSigner {
    fn address(&self) -> RoochAddress {
        self.address
    }

    fn key_type(&self) -> KeyType {
        self.key_type
    }

    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.inner.sign_with_key_id(message, &self.key_id).await
    }
}
