//! Uniform signing capability
//!
//! Everything that signs on behalf of a DID implements [SignerInterface]:
//! the [KeyManager](crate::KeyManager), the in-memory [MemorySigner](memory::MemorySigner),
//! and anything an embedding application provides (a wallet, an HSM).

use async_trait::async_trait;
use nuwa_crypto::KeyType;

use crate::errors::Result;

pub mod chain;
pub mod memory;

/// Public information about a signing key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    pub key_type: KeyType,
    pub public_key: Vec<u8>,
}

#[async_trait]
pub trait SignerInterface: Send + Sync {
    /// Full ids (`did#fragment`) of every key this signer can use
    async fn list_key_ids(&self) -> Result<Vec<String>>;

    /// Signs `data` with the named key
    ///
    /// Fails with [KeyNotFound](crate::KeyManagerError::KeyNotFound) naming the
    /// key id if the key is unknown.
    async fn sign_with_key_id(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>>;

    async fn can_sign_with_key_id(&self, key_id: &str) -> bool;

    /// The DID this signer acts for
    async fn get_did(&self) -> Result<String>;

    async fn get_key_info(&self, key_id: &str) -> Option<KeyInfo>;
}
