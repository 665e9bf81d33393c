/*!
 * Local key management for a single DID.
 *
 * A [KeyStore] persists [StoredKey] records, the [KeyManager] generates,
 * imports and signs with them, and [SignerInterface] is the uniform signing
 * capability the rest of the kit consumes. Private key material never leaves
 * the store through these APIs.
 */

pub mod errors;
pub mod key_manager;
pub mod key_store;
pub mod signer;

pub use errors::{KeyManagerError, Result};
pub use key_manager::KeyManager;
pub use key_store::{KeyStore, MemoryKeyStore, StoredKey};
pub use signer::{
    KeyInfo, SignerInterface,
    chain::{ChainSigner, DidAccountSigner},
    memory::MemorySigner,
};
