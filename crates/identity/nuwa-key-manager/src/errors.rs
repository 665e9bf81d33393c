use nuwa_crypto::CryptoError;
use nuwa_did_common::DocumentError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyManagerError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Key already exists: {0}")]
    KeyExists(String),

    #[error("No DID is bound to the key manager")]
    DidNotSet,

    #[error("Key {key_id} does not belong to DID {did}")]
    DidMismatch { did: String, key_id: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Key store error: {0}")]
    Store(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),
}

pub type Result<T> = std::result::Result<T, KeyManagerError>;
