use thiserror::Error;

use crate::DIDError;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid DID: {0}")]
    DID(#[from] DIDError),

    #[error("Key material error: {0}")]
    KeyMaterial(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] nuwa_crypto::CryptoError),

    #[error("Invalid address: {0}")]
    Address(String),
}
