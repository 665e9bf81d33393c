/*!
 * Identity Kit Errors
 */

use nuwa_crypto::CryptoError;
use nuwa_did_authentication::DIDAuthError;
use nuwa_did_common::DocumentError;
use nuwa_key_manager::KeyManagerError;
use nuwa_vdr::VDRError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityKitError {
    /// Missing signer, missing registry or otherwise unusable setup
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("DID Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Key {key_id} not found in DID Document of {did}")]
    KeyNotFound { did: String, key_id: String },

    /// The registry processed the request but didn't apply it
    #[error("{operation} was not applied by the registry for {did}")]
    PublishRejected { did: String, operation: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("CADOP error: {0}")]
    Cadop(String),

    #[error("VDR error: {0}")]
    VDR(#[from] VDRError),

    #[error("Signer error: {0}")]
    Signer(#[from] KeyManagerError),

    #[error("DIDAuth error: {0}")]
    DIDAuth(#[from] DIDAuthError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

pub type Result<T> = std::result::Result<T, IdentityKitError>;
