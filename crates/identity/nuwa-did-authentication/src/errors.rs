/*!
 * DIDAuth Errors
 */

use nuwa_key_manager::KeyManagerError;
use nuwa_vdr::VDRError;
use thiserror::Error;

/// DIDAuth Errors
///
/// Verification failures on attacker supplied input are always one of these,
/// never a panic.
#[derive(Error, Debug)]
pub enum DIDAuthError {
    /// Missing or wrong scheme token
    #[error("Invalid authorization header: {0}")]
    InvalidHeader(String),

    /// base64url or JSON decoding failed
    #[error("Couldn't decode authorization header: {0}")]
    Decode(String),

    /// The payload decoded but isn't a well formed signed object
    #[error("Invalid signed payload: {0}")]
    InvalidPayload(String),

    #[error("Timestamp {timestamp} is outside the allowed clock skew of {max_skew}s (now {now})")]
    TimestampOutOfRange {
        timestamp: i64,
        now: i64,
        max_skew: u64,
    },

    #[error("Nonce {nonce} was already used by {did}")]
    NonceReplayed { did: String, nonce: String },

    #[error("DID resolution failed: {0}")]
    Resolution(String),

    #[error("DID Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Key {key_id} not found in DID Document of {did}")]
    KeyNotFound { did: String, key_id: String },

    #[error("Key {key_id} is not listed in authentication")]
    KeyNotAuthorized { key_id: String },

    #[error("Invalid public key for {key_id}: {reason}")]
    InvalidKey { key_id: String, reason: String },

    #[error("Signature verification failed for key {key_id}")]
    SignatureMismatch { key_id: String },

    #[error("Canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("Signer error: {0}")]
    Signer(#[from] KeyManagerError),
}

pub type Result<T> = std::result::Result<T, DIDAuthError>;

impl From<VDRError> for DIDAuthError {
    fn from(error: VDRError) -> Self {
        DIDAuthError::Resolution(error.to_string())
    }
}
