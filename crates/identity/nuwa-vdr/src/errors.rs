use nuwa_crypto::CryptoError;
use nuwa_did_common::{DIDError, DocumentError, VerificationRelationship};
use nuwa_key_manager::KeyManagerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VDRError {
    #[error("{operation} is not implemented by the did:{method} registry")]
    NotImplemented {
        method: String,
        operation: &'static str,
    },

    #[error("No VDR registered for method: {0}")]
    NoVdrForMethod(String),

    #[error("Invalid DID: {0}")]
    InvalidDID(String),

    #[error("DID {did} doesn't use method {expected}")]
    MethodMismatch { expected: String, did: String },

    #[error("DID document not found: {0}")]
    DocumentNotFound(String),

    #[error("DID document already exists: {0}")]
    AlreadyExists(String),

    #[error("Duplicate id {0}")]
    DuplicateId(String),

    #[error("Verification method {key_id} not found in {did}")]
    VerificationMethodNotFound { did: String, key_id: String },

    #[error("Service {service_id} not found in {did}")]
    ServiceNotFound { did: String, service_id: String },

    #[error("Permission denied for {did}: key {key_id} doesn't hold {relationship}")]
    PermissionDenied {
        did: String,
        key_id: String,
        relationship: VerificationRelationship,
    },

    #[error("No usable signing key for {0}")]
    NoSigningKey(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid DID document: {}", .0.join("; "))]
    InvalidDocument(Vec<String>),

    #[error("No upload handler configured for {0}")]
    UploadHandlerMissing(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("BCS error: {0}")]
    Bcs(String),

    #[error("Signer error: {0}")]
    Signer(#[from] KeyManagerError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl VDRError {
    /// Errors a duplicate-add or missing-remove produces
    pub fn is_idempotence_violation(&self) -> bool {
        matches!(
            self,
            VDRError::DuplicateId(_)
                | VDRError::VerificationMethodNotFound { .. }
                | VDRError::ServiceNotFound { .. }
        )
    }
}

impl From<DIDError> for VDRError {
    fn from(err: DIDError) -> Self {
        VDRError::InvalidDID(err.to_string())
    }
}

impl From<bcs::Error> for VDRError {
    fn from(err: bcs::Error) -> Self {
        VDRError::Bcs(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VDRError>;
