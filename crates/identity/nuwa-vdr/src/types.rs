//! Request, result and option types shared by all registries

use std::{fmt, sync::Arc};

use nuwa_did_common::{Document, VerificationRelationship};
use nuwa_key_manager::SignerInterface;

use crate::errors::{Result, VDRError};

/// Mutations and the relationship their signing key must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AddVerificationMethod,
    RemoveVerificationMethod,
    UpdateRelationships,
    UpdateController,
    AddService,
    RemoveService,
}

impl Operation {
    pub fn required_relationship(&self) -> VerificationRelationship {
        match self {
            Operation::AddService | Operation::RemoveService => {
                VerificationRelationship::CapabilityInvocation
            }
            _ => VerificationRelationship::CapabilityDelegation,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddVerificationMethod => "addVerificationMethod",
            Operation::RemoveVerificationMethod => "removeVerificationMethod",
            Operation::UpdateRelationships => "updateRelationships",
            Operation::UpdateController => "updateController",
            Operation::AddService => "addService",
            Operation::RemoveService => "removeService",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signing context for a mutation
#[derive(Clone)]
pub struct MutationOptions {
    pub signer: Arc<dyn SignerInterface>,
    /// Key to authorize with. Defaults to the first signer key present in the document.
    pub key_id: Option<String>,
}

impl MutationOptions {
    pub fn new(signer: Arc<dyn SignerInterface>) -> Self {
        MutationOptions {
            signer,
            key_id: None,
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Resolves the key that authorizes a mutation of `document`
    ///
    /// The key must be usable by the signer.
    pub async fn signing_key_id(&self, document: &Document) -> Result<String> {
        if let Some(key_id) = &self.key_id {
            let key_id = document.absolute_id(key_id);
            if !self.signer.can_sign_with_key_id(&key_id).await {
                return Err(VDRError::NoSigningKey(format!(
                    "signer can't use {key_id} for {}",
                    document.id
                )));
            }
            return Ok(key_id);
        }

        for key_id in self.signer.list_key_ids().await? {
            if document.find_verification_method(&key_id).is_some() {
                return Ok(key_id);
            }
        }
        Err(VDRError::NoSigningKey(document.id.clone()))
    }
}

impl fmt::Debug for MutationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationOptions")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// Request to create a new DID from a public key
#[derive(Debug, Clone, Default)]
pub struct DIDCreationRequest {
    pub public_key_multibase: String,
    /// Verification method type, derived from the key when `None`
    pub key_type: Option<String>,
    /// Required by methods whose DID isn't derived from the key (did:web)
    pub preferred_did: Option<String>,
    pub controller: Option<String>,
    /// Relationships of the initial key, all five when `None`
    pub initial_relationships: Option<Vec<VerificationRelationship>>,
}

impl DIDCreationRequest {
    pub fn new(public_key_multibase: impl Into<String>) -> Self {
        DIDCreationRequest {
            public_key_multibase: public_key_multibase.into(),
            ..Default::default()
        }
    }
}

/// Request to create a DID through a custodian (CADOP)
#[derive(Debug, Clone)]
pub struct CADOPCreationRequest {
    /// The user's `did:key`
    pub user_did_key: String,
    pub custodian_service_public_key: String,
    pub custodian_service_vm_type: String,
}

#[derive(Debug, Clone)]
pub struct DIDCreationResult {
    pub did: String,
    pub document: Option<Document>,
    /// Registry specific reference, the transaction hash for on-chain methods
    pub transaction_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuwa_crypto::KeyType;
    use nuwa_did_common::did_key_document;
    use nuwa_key_manager::KeyManager;

    #[test]
    fn required_relationships() {
        assert_eq!(
            Operation::AddService.required_relationship(),
            VerificationRelationship::CapabilityInvocation
        );
        assert_eq!(
            Operation::RemoveVerificationMethod.required_relationship(),
            VerificationRelationship::CapabilityDelegation
        );
    }

    #[tokio::test]
    async fn default_signing_key() {
        let (manager, key_id) = KeyManager::create_with_did_key(KeyType::Ed25519).await.unwrap();
        let document = did_key_document(&manager.did().await.unwrap()).unwrap();
        let options = MutationOptions::new(Arc::new(manager));
        assert_eq!(options.signing_key_id(&document).await.unwrap(), key_id);

        let options = options.with_key_id("#account-key");
        assert_eq!(options.signing_key_id(&document).await.unwrap(), key_id);

        let options = options.with_key_id("#other");
        assert!(matches!(
            options.signing_key_id(&document).await,
            Err(VDRError::NoSigningKey(_))
        ));
    }
}
