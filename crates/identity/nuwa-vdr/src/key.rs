//! `did:key` registry
//!
//! A `did:key` document is derived from the public key embedded in the
//! identifier. There is no ledger behind it: resolution synthesizes the
//! canonical document and caches it, and mutations are applied to the cached
//! copy only. Useful for tests and for bootstrapping identities.
//!
//! The cache is guarded by a single lock held for the whole of each mutation,
//! so mutations through one [KeyVDR] are serialized. Separate [KeyVDR]
//! instances don't share state.

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use nuwa_crypto::{KeyMultibaseCodec, did_key_from_public_key};
use nuwa_did_common::{
    Document, Service, VerificationMethod, VerificationRelationship, did_key_document,
    did_key_public_key,
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    base::{
        apply_add_service, apply_add_verification_method, apply_remove_service,
        apply_remove_verification_method, apply_update_controller, apply_update_relationships,
        authorize, validate_did_method, validate_document_for_store,
    },
    errors::{Result, VDRError},
    types::{DIDCreationRequest, DIDCreationResult, MutationOptions, Operation},
    vdr::VDR,
};

const METHOD: &str = "key";

/// The primary verification method must carry the key embedded in the DID
fn check_embedded_key(document: &Document) -> Result<()> {
    let embedded = did_key_public_key(&document.id)?;
    let primary = document
        .primary_verification_method()
        .ok_or_else(|| VDRError::InvalidDocument(vec!["no verification method".to_string()]))?;
    if primary.public_key()? != embedded {
        return Err(VDRError::Validation(format!(
            "{} doesn't carry the key embedded in {}",
            primary.id, document.id
        )));
    }
    Ok(())
}

/// Configuration for [KeyVDR]
///
/// Use the [KeyVDRConfigBuilder] to create a new configuration.
#[derive(Clone, Debug, Default)]
pub struct KeyVDRConfig {
    pub(crate) allow_idempotent_mutations: bool,
}

/// - allow_idempotent_mutations: adding an id that already exists or removing one that
///   doesn't succeeds without changing anything (default: false)
#[derive(Default)]
pub struct KeyVDRConfigBuilder {
    allow_idempotent_mutations: bool,
}

impl KeyVDRConfigBuilder {
    /// Relaxes duplicate-add and missing-remove failures into no-op successes.
    /// Meant for repeatable test fixtures.
    /// Default: false
    pub fn with_idempotent_mutations(mut self, allow: bool) -> Self {
        self.allow_idempotent_mutations = allow;
        self
    }

    pub fn build(self) -> KeyVDRConfig {
        KeyVDRConfig {
            allow_idempotent_mutations: self.allow_idempotent_mutations,
        }
    }
}

#[derive(Default)]
pub struct KeyVDR {
    config: KeyVDRConfig,
    documents: RwLock<HashMap<String, Document>>,
}

impl KeyVDR {
    pub fn new(config: KeyVDRConfig) -> Self {
        KeyVDR {
            config,
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Drops every cached document
    pub async fn reset(&self) {
        self.documents.write().await.clear();
    }

    async fn mutate<F>(
        &self,
        did: &str,
        options: &MutationOptions,
        operation: Operation,
        apply: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Document, &str) -> Result<Document> + Send,
    {
        validate_did_method(did, METHOD)?;

        let mut documents = self.documents.write().await;
        let current = match documents.get(did) {
            Some(document) => document.clone(),
            None => did_key_document(did)?,
        };
        let key_id = authorize(&current, options, operation).await?;

        match apply(&current, &key_id) {
            Ok(updated) => {
                documents.insert(did.to_string(), updated);
                debug!(%did, %operation, "did:key document updated");
                Ok(true)
            }
            Err(err)
                if self.config.allow_idempotent_mutations && err.is_idempotence_violation() =>
            {
                debug!(%did, %operation, "idempotent no-op: {err}");
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl VDR for KeyVDR {
    fn method(&self) -> &str {
        METHOD
    }

    async fn resolve(&self, did: &str) -> Result<Option<Document>> {
        validate_did_method(did, METHOD)?;

        if let Some(document) = self.documents.read().await.get(did) {
            return Ok(Some(document.clone()));
        }

        let synthesized = did_key_document(did)?;
        let mut documents = self.documents.write().await;
        let document = documents.entry(did.to_string()).or_insert(synthesized);
        Ok(Some(document.clone()))
    }

    /// True once the DID has been stored, created or resolved through this registry
    async fn exists(&self, did: &str) -> Result<bool> {
        validate_did_method(did, METHOD)?;
        Ok(self.documents.read().await.contains_key(did))
    }

    async fn store(&self, document: &Document, _options: Option<&MutationOptions>) -> Result<bool> {
        validate_document_for_store(document, METHOD)?;
        check_embedded_key(document)?;

        let mut documents = self.documents.write().await;
        if documents.contains_key(&document.id) {
            return Err(VDRError::AlreadyExists(document.id.clone()));
        }
        documents.insert(document.id.clone(), document.clone());
        info!(did = %document.id, "stored did:key document");
        Ok(true)
    }

    async fn create(
        &self,
        request: &DIDCreationRequest,
        _options: Option<&MutationOptions>,
    ) -> Result<DIDCreationResult> {
        let (key_type, public_key) =
            KeyMultibaseCodec::decode_with_type(&request.public_key_multibase)?;
        let did = did_key_from_public_key(key_type, &public_key);

        if let Some(preferred) = &request.preferred_did
            && *preferred != did
        {
            return Err(VDRError::Validation(format!(
                "preferred DID {preferred} doesn't match the key derived {did}"
            )));
        }

        let mut document = did_key_document(&did)?;
        if let Some(controller) = &request.controller {
            document.controller = vec![controller.clone()];
        }
        if let Some(relationships) = &request.initial_relationships {
            let key_id = document.verification_method[0].id.clone();
            for relationship in VerificationRelationship::ALL {
                if !relationships.contains(&relationship) {
                    document.remove_from_relationship(&key_id, relationship);
                }
            }
        }

        let mut documents = self.documents.write().await;
        if documents.contains_key(&did) {
            return Err(VDRError::AlreadyExists(did));
        }
        documents.insert(did.clone(), document.clone());
        info!(%did, "created did:key");

        Ok(DIDCreationResult {
            did,
            document: Some(document),
            transaction_hash: None,
        })
    }

    async fn add_verification_method(
        &self,
        did: &str,
        verification_method: &VerificationMethod,
        relationships: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::AddVerificationMethod, |doc, _| {
            apply_add_verification_method(doc, verification_method, relationships)
        })
        .await
    }

    async fn remove_verification_method(
        &self,
        did: &str,
        id: &str,
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(
            did,
            options,
            Operation::RemoveVerificationMethod,
            |doc, key_id| apply_remove_verification_method(doc, id, key_id),
        )
        .await
    }

    async fn add_service(
        &self,
        did: &str,
        service: &Service,
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::AddService, |doc, _| {
            apply_add_service(doc, service)
        })
        .await
    }

    async fn remove_service(&self, did: &str, id: &str, options: &MutationOptions) -> Result<bool> {
        self.mutate(did, options, Operation::RemoveService, |doc, _| {
            apply_remove_service(doc, id)
        })
        .await
    }

    async fn update_relationships(
        &self,
        did: &str,
        id: &str,
        add: &[VerificationRelationship],
        remove: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::UpdateRelationships, |doc, _| {
            apply_update_relationships(doc, id, add, remove)
        })
        .await
    }

    async fn update_controller(
        &self,
        did: &str,
        controller: &[String],
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::UpdateController, |doc, _| {
            apply_update_controller(doc, controller)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuwa_crypto::{KeyType, provider_for};
    use nuwa_key_manager::{KeyManager, MemorySigner, SignerInterface};
    use std::sync::Arc;

    async fn identity() -> (Arc<KeyManager>, String, String) {
        let (manager, key_id) = KeyManager::create_with_did_key(KeyType::Ed25519).await.unwrap();
        let did = manager.did().await.unwrap();
        (Arc::new(manager), did, key_id)
    }

    fn operational_key(did: &str, fragment: &str) -> (VerificationMethod, nuwa_crypto::KeyPair) {
        let key_pair = provider_for(KeyType::Ed25519).generate_key_pair().unwrap();
        let vm = VerificationMethod::from_public_key(
            format!("{did}#{fragment}"),
            did,
            KeyType::Ed25519,
            &key_pair.public_key,
        );
        (vm, key_pair)
    }

    #[tokio::test]
    async fn resolve_synthesizes_and_caches() {
        let vdr = KeyVDR::default();
        let (_, did, key_id) = identity().await;

        assert!(!vdr.exists(&did).await.unwrap());
        let document = vdr.resolve(&did).await.unwrap().unwrap();
        assert_eq!(document.verification_method[0].id, key_id);
        assert!(vdr.exists(&did).await.unwrap());

        assert!(matches!(
            vdr.resolve("did:web:example.com").await,
            Err(VDRError::MethodMismatch { .. })
        ));
        assert!(vdr.resolve("did:key:zBogus").await.is_err());
    }

    #[tokio::test]
    async fn store_rejects_existing() {
        let vdr = KeyVDR::default();
        let (_, did, _) = identity().await;
        let document = did_key_document(&did).unwrap();

        assert!(vdr.store(&document, None).await.unwrap());
        assert!(matches!(
            vdr.store(&document, None).await,
            Err(VDRError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn store_rejects_foreign_primary_key() {
        let vdr = KeyVDR::default();
        let (_, did, key_id) = identity().await;
        let (foreign, _) = operational_key(&did, "account-key");
        assert_eq!(foreign.id, key_id);

        let mut document = did_key_document(&did).unwrap();
        document.verification_method[0] = foreign;
        assert!(matches!(
            vdr.store(&document, None).await,
            Err(VDRError::Validation(_))
        ));
        assert!(!vdr.exists(&did).await.unwrap());

        let resolved = vdr.resolve(&did).await.unwrap().unwrap();
        assert_eq!(resolved, did_key_document(&did).unwrap());
    }

    #[tokio::test]
    async fn create_from_multibase() {
        let vdr = KeyVDR::default();
        let key_pair = provider_for(KeyType::Secp256k1).generate_key_pair().unwrap();
        let multibase =
            KeyMultibaseCodec::encode_with_type(&key_pair.public_key, KeyType::Secp256k1);

        let mut request = DIDCreationRequest::new(&multibase);
        request.initial_relationships = Some(vec![VerificationRelationship::Authentication]);
        let result = vdr.create(&request, None).await.unwrap();

        assert!(result.did.starts_with("did:key:zQ3s"));
        let document = vdr.resolve(&result.did).await.unwrap().unwrap();
        assert_eq!(document.authentication.len(), 1);
        assert!(document.capability_delegation.is_empty());

        assert!(matches!(
            vdr.create(&request, None).await,
            Err(VDRError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn add_and_remove_keys() {
        let vdr = KeyVDR::default();
        let (manager, did, _) = identity().await;
        let options = MutationOptions::new(manager);
        let (vm, _) = operational_key(&did, "ops");

        assert!(
            vdr.add_verification_method(
                &did,
                &vm,
                &[VerificationRelationship::Authentication],
                &options
            )
            .await
            .unwrap()
        );
        let document = vdr.resolve(&did).await.unwrap().unwrap();
        assert_eq!(
            document.relationships_of(&vm.id),
            vec![VerificationRelationship::Authentication]
        );

        assert!(matches!(
            vdr.add_verification_method(&did, &vm, &[], &options).await,
            Err(VDRError::DuplicateId(_))
        ));

        assert!(vdr.remove_verification_method(&did, "#ops", &options).await.unwrap());
        let document = vdr.resolve(&did).await.unwrap().unwrap();
        assert_eq!(document.verification_method.len(), 1);
        assert!(document.authentication.iter().all(|id| *id != vm.id));
    }

    #[tokio::test]
    async fn operational_key_lacks_invocation() {
        let vdr = KeyVDR::default();
        let (manager, did, _) = identity().await;
        let (vm, key_pair) = operational_key(&did, "delegate");
        vdr.add_verification_method(
            &did,
            &vm,
            &[VerificationRelationship::CapabilityDelegation],
            &MutationOptions::new(manager),
        )
        .await
        .unwrap();

        let signer: Arc<dyn SignerInterface> =
            Arc::new(MemorySigner::new(&did).with_key(&vm.id, key_pair).unwrap());
        let options = MutationOptions::new(signer).with_key_id(&vm.id);
        let err = vdr
            .add_service(
                &did,
                &Service::new("#svc", "LinkedDomains", "https://example.com"),
                &options,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, VDRError::PermissionDenied { .. }));
        assert!(err.to_string().contains("capabilityInvocation"));

        let document = vdr.resolve(&did).await.unwrap().unwrap();
        assert!(document.service.is_empty());
    }

    #[tokio::test]
    async fn idempotent_mutations_flag() {
        let (manager, did, _) = identity().await;
        let options = MutationOptions::new(manager);

        let strict = KeyVDR::default();
        assert!(matches!(
            strict.remove_service(&did, "#missing", &options).await,
            Err(VDRError::ServiceNotFound { .. })
        ));

        let relaxed = KeyVDR::new(
            KeyVDRConfigBuilder::default()
                .with_idempotent_mutations(true)
                .build(),
        );
        assert!(relaxed.remove_service(&did, "#missing", &options).await.unwrap());
        assert!(
            relaxed
                .remove_verification_method(&did, "#missing", &options)
                .await
                .unwrap()
        );

        let service = Service::new("#svc", "LinkedDomains", "https://example.com");
        assert!(relaxed.add_service(&did, &service, &options).await.unwrap());
        assert!(relaxed.add_service(&did, &service, &options).await.unwrap());
        let document = relaxed.resolve(&did).await.unwrap().unwrap();
        assert_eq!(document.service.len(), 1);

        // Validation failures are never relaxed
        assert!(
            relaxed
                .update_controller(&did, &[], &options)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn update_relationships_and_controller() {
        let vdr = KeyVDR::default();
        let (manager, did, key_id) = identity().await;
        let options = MutationOptions::new(manager);

        vdr.update_relationships(
            &did,
            &key_id,
            &[],
            &[VerificationRelationship::KeyAgreement],
            &options,
        )
        .await
        .unwrap();
        let document = vdr.resolve(&did).await.unwrap().unwrap();
        assert!(document.key_agreement.is_empty());
        assert_eq!(document.authentication, vec![key_id]);

        vdr.update_controller(&did, &["did:example:bob".to_string()], &options)
            .await
            .unwrap();
        let document = vdr.resolve(&did).await.unwrap().unwrap();
        assert_eq!(document.controller, vec!["did:example:bob"]);
    }
}
