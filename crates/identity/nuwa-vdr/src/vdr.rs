use async_trait::async_trait;
use nuwa_did_common::{Document, Service, VerificationMethod, VerificationRelationship};

use crate::{
    errors::{Result, VDRError},
    types::{CADOPCreationRequest, DIDCreationRequest, DIDCreationResult, MutationOptions},
};

/// A Verifiable Data Registry for one DID method
///
/// Only [VDR::method] and [VDR::resolve] are required. Every mutation has a
/// default body failing with [VDRError::NotImplemented], so a read-only
/// registry stays small.
///
/// Mutations return `Ok(true)` when the registry accepted the change and
/// `Ok(false)` when it declined without an error (a reverted transaction for
/// example). Validation, permission and transport failures are errors.
#[async_trait]
pub trait VDR: Send + Sync {
    /// DID method name handled by this registry (`key`, `web`, `rooch`)
    fn method(&self) -> &str;

    /// Resolves a DID. `Ok(None)` when the registry holds no document for it.
    async fn resolve(&self, did: &str) -> Result<Option<Document>>;

    async fn exists(&self, did: &str) -> Result<bool> {
        Ok(self.resolve(did).await?.is_some())
    }

    /// Publishes a brand new document. Reserved for first-time creation.
    async fn store(&self, document: &Document, options: Option<&MutationOptions>) -> Result<bool> {
        let _ = (document, options);
        Err(self.not_implemented("store"))
    }

    async fn create(
        &self,
        request: &DIDCreationRequest,
        options: Option<&MutationOptions>,
    ) -> Result<DIDCreationResult> {
        let _ = (request, options);
        Err(self.not_implemented("create"))
    }

    async fn create_via_cadop(
        &self,
        request: &CADOPCreationRequest,
        options: &MutationOptions,
    ) -> Result<DIDCreationResult> {
        let _ = (request, options);
        Err(self.not_implemented("createViaCADOP"))
    }

    async fn add_verification_method(
        &self,
        did: &str,
        verification_method: &VerificationMethod,
        relationships: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        let _ = (did, verification_method, relationships, options);
        Err(self.not_implemented("addVerificationMethod"))
    }

    async fn remove_verification_method(
        &self,
        did: &str,
        id: &str,
        options: &MutationOptions,
    ) -> Result<bool> {
        let _ = (did, id, options);
        Err(self.not_implemented("removeVerificationMethod"))
    }

    async fn add_service(
        &self,
        did: &str,
        service: &Service,
        options: &MutationOptions,
    ) -> Result<bool> {
        let _ = (did, service, options);
        Err(self.not_implemented("addService"))
    }

    async fn remove_service(&self, did: &str, id: &str, options: &MutationOptions) -> Result<bool> {
        let _ = (did, id, options);
        Err(self.not_implemented("removeService"))
    }

    /// Adds `id` to every relationship in `add` and removes it from every
    /// relationship in `remove`
    async fn update_relationships(
        &self,
        did: &str,
        id: &str,
        add: &[VerificationRelationship],
        remove: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        let _ = (did, id, add, remove, options);
        Err(self.not_implemented("updateRelationships"))
    }

    async fn update_controller(
        &self,
        did: &str,
        controller: &[String],
        options: &MutationOptions,
    ) -> Result<bool> {
        let _ = (did, controller, options);
        Err(self.not_implemented("updateController"))
    }

    #[doc(hidden)]
    fn not_implemented(&self, operation: &'static str) -> VDRError {
        VDRError::NotImplemented {
            method: self.method().to_string(),
            operation,
        }
    }
}
