//! `did:rooch` registry
//!
//! DID documents live on chain as objects of the `did` Move module. Reads go
//! straight to object state; writes are entry function transactions signed by
//! the DID account, one per change, each awaited until executed.
//!
//! The permission check done here is advisory: the module enforces the real
//! rule and its execution status is authoritative.

use std::{future::Future, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use nuwa_crypto::KeyMultibaseCodec;
use nuwa_did_common::{
    DID, Document, RoochAddress, Service, VerificationMethod, VerificationRelationship,
};
use nuwa_key_manager::{ChainSigner, DidAccountSigner};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    base::{
        apply_add_service, apply_add_verification_method, apply_remove_service,
        apply_remove_verification_method, apply_update_controller, apply_update_relationships,
        validate_did_method, validate_key_permission,
    },
    errors::{Result, VDRError},
    types::{
        CADOPCreationRequest, DIDCreationRequest, DIDCreationResult, MutationOptions, Operation,
    },
    vdr::VDR,
};

pub mod client;
pub mod types;

#[cfg(test)]
mod mock;

pub use client::{ExecutionStatus, FunctionCall, RoochClient, TransactionEvent, TransactionOutcome};
pub use types::{DIDCreatedEvent, MoveDIDDocument, ObjectID, did_document_object_id};

const METHOD: &str = "rooch";
const DID_MODULE: &str = "did";

pub mod entry {
    //! Entry and view functions of the `did` module
    pub const CREATE_DID_FOR_SELF: &str = "create_did_object_for_self_entry";
    pub const CREATE_DID_VIA_CADOP: &str = "create_did_object_via_cadop_with_did_key_entry";
    pub const ADD_VERIFICATION_METHOD: &str = "add_verification_method_entry";
    pub const REMOVE_VERIFICATION_METHOD: &str = "remove_verification_method_entry";
    pub const ADD_SERVICE: &str = "add_service_entry";
    pub const ADD_SERVICE_WITH_PROPERTIES: &str = "add_service_with_properties_entry";
    pub const REMOVE_SERVICE: &str = "remove_service_entry";
    pub const ADD_TO_RELATIONSHIP: &str = "add_to_verification_relationship_entry";
    pub const REMOVE_FROM_RELATIONSHIP: &str = "remove_from_verification_relationship_entry";
    pub const UPDATE_CONTROLLER: &str = "update_controller_entry";
    pub const EXISTS_DID_FOR_ADDRESS: &str = "exists_did_for_address";
}

/// Configuration for [RoochVDR]
///
/// Use the [RoochVDRConfigBuilder] to create a new configuration.
#[derive(Clone, Debug)]
pub struct RoochVDRConfig {
    pub(crate) did_module_address: RoochAddress,
    pub(crate) network: String,
    pub(crate) timeout: Duration,
}

/// - did_module_address: address the `did` module is published at (default: 0x3)
/// - network: label used in logs (default: local)
/// - timeout: bound on every RPC call and transaction (default: 30 seconds)
pub struct RoochVDRConfigBuilder {
    did_module_address: RoochAddress,
    network: String,
    timeout: Duration,
}

impl Default for RoochVDRConfigBuilder {
    fn default() -> Self {
        let mut framework = [0u8; 32];
        framework[31] = 3;
        Self {
            did_module_address: RoochAddress(framework),
            network: "local".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl RoochVDRConfigBuilder {
    pub fn with_did_module_address(mut self, address: RoochAddress) -> Self {
        self.did_module_address = address;
        self
    }

    pub fn with_network(mut self, network: &str) -> Self {
        self.network = network.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> RoochVDRConfig {
        RoochVDRConfig {
            did_module_address: self.did_module_address,
            network: self.network,
            timeout: self.timeout,
        }
    }
}

pub struct RoochVDR {
    config: RoochVDRConfig,
    client: Arc<dyn RoochClient>,
}

/// Fragment of a `did#fragment` id
fn fragment_of(id: &str) -> Result<String> {
    id.split_once('#')
        .map(|(_, fragment)| fragment.to_string())
        .filter(|fragment| !fragment.is_empty())
        .ok_or_else(|| VDRError::Validation(format!("{id} has no fragment")))
}

/// Property values are strings on chain; other JSON values are stored as JSON text
fn property_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl RoochVDR {
    pub fn new(config: RoochVDRConfig, client: Arc<dyn RoochClient>) -> Self {
        RoochVDR { config, client }
    }

    fn parse(&self, did: &str) -> Result<(DID, RoochAddress)> {
        let parsed = validate_did_method(did, METHOD)?;
        let address = RoochAddress::from_str(parsed.identifier())
            .map_err(|err| VDRError::InvalidDID(format!("{did}: {err}")))?;
        Ok((parsed, address))
    }

    fn call(&self, function: &str) -> FunctionCall {
        FunctionCall::new(self.config.did_module_address, DID_MODULE, function)
    }

    async fn timed<T>(&self, what: &str, future: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.config.timeout, future)
            .await
            .map_err(|_| {
                warn!(network = %self.config.network, "{what} timed out");
                VDRError::Timeout(format!(
                    "{what} took longer than {}ms",
                    self.config.timeout.as_millis()
                ))
            })?
    }

    async fn submit(
        &self,
        did: &str,
        call: FunctionCall,
        signer: &DidAccountSigner,
    ) -> Result<TransactionOutcome> {
        let function = call.function_id();
        debug!(%did, %function, sender = %signer.address(), "submitting transaction");

        let outcome = self
            .timed(&function, self.client.sign_and_execute(call, signer))
            .await?;
        if outcome.is_executed() {
            info!(%did, %function, tx_hash = %outcome.tx_hash, "transaction executed");
        } else {
            warn!(
                %did,
                %function,
                tx_hash = %outcome.tx_hash,
                status = %outcome.status,
                "transaction not executed"
            );
        }
        Ok(outcome)
    }

    async fn chain_signer(&self, options: &MutationOptions) -> Result<DidAccountSigner> {
        Ok(DidAccountSigner::new(options.signer.clone(), options.key_id.as_deref()).await?)
    }

    /// Client-side approximation of the on-chain rule
    ///
    /// Passes when the signer is the DID account, a listed controller, or
    /// holds a key with the required relationship.
    fn check_permission(
        &self,
        document: &Document,
        signer: &DidAccountSigner,
        operation: Operation,
    ) -> Result<()> {
        let (_, did_address) = self.parse(&document.id)?;
        if signer.address() == did_address {
            return Ok(());
        }

        let signer_did = signer.address().to_did()?;
        if document.controller.iter().any(|c| *c == signer_did) {
            return Ok(());
        }

        let required = operation.required_relationship();
        validate_key_permission(document, signer.key_id(), required).map_err(|err| {
            warn!(
                did = %document.id,
                key_id = signer.key_id(),
                %operation,
                "permission check failed: {err}"
            );
            VDRError::PermissionDenied {
                did: document.id.clone(),
                key_id: signer.key_id().to_string(),
                relationship: required,
            }
        })
    }

    /// Resolves the current document and the signer allowed to change it
    async fn prepare(
        &self,
        did: &str,
        options: &MutationOptions,
        operation: Operation,
    ) -> Result<(Document, DidAccountSigner)> {
        let document = self
            .resolve(did)
            .await?
            .ok_or_else(|| VDRError::DocumentNotFound(did.to_string()))?;
        let signer = self.chain_signer(options).await?;
        self.check_permission(&document, &signer, operation)?;
        Ok((document, signer))
    }

    async fn execute(
        &self,
        did: &str,
        call: FunctionCall,
        signer: &DidAccountSigner,
    ) -> Result<bool> {
        Ok(self.submit(did, call, signer).await?.is_executed())
    }

    async fn created_did(&self, outcome: &TransactionOutcome) -> Result<DIDCreationResult> {
        if !outcome.is_executed() {
            return Err(VDRError::TransactionFailed(format!(
                "{}: {}",
                outcome.tx_hash, outcome.status
            )));
        }
        let event: DIDCreatedEvent = outcome
            .find_event(types::DID_CREATED_EVENT)?
            .ok_or_else(|| {
                VDRError::TransactionFailed(format!(
                    "{}: no DIDCreatedEvent emitted",
                    outcome.tx_hash
                ))
            })?;

        let did = event.did.to_string();
        let document = self.resolve(&did).await?;
        Ok(DIDCreationResult {
            did,
            document,
            transaction_hash: Some(outcome.tx_hash.clone()),
        })
    }
}

#[async_trait]
impl VDR for RoochVDR {
    fn method(&self) -> &str {
        METHOD
    }

    async fn resolve(&self, did: &str) -> Result<Option<Document>> {
        let (parsed, _) = self.parse(did)?;
        let object_id =
            did_document_object_id(parsed.identifier(), &self.config.did_module_address)?;
        debug!(%did, %object_id, "resolving did:rooch");

        let state = self
            .timed("get_object_state", self.client.get_object_state(&object_id))
            .await?;
        match state {
            None => Ok(None),
            Some(bytes) => {
                let record: MoveDIDDocument = bcs::from_bytes(&bytes)?;
                Ok(Some(record.into_document()))
            }
        }
    }

    async fn exists(&self, did: &str) -> Result<bool> {
        let (_, address) = self.parse(did)?;
        let call = self.call(entry::EXISTS_DID_FOR_ADDRESS).arg(&address)?;
        let values = self
            .timed(
                entry::EXISTS_DID_FOR_ADDRESS,
                self.client.execute_view_function(call),
            )
            .await?;
        let value = values.first().ok_or_else(|| {
            VDRError::Rpc(format!("{} returned no value", entry::EXISTS_DID_FOR_ADDRESS))
        })?;
        Ok(bcs::from_bytes::<bool>(value)?)
    }

    /// Registers the primary key of `document` for the signer's own account
    ///
    /// The document id must be the signer's DID. Further keys and services
    /// are added with the mutation operations.
    async fn store(&self, document: &Document, options: Option<&MutationOptions>) -> Result<bool> {
        let options = options.ok_or_else(|| {
            VDRError::NoSigningKey(format!("storing {} needs a signer", document.id))
        })?;
        let signer = self.chain_signer(options).await?;
        if signer.address().to_did()? != document.id {
            return Err(VDRError::Validation(format!(
                "{} can only be stored by its own account, not {}",
                document.id,
                signer.address()
            )));
        }
        if self.exists(&document.id).await? {
            return Err(VDRError::AlreadyExists(document.id.clone()));
        }

        let primary = document
            .primary_verification_method()
            .ok_or_else(|| VDRError::InvalidDocument(vec!["no verification method".to_string()]))?;
        let (key_type, public_key) = primary.public_key()?;
        if document.verification_method.len() > 1 || !document.service.is_empty() {
            warn!(did = %document.id, "only the primary key is registered at creation");
        }

        let call = self
            .call(entry::CREATE_DID_FOR_SELF)
            .arg(&KeyMultibaseCodec::encode_with_type(&public_key, key_type))?;
        self.execute(&document.id, call, &signer).await
    }

    async fn create(
        &self,
        request: &DIDCreationRequest,
        options: Option<&MutationOptions>,
    ) -> Result<DIDCreationResult> {
        let options = options.ok_or_else(|| {
            VDRError::NoSigningKey("did:rooch creation needs a signer".to_string())
        })?;
        let signer = self.chain_signer(options).await?;
        let did = signer.address().to_did()?;

        let call = self
            .call(entry::CREATE_DID_FOR_SELF)
            .arg(&request.public_key_multibase)?;
        let outcome = self.submit(&did, call, &signer).await?;
        self.created_did(&outcome).await
    }

    async fn create_via_cadop(
        &self,
        request: &CADOPCreationRequest,
        options: &MutationOptions,
    ) -> Result<DIDCreationResult> {
        let signer = self.chain_signer(options).await?;
        let custodian = signer.address().to_did()?;

        let call = self
            .call(entry::CREATE_DID_VIA_CADOP)
            .arg(&request.user_did_key)?
            .arg(&request.custodian_service_public_key)?
            .arg(&request.custodian_service_vm_type)?;
        let outcome = self.submit(&custodian, call, &signer).await?;
        self.created_did(&outcome).await
    }

    async fn add_verification_method(
        &self,
        did: &str,
        verification_method: &VerificationMethod,
        relationships: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        let (document, signer) = self
            .prepare(did, options, Operation::AddVerificationMethod)
            .await?;
        let updated = apply_add_verification_method(&document, verification_method, relationships)?;
        let added = updated
            .verification_method
            .last()
            .ok_or_else(|| VDRError::Validation("verification method wasn't added".to_string()))?;

        let (key_type, public_key) = added.public_key()?;
        let codes: Vec<u8> = relationships.iter().map(|r| r.code()).collect();
        let call = self
            .call(entry::ADD_VERIFICATION_METHOD)
            .arg(&fragment_of(&added.id)?)?
            .arg(&added.type_)?
            .arg(&KeyMultibaseCodec::encode_with_type(&public_key, key_type))?
            .arg(&codes)?;
        self.execute(did, call, &signer).await
    }

    async fn remove_verification_method(
        &self,
        did: &str,
        id: &str,
        options: &MutationOptions,
    ) -> Result<bool> {
        let (document, signer) = self
            .prepare(did, options, Operation::RemoveVerificationMethod)
            .await?;
        apply_remove_verification_method(&document, id, signer.key_id())?;

        let call = self
            .call(entry::REMOVE_VERIFICATION_METHOD)
            .arg(&fragment_of(&document.absolute_id(id))?)?;
        self.execute(did, call, &signer).await
    }

    async fn add_service(
        &self,
        did: &str,
        service: &Service,
        options: &MutationOptions,
    ) -> Result<bool> {
        let (document, signer) = self.prepare(did, options, Operation::AddService).await?;
        let updated = apply_add_service(&document, service)?;
        let added = updated
            .service
            .last()
            .ok_or_else(|| VDRError::Validation("service wasn't added".to_string()))?;

        let call = if added.properties.is_empty() {
            self.call(entry::ADD_SERVICE)
        } else {
            self.call(entry::ADD_SERVICE_WITH_PROPERTIES)
        };
        let mut call = call
            .arg(&fragment_of(&added.id)?)?
            .arg(&added.type_)?
            .arg(&added.service_endpoint)?;
        if !added.properties.is_empty() {
            let (keys, values): (Vec<String>, Vec<String>) = added
                .properties
                .iter()
                .map(|(key, value)| (key.to_string(), property_value(value)))
                .unzip();
            call = call.arg(&keys)?.arg(&values)?;
        }
        self.execute(did, call, &signer).await
    }

    async fn remove_service(&self, did: &str, id: &str, options: &MutationOptions) -> Result<bool> {
        let (document, signer) = self.prepare(did, options, Operation::RemoveService).await?;
        apply_remove_service(&document, id)?;
        let service_id = document
            .find_service(id)
            .map(|s| s.id.clone())
            .unwrap_or_else(|| document.absolute_id(id));

        let call = self
            .call(entry::REMOVE_SERVICE)
            .arg(&fragment_of(&service_id)?)?;
        self.execute(did, call, &signer).await
    }

    /// One transaction per relationship actually changing, additions first
    async fn update_relationships(
        &self,
        did: &str,
        id: &str,
        add: &[VerificationRelationship],
        remove: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        let (document, signer) = self
            .prepare(did, options, Operation::UpdateRelationships)
            .await?;
        apply_update_relationships(&document, id, add, remove)?;
        let fragment = fragment_of(&document.absolute_id(id))?;

        let additions = add
            .iter()
            .filter(|rel| !document.has_relationship(id, **rel))
            .map(|rel| (entry::ADD_TO_RELATIONSHIP, *rel));
        let removals = remove
            .iter()
            .filter(|rel| document.has_relationship(id, **rel))
            .map(|rel| (entry::REMOVE_FROM_RELATIONSHIP, *rel));

        for (function, relationship) in additions.chain(removals) {
            let call = self
                .call(function)
                .arg(&fragment)?
                .arg(&relationship.code())?;
            if !self.execute(did, call, &signer).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn update_controller(
        &self,
        did: &str,
        controller: &[String],
        options: &MutationOptions,
    ) -> Result<bool> {
        let (document, signer) = self
            .prepare(did, options, Operation::UpdateController)
            .await?;
        apply_update_controller(&document, controller)?;

        let call = self
            .call(entry::UPDATE_CONTROLLER)
            .arg(&controller.to_vec())?;
        self.execute(did, call, &signer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::MockRoochClient;
    use nuwa_crypto::{KeyPair, KeyType, provider_for};
    use nuwa_key_manager::MemorySigner;

    struct Account {
        did: String,
        key_pair: KeyPair,
        options: MutationOptions,
    }

    fn account(seed: u8) -> Account {
        let did = RoochAddress([seed; 32]).to_did().unwrap();
        let key_pair = provider_for(KeyType::Secp256k1).generate_key_pair().unwrap();
        let signer = MemorySigner::new(&did)
            .with_key(format!("{did}#account-key"), key_pair.clone())
            .unwrap();
        Account {
            did,
            key_pair,
            options: MutationOptions::new(Arc::new(signer)),
        }
    }

    fn multibase(key_pair: &KeyPair) -> String {
        KeyMultibaseCodec::encode_with_type(&key_pair.public_key, key_pair.key_type)
    }

    async fn setup() -> (Arc<MockRoochClient>, RoochVDR, Account) {
        let config = RoochVDRConfigBuilder::default().build();
        let client = Arc::new(MockRoochClient::new(config.did_module_address));
        let vdr = RoochVDR::new(config, client.clone());
        let alice = account(1);
        let request = DIDCreationRequest::new(multibase(&alice.key_pair));
        vdr.create(&request, Some(&alice.options)).await.unwrap();
        (client, vdr, alice)
    }

    #[tokio::test]
    async fn create_and_resolve() {
        let (_, vdr, alice) = setup().await;

        assert!(vdr.exists(&alice.did).await.unwrap());
        let document = vdr.resolve(&alice.did).await.unwrap().unwrap();
        let key_id = format!("{}#account-key", alice.did);
        assert_eq!(document.verification_method[0].id, key_id);
        assert_eq!(
            document.relationships_of(&key_id),
            VerificationRelationship::ALL.to_vec()
        );

        let bob = RoochAddress([2u8; 32]).to_did().unwrap();
        assert!(!vdr.exists(&bob).await.unwrap());
        assert_eq!(vdr.resolve(&bob).await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_reports_transaction() {
        let config = RoochVDRConfigBuilder::default().build();
        let vdr = RoochVDR::new(
            config.clone(),
            Arc::new(MockRoochClient::new(config.did_module_address)),
        );
        let alice = account(3);
        let result = vdr
            .create(
                &DIDCreationRequest::new(multibase(&alice.key_pair)),
                Some(&alice.options),
            )
            .await
            .unwrap();
        assert_eq!(result.did, alice.did);
        assert!(result.transaction_hash.is_some());
        assert!(result.document.is_some());

        assert!(matches!(
            vdr.create(&DIDCreationRequest::new(multibase(&alice.key_pair)), None)
                .await,
            Err(VDRError::NoSigningKey(_))
        ));
    }

    #[tokio::test]
    async fn cadop_creation() {
        let config = RoochVDRConfigBuilder::default().build();
        let vdr = RoochVDR::new(
            config.clone(),
            Arc::new(MockRoochClient::new(config.did_module_address)),
        );
        let custodian = account(4);
        let user = provider_for(KeyType::Ed25519).generate_key_pair().unwrap();
        let user_did_key = nuwa_crypto::did_key_from_public_key(KeyType::Ed25519, &user.public_key);

        let result = vdr
            .create_via_cadop(
                &CADOPCreationRequest {
                    user_did_key: user_did_key.clone(),
                    custodian_service_public_key: multibase(&custodian.key_pair),
                    custodian_service_vm_type: KeyType::Secp256k1
                        .verification_method_type()
                        .to_string(),
                },
                &custodian.options,
            )
            .await
            .unwrap();
        assert!(result.did.starts_with("did:rooch:rooch1"));

        let document = result.document.unwrap();
        assert_eq!(document.verification_method.len(), 2);
        assert_eq!(
            document.verification_method[0].public_key().unwrap().1,
            user.public_key
        );
    }

    #[tokio::test]
    async fn key_lifecycle() {
        let (_, vdr, alice) = setup().await;
        let key_pair = provider_for(KeyType::Ed25519).generate_key_pair().unwrap();
        let vm = VerificationMethod::from_public_key(
            format!("{}#ops", alice.did),
            &alice.did,
            KeyType::Ed25519,
            &key_pair.public_key,
        );

        assert!(
            vdr.add_verification_method(
                &alice.did,
                &vm,
                &[VerificationRelationship::Authentication],
                &alice.options
            )
            .await
            .unwrap()
        );
        let document = vdr.resolve(&alice.did).await.unwrap().unwrap();
        assert_eq!(
            document.relationships_of(&vm.id),
            vec![VerificationRelationship::Authentication]
        );

        assert!(
            vdr.update_relationships(
                &alice.did,
                "#ops",
                &[VerificationRelationship::AssertionMethod],
                &[VerificationRelationship::Authentication],
                &alice.options
            )
            .await
            .unwrap()
        );
        let document = vdr.resolve(&alice.did).await.unwrap().unwrap();
        assert_eq!(
            document.relationships_of(&vm.id),
            vec![VerificationRelationship::AssertionMethod]
        );

        assert!(
            vdr.remove_verification_method(&alice.did, "#ops", &alice.options)
                .await
                .unwrap()
        );
        let document = vdr.resolve(&alice.did).await.unwrap().unwrap();
        assert!(document.find_verification_method(&vm.id).is_none());
        assert!(document.assertion_method.iter().all(|id| *id != vm.id));

        assert!(matches!(
            vdr.remove_verification_method(&alice.did, "#account-key", &alice.options)
                .await,
            Err(VDRError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn services_with_properties() {
        let (_, vdr, alice) = setup().await;
        let service = Service::new("#custodian", "CadopCustodianService", "https://c.example")
            .with_property("custodianPublicKey", "z6MkCustodian")
            .with_property("fees", serde_json::json!({"create": 0}));

        assert!(vdr.add_service(&alice.did, &service, &alice.options).await.unwrap());
        let document = vdr.resolve(&alice.did).await.unwrap().unwrap();
        let stored = document.find_service("custodian").unwrap();
        assert_eq!(
            stored.properties.get("custodianPublicKey"),
            Some(&Value::String("z6MkCustodian".to_string()))
        );
        assert_eq!(
            stored.properties.get("fees"),
            Some(&Value::String("{\"create\":0}".to_string()))
        );

        assert!(
            vdr.remove_service(&alice.did, "#custodian", &alice.options)
                .await
                .unwrap()
        );
        assert!(
            vdr.resolve(&alice.did)
                .await
                .unwrap()
                .unwrap()
                .service
                .is_empty()
        );
    }

    #[tokio::test]
    async fn aborted_transactions_decline() {
        let (client, vdr, alice) = setup().await;
        client.abort_next();
        let service = Service::new("#svc", "LinkedDomains", "https://example.com");
        assert!(!vdr.add_service(&alice.did, &service, &alice.options).await.unwrap());
        assert!(
            vdr.resolve(&alice.did)
                .await
                .unwrap()
                .unwrap()
                .service
                .is_empty()
        );
    }

    #[tokio::test]
    async fn foreign_accounts_are_refused() {
        let (_, vdr, alice) = setup().await;
        let mallory = account(9);
        let service = Service::new("#svc", "LinkedDomains", "https://example.com");

        let err = vdr
            .add_service(&alice.did, &service, &mallory.options)
            .await
            .unwrap_err();
        assert!(matches!(err, VDRError::PermissionDenied { .. }));
        assert!(err.to_string().contains("capabilityInvocation"));
    }

    #[tokio::test]
    async fn store_is_creation_only() {
        let (_, vdr, alice) = setup().await;
        let document = vdr.resolve(&alice.did).await.unwrap().unwrap();
        assert!(matches!(
            vdr.store(&document, Some(&alice.options)).await,
            Err(VDRError::AlreadyExists(_))
        ));
    }
}
