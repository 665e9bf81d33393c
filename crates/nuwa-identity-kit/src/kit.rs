//! The DID orchestrator
//!
//! An [IdentityKit] owns the local view of one DID Document and a signer for
//! some of its keys. Every `*_and_publish` operation validates and applies the
//! change to a copy of the document, publishes it through the registry for the
//! DID's method, and only then replaces the local view. A failed or abandoned
//! publish leaves the local document untouched.

use std::{fmt, sync::Arc};

use chrono::Utc;
use nuwa_crypto::{KeyPair, KeyType};
use nuwa_did_authentication::{
    Payload, SignatureOptions, create_signature, to_authorization_header,
};
use nuwa_did_common::{
    Document, Service, ServiceProperties, VerificationMethod, VerificationRelationship,
};
use nuwa_key_manager::{MemorySigner, SignerInterface};
use nuwa_vdr::{
    DIDCreationRequest, MutationOptions, VDR,
    base::{
        apply_add_service, apply_add_verification_method, apply_remove_service,
        apply_remove_verification_method, apply_update_controller, apply_update_relationships,
    },
};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    config::IdentityKitConfig,
    errors::{IdentityKitError, Result},
};

/// Signing material for a new [IdentityKit]
///
/// Exactly one of `private_keys` or `external_signer` is needed; when both are
/// given the external signer wins.
#[derive(Default)]
pub struct IdentityKitOptions {
    /// Key pairs by key id, relative ids (`#key-1`) are expanded against the DID
    pub private_keys: Option<Vec<(String, KeyPair)>>,
    pub external_signer: Option<Arc<dyn SignerInterface>>,
}

impl IdentityKitOptions {
    pub fn with_signer(signer: Arc<dyn SignerInterface>) -> Self {
        IdentityKitOptions {
            external_signer: Some(signer),
            ..Default::default()
        }
    }

    pub fn with_private_key(mut self, key_id: impl Into<String>, key_pair: KeyPair) -> Self {
        self.private_keys
            .get_or_insert_with(Vec::new)
            .push((key_id.into(), key_pair));
        self
    }
}

/// A key to add to the document
#[derive(Clone, Debug)]
pub struct OperationalKeyInfo {
    /// Fragment of the new key id, defaults to `key-<unix millis>`
    pub id_fragment: Option<String>,
    pub key_type: KeyType,
    pub public_key: Vec<u8>,
    /// Defaults to the DID itself
    pub controller: Option<String>,
}

impl OperationalKeyInfo {
    pub fn new(key_type: KeyType, public_key: Vec<u8>) -> Self {
        OperationalKeyInfo {
            id_fragment: None,
            key_type,
            public_key,
            controller: None,
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.id_fragment = Some(fragment.into());
        self
    }
}

/// A service to add to the document
#[derive(Clone, Debug)]
pub struct ServiceInfo {
    pub id_fragment: String,
    pub type_: String,
    pub service_endpoint: String,
    pub properties: ServiceProperties,
}

impl ServiceInfo {
    pub fn new(
        id_fragment: impl Into<String>,
        type_: impl Into<String>,
        service_endpoint: impl Into<String>,
    ) -> Self {
        ServiceInfo {
            id_fragment: id_fragment.into(),
            type_: type_.into(),
            service_endpoint: service_endpoint.into(),
            properties: ServiceProperties::default(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }
}

pub struct IdentityKit {
    document: Document,
    signer: Arc<dyn SignerInterface>,
    config: IdentityKitConfig,
}

impl fmt::Debug for IdentityKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKit")
            .field("did", &self.document.id)
            .finish_non_exhaustive()
    }
}

fn fragment_or_timestamp(fragment: Option<&str>) -> String {
    match fragment {
        Some(fragment) => fragment.trim_start_matches('#').to_string(),
        None => format!("key-{}", Utc::now().timestamp_millis()),
    }
}

impl IdentityKit {
    /// Wraps an existing document
    ///
    /// Fails with a configuration error when `options` carries no signer.
    pub fn new(
        document: Document,
        options: IdentityKitOptions,
        config: IdentityKitConfig,
    ) -> Result<Self> {
        let signer: Arc<dyn SignerInterface> = match (options.external_signer, options.private_keys)
        {
            (Some(signer), _) => signer,
            (None, Some(keys)) if !keys.is_empty() => {
                let mut signer = MemorySigner::new(&document.id);
                for (key_id, key_pair) in keys {
                    signer.add_key(document.absolute_id(&key_id), key_pair)?;
                }
                Arc::new(signer)
            }
            _ => {
                return Err(IdentityKitError::Config(format!(
                    "{} needs private keys or an external signer",
                    document.id
                )));
            }
        };

        Ok(IdentityKit {
            document,
            signer,
            config,
        })
    }

    /// Resolves `did` and wraps the current document
    pub async fn from_existing_did(
        did: &str,
        signer: Arc<dyn SignerInterface>,
        config: IdentityKitConfig,
    ) -> Result<Self> {
        let document = config
            .registry
            .resolve_did(did)
            .await?
            .ok_or_else(|| IdentityKitError::DocumentNotFound(did.to_string()))?;
        debug!(did, "loaded existing DID");
        Self::new(document, IdentityKitOptions::with_signer(signer), config)
    }

    /// Creates a DID through the registry for `method`
    ///
    /// The signer pays for and authorizes the creation where the method needs
    /// it (did:rooch).
    pub async fn create_new_did(
        method: &str,
        request: &DIDCreationRequest,
        signer: Arc<dyn SignerInterface>,
        config: IdentityKitConfig,
    ) -> Result<Self> {
        let options = MutationOptions::new(signer.clone());
        let created = config
            .registry
            .create_did(method, request, Some(&options))
            .await?;

        let document = match created.document {
            Some(document) => document,
            None => config
                .registry
                .resolve_did(&created.did)
                .await?
                .ok_or_else(|| IdentityKitError::DocumentNotFound(created.did.clone()))?,
        };
        info!(did = %created.did, method, tx = ?created.transaction_hash, "created new DID");
        Self::new(document, IdentityKitOptions::with_signer(signer), config)
    }

    pub fn did(&self) -> &str {
        &self.document.id
    }

    /// The local view of the document
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &IdentityKitConfig {
        &self.config
    }

    pub fn find_verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.document.find_verification_method(id)
    }

    pub fn signer(&self) -> Arc<dyn SignerInterface> {
        self.signer.clone()
    }

    /// Keys the signer holds, grouped by the relationships the document grants them
    pub async fn available_key_ids(&self) -> Result<Vec<(VerificationRelationship, Vec<String>)>> {
        let held = self.signer.list_key_ids().await?;
        Ok(VerificationRelationship::ALL
            .into_iter()
            .map(|relationship| {
                let keys = self
                    .document
                    .relationship(relationship)
                    .iter()
                    .map(|reference| self.document.absolute_id(reference))
                    .filter(|key_id| held.contains(key_id))
                    .collect();
                (relationship, keys)
            })
            .collect())
    }

    /// Replaces the local view with the registry's current document
    pub async fn refresh(&mut self) -> Result<()> {
        self.document = self
            .config
            .registry
            .resolve_did(&self.document.id)
            .await?
            .ok_or_else(|| IdentityKitError::DocumentNotFound(self.document.id.clone()))?;
        Ok(())
    }

    fn vdr(&self) -> Result<Arc<dyn VDR>> {
        Ok(self.config.registry.vdr_for_did(&self.document.id)?.0)
    }

    fn options(&self, signing_key_id: Option<&str>) -> MutationOptions {
        let options = MutationOptions::new(self.signer.clone());
        match signing_key_id {
            Some(key_id) => options.with_key_id(self.document.absolute_id(key_id)),
            None => options,
        }
    }

    /// Commits `updated` when the registry applied the change
    fn commit(&mut self, applied: bool, updated: Document, operation: &str) -> Result<()> {
        if !applied {
            warn!(
                did = %self.document.id,
                operation,
                "registry didn't apply the change, local document kept"
            );
            return Err(IdentityKitError::PublishRejected {
                did: self.document.id.clone(),
                operation: operation.to_string(),
            });
        }
        self.document = updated;
        debug!(did = %self.document.id, operation, "published");
        Ok(())
    }

    /// First time publication of the local document
    pub async fn publish_did_document(&self) -> Result<bool> {
        let options = self.options(None);
        let published = self.vdr()?.store(&self.document, Some(&options)).await?;
        info!(did = %self.document.id, published, "published DID document");
        Ok(published)
    }

    /// Publishes unless the registry already knows the DID
    ///
    /// Returns `false` without publishing when the DID exists.
    pub async fn create_and_publish_if_not_exists(&self) -> Result<bool> {
        if self.config.registry.exists(&self.document.id).await? {
            debug!(did = %self.document.id, "DID already published");
            return Ok(false);
        }
        self.publish_did_document().await
    }

    /// Adds a verification method with the given relationships, returns its id
    pub async fn add_operational_key_and_publish(
        &mut self,
        key_info: OperationalKeyInfo,
        relationships: &[VerificationRelationship],
        signing_key_id: Option<&str>,
    ) -> Result<String> {
        let key_id = format!(
            "{}#{}",
            self.document.id,
            fragment_or_timestamp(key_info.id_fragment.as_deref())
        );
        let controller = key_info
            .controller
            .unwrap_or_else(|| self.document.id.clone());
        let verification_method = VerificationMethod::from_public_key(
            &key_id,
            controller,
            key_info.key_type,
            &key_info.public_key,
        );

        let updated =
            apply_add_verification_method(&self.document, &verification_method, relationships)?;
        let applied = self
            .vdr()?
            .add_verification_method(
                &self.document.id,
                &verification_method,
                relationships,
                &self.options(signing_key_id),
            )
            .await?;
        self.commit(applied, updated, "addVerificationMethod")?;
        Ok(key_id)
    }

    pub async fn remove_verification_method_and_publish(
        &mut self,
        key_id: &str,
        signing_key_id: Option<&str>,
    ) -> Result<()> {
        let options = self.options(signing_key_id);
        let signing = options.signing_key_id(&self.document).await?;
        let key_id = self.document.absolute_id(key_id);

        let updated = apply_remove_verification_method(&self.document, &key_id, &signing)?;
        let applied = self
            .vdr()?
            .remove_verification_method(&self.document.id, &key_id, &options)
            .await?;
        self.commit(applied, updated, "removeVerificationMethod")
    }

    /// Adds a service, returns its id
    pub async fn add_service_and_publish(
        &mut self,
        service_info: ServiceInfo,
        signing_key_id: Option<&str>,
    ) -> Result<String> {
        let service_id = format!(
            "{}#{}",
            self.document.id,
            service_info.id_fragment.trim_start_matches('#')
        );
        let service = Service {
            id: service_id.clone(),
            type_: service_info.type_,
            service_endpoint: service_info.service_endpoint,
            properties: service_info.properties,
        };

        let updated = apply_add_service(&self.document, &service)?;
        let applied = self
            .vdr()?
            .add_service(&self.document.id, &service, &self.options(signing_key_id))
            .await?;
        self.commit(applied, updated, "addService")?;
        Ok(service_id)
    }

    pub async fn remove_service_and_publish(
        &mut self,
        service_id: &str,
        signing_key_id: Option<&str>,
    ) -> Result<()> {
        let service_id = self.document.absolute_id(service_id);
        let updated = apply_remove_service(&self.document, &service_id)?;
        let applied = self
            .vdr()?
            .remove_service(&self.document.id, &service_id, &self.options(signing_key_id))
            .await?;
        self.commit(applied, updated, "removeService")
    }

    pub async fn update_relationships_and_publish(
        &mut self,
        key_id: &str,
        add: &[VerificationRelationship],
        remove: &[VerificationRelationship],
        signing_key_id: Option<&str>,
    ) -> Result<()> {
        let key_id = self.document.absolute_id(key_id);
        let updated = apply_update_relationships(&self.document, &key_id, add, remove)?;
        let applied = self
            .vdr()?
            .update_relationships(
                &self.document.id,
                &key_id,
                add,
                remove,
                &self.options(signing_key_id),
            )
            .await?;
        self.commit(applied, updated, "updateRelationships")
    }

    pub async fn update_controller_and_publish(
        &mut self,
        controller: &[String],
        signing_key_id: Option<&str>,
    ) -> Result<()> {
        let updated = apply_update_controller(&self.document, controller)?;
        let applied = self
            .vdr()?
            .update_controller(&self.document.id, controller, &self.options(signing_key_id))
            .await?;
        self.commit(applied, updated, "updateController")
    }

    /// Signs raw bytes with a key of this DID
    pub async fn sign_data(&self, data: &[u8], key_id: &str) -> Result<Vec<u8>> {
        let key_id = self.document.absolute_id(key_id);
        if self.document.find_verification_method(&key_id).is_none() {
            return Err(IdentityKitError::KeyNotFound {
                did: self.document.id.clone(),
                key_id,
            });
        }
        Ok(self.signer.sign_with_key_id(data, &key_id).await?)
    }

    /// Signs `operation` and `params` into a `DIDAuthV1` authorization header
    pub async fn create_did_auth_header(
        &self,
        operation: &str,
        params: Value,
        key_id: &str,
    ) -> Result<String> {
        let options = SignatureOptions {
            domain_separator: Some(self.config.domain_separator.clone()),
            ..Default::default()
        };
        let signed = create_signature(
            Payload::new(operation).with_params(params),
            self.signer.as_ref(),
            &self.document,
            key_id,
            &options,
        )
        .await?;
        Ok(to_authorization_header(&signed)?)
    }
}
