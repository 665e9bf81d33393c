/*!
 * CADOP: Custodian Assisted DID Onboarding Protocol
 *
 * A custodian publishes a `CadopCustodianService` in its own DID Document and
 * creates DIDs for users who only hold a `did:key`. Identity providers and
 * Web2 proof services advertise themselves the same way so that clients can
 * discover them from a DID.
 */

use nuwa_did_common::{DID, DIDMethod, Service, split_fragment};
use nuwa_vdr::{CADOPCreationRequest, DIDCreationResult, MutationOptions};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    errors::{IdentityKitError, Result},
    kit::{IdentityKit, ServiceInfo},
};

pub mod services;
pub mod utils;

pub use services::{
    CADOP_CUSTODIAN_SERVICE, CADOP_IDP_SERVICE, CADOP_WEB2_PROOF_SERVICE, CadopServiceType,
    CustodianServiceInfo, IdpServiceInfo, PropertyRule, PropertySpec, ServiceSchema,
    Web2ProofServiceInfo, is_valid_service, validate_service_properties,
};

/// [IdentityKit] with CADOP service management
#[derive(Debug)]
pub struct CadopIdentityKit {
    kit: IdentityKit,
}

impl From<IdentityKit> for CadopIdentityKit {
    fn from(kit: IdentityKit) -> Self {
        CadopIdentityKit { kit }
    }
}

impl CadopIdentityKit {
    pub fn new(kit: IdentityKit) -> Self {
        CadopIdentityKit { kit }
    }

    pub fn kit(&self) -> &IdentityKit {
        &self.kit
    }

    pub fn kit_mut(&mut self) -> &mut IdentityKit {
        &mut self.kit
    }

    pub fn into_inner(self) -> IdentityKit {
        self.kit
    }

    async fn add_typed_service(
        &mut self,
        service_type: CadopServiceType,
        info: ServiceInfo,
        signing_key_id: Option<&str>,
    ) -> Result<String> {
        let validation = validate_service_properties(service_type, &info.properties);
        if !validation.is_valid {
            return Err(IdentityKitError::Validation(validation.errors.join("; ")));
        }
        self.kit.add_service_and_publish(info, signing_key_id).await
    }

    pub async fn add_custodian_service(
        &mut self,
        info: CustodianServiceInfo,
        signing_key_id: Option<&str>,
    ) -> Result<String> {
        self.add_typed_service(CadopServiceType::Custodian, info.into(), signing_key_id)
            .await
    }

    pub async fn add_idp_service(
        &mut self,
        info: IdpServiceInfo,
        signing_key_id: Option<&str>,
    ) -> Result<String> {
        self.add_typed_service(CadopServiceType::IdentityProvider, info.into(), signing_key_id)
            .await
    }

    pub async fn add_web2_proof_service(
        &mut self,
        info: Web2ProofServiceInfo,
        signing_key_id: Option<&str>,
    ) -> Result<String> {
        self.add_typed_service(CadopServiceType::Web2Proof, info.into(), signing_key_id)
            .await
    }

    /// Schema valid services of `service_type` in the local document
    pub fn find_services_of_type(&self, service_type: CadopServiceType) -> Vec<&Service> {
        self.kit
            .document()
            .service
            .iter()
            .filter(|service| is_valid_service(service, service_type))
            .collect()
    }

    /// Schema valid services of `service_type` published by `did`
    ///
    /// Resolution failures yield an empty list.
    pub async fn discover_services(
        &self,
        did: &str,
        service_type: CadopServiceType,
    ) -> Vec<Service> {
        let document = match self.kit.config().registry().resolve_did(did).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                warn!(did, %service_type, "DID not found during service discovery");
                return Vec::new();
            }
            Err(err) => {
                warn!(did, %service_type, error = %err, "service discovery failed");
                return Vec::new();
            }
        };
        document
            .service
            .into_iter()
            .filter(|service| is_valid_service(service, service_type))
            .collect()
    }

    pub async fn discover_custodian_services(&self, did: &str) -> Vec<Service> {
        self.discover_services(did, CadopServiceType::Custodian).await
    }

    pub async fn discover_idp_services(&self, did: &str) -> Vec<Service> {
        self.discover_services(did, CadopServiceType::IdentityProvider)
            .await
    }

    pub async fn discover_web2_proof_services(&self, did: &str) -> Vec<Service> {
        self.discover_services(did, CadopServiceType::Web2Proof).await
    }

    /// Creates a DID for `user_did_key` with this custodian's service key
    ///
    /// The custodian key and its verification method type come from the first
    /// valid custodian service of the local document.
    pub async fn create_did_via_cadop(
        &self,
        method: &str,
        user_did_key: &str,
        signing_key_id: Option<&str>,
    ) -> Result<DIDCreationResult> {
        let (user_did, _) = split_fragment(user_did_key);
        let is_did_key = user_did
            .parse::<DID>()
            .is_ok_and(|did| *did.method() == DIDMethod::Key);
        if !is_did_key {
            return Err(IdentityKitError::Validation(format!(
                "CADOP users are identified by a did:key, got {user_did}"
            )));
        }

        let service = self
            .find_services_of_type(CadopServiceType::Custodian)
            .into_iter()
            .next()
            .ok_or_else(|| {
                IdentityKitError::Cadop(format!(
                    "{} has no valid {CADOP_CUSTODIAN_SERVICE}",
                    self.kit.did()
                ))
            })?;
        let property = |name: &str| {
            service
                .properties
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| IdentityKitError::Cadop(format!("custodian service lacks {name}")))
        };

        let request = CADOPCreationRequest {
            user_did_key: user_did.to_string(),
            custodian_service_public_key: property("custodianPublicKey")?,
            custodian_service_vm_type: property("custodianServiceVMType")?,
        };

        let mut options = MutationOptions::new(self.kit.signer());
        if let Some(key_id) = signing_key_id {
            options = options.with_key_id(self.kit.document().absolute_id(key_id));
        }
        let created = self
            .kit
            .config()
            .registry()
            .create_did_via_cadop(method, &request, &options)
            .await?;
        info!(
            custodian = self.kit.did(),
            user = user_did,
            did = %created.did,
            "created DID via CADOP"
        );
        Ok(created)
    }
}
