//! BCS layouts of the on-chain DID records
//!
//! Field order matters: BCS is positional and these mirror the Move structs of
//! the `did` module.

use std::fmt;

use nuwa_did_common::{
    Document, KeyMaterial, RoochAddress, Service, ServiceProperties, VerificationMethod,
    VerificationRelationship,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Sha3_256};

/// Event type suffix emitted when a DID object is created
pub const DID_CREATED_EVENT: &str = "::did::DIDCreatedEvent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDID {
    pub method: String,
    pub identifier: String,
}

impl MoveDID {
    pub fn rooch(identifier: impl Into<String>) -> Self {
        MoveDID {
            method: "rooch".to_string(),
            identifier: identifier.into(),
        }
    }
}

impl fmt::Display for MoveDID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.identifier)
    }
}

/// Move `SimpleMap<K, V>`: a vector of entries in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleMap<K, V> {
    pub data: Vec<Entry<K, V>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Default for SimpleMap<K, V> {
    fn default() -> Self {
        SimpleMap { data: Vec::new() }
    }
}

impl<K: PartialEq, V> SimpleMap<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.data.iter().find(|e| e.key == *key).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    pub fn insert(&mut self, key: K, value: V) {
        match self.data.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.data.push(Entry { key, value }),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let index = self.data.iter().position(|e| e.key == *key)?;
        Some(self.data.remove(index).value)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.data.iter().map(|e| &e.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveVerificationMethodID {
    pub did: MoveDID,
    pub fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveVerificationMethod {
    pub id: MoveVerificationMethodID,
    pub type_: String,
    pub controller: MoveDID,
    pub public_key_multibase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveServiceID {
    pub did: MoveDID,
    pub fragment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveService {
    pub id: MoveServiceID,
    pub type_: String,
    pub service_endpoint: String,
    pub properties: SimpleMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCap {
    pub addr: RoochAddress,
}

/// The `DIDDocument` object stored on chain
///
/// Relationship vectors hold verification method fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDIDDocument {
    pub id: MoveDID,
    pub controller: Vec<MoveDID>,
    pub verification_methods: SimpleMap<String, MoveVerificationMethod>,
    pub authentication: Vec<String>,
    pub assertion_method: Vec<String>,
    pub capability_invocation: Vec<String>,
    pub capability_delegation: Vec<String>,
    pub key_agreement: Vec<String>,
    pub services: SimpleMap<String, MoveService>,
    pub also_known_as: Vec<String>,
    pub account_cap: AccountCap,
}

impl MoveDIDDocument {
    pub fn relationship(&self, relationship: VerificationRelationship) -> &Vec<String> {
        match relationship {
            VerificationRelationship::Authentication => &self.authentication,
            VerificationRelationship::AssertionMethod => &self.assertion_method,
            VerificationRelationship::KeyAgreement => &self.key_agreement,
            VerificationRelationship::CapabilityInvocation => &self.capability_invocation,
            VerificationRelationship::CapabilityDelegation => &self.capability_delegation,
        }
    }

    pub fn relationship_mut(&mut self, relationship: VerificationRelationship) -> &mut Vec<String> {
        match relationship {
            VerificationRelationship::Authentication => &mut self.authentication,
            VerificationRelationship::AssertionMethod => &mut self.assertion_method,
            VerificationRelationship::KeyAgreement => &mut self.key_agreement,
            VerificationRelationship::CapabilityInvocation => &mut self.capability_invocation,
            VerificationRelationship::CapabilityDelegation => &mut self.capability_delegation,
        }
    }

    /// Converts the on-chain record into the W3C document shape
    pub fn into_document(self) -> Document {
        let did = self.id.to_string();
        let mut document = Document::new(&did);
        document.controller = self.controller.iter().map(MoveDID::to_string).collect();
        document.also_known_as = self.also_known_as.clone();

        for vm in self.verification_methods.values() {
            document.verification_method.push(VerificationMethod {
                id: format!("{did}#{}", vm.id.fragment),
                type_: vm.type_.clone(),
                controller: vm.controller.to_string(),
                key_material: KeyMaterial::PublicKeyMultibase(vm.public_key_multibase.clone()),
                expires: None,
            });
        }

        for relationship in VerificationRelationship::ALL {
            *document.relationship_mut(relationship) = self
                .relationship(relationship)
                .iter()
                .map(|fragment| format!("{did}#{fragment}"))
                .collect();
        }

        for service in self.services.values() {
            let properties: ServiceProperties = service
                .properties
                .data
                .iter()
                .map(|e| (e.key.clone(), Value::String(e.value.clone())))
                .collect();
            document.service.push(Service {
                id: format!("{did}#{}", service.id.fragment),
                type_: service.type_.clone(),
                service_endpoint: service.service_endpoint.clone(),
                properties,
            });
        }

        document
    }
}

/// Rooch object id: a path of 32 byte addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectID {
    pub path: Vec<[u8; 32]>,
}

impl ObjectID {
    /// The single segment id of a custom object keyed by `id` of type `type_tag`
    ///
    /// SHA3-256 over the BCS encoding of the key followed by the canonical type
    /// string.
    pub fn custom<T: Serialize>(id: &T, type_tag: &str) -> Result<Self, bcs::Error> {
        let mut hasher = Sha3_256::new();
        hasher.update(bcs::to_bytes(id)?);
        hasher.update(type_tag.as_bytes());
        Ok(ObjectID {
            path: vec![hasher.finalize().into()],
        })
    }
}

impl fmt::Display for ObjectID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for segment in &self.path {
            f.write_str(&hex::encode(segment))?;
        }
        Ok(())
    }
}

/// Canonical `address::module::Struct` tag of the DID document object
pub fn did_document_type_tag(module_address: &RoochAddress) -> String {
    format!("{}::did::DIDDocument", hex::encode(module_address.as_bytes()))
}

/// Object id of the DID document for a `did:rooch` identifier
pub fn did_document_object_id(
    identifier: &str,
    module_address: &RoochAddress,
) -> Result<ObjectID, bcs::Error> {
    ObjectID::custom(
        &MoveDID::rooch(identifier),
        &did_document_type_tag(module_address),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DIDCreatedEvent {
    pub did: MoveDID,
    pub object_id: ObjectID,
    pub controller: Vec<MoveDID>,
    pub creator_address: RoochAddress,
    pub creation_method: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identifier: &str) -> MoveDIDDocument {
        let did = MoveDID::rooch(identifier);
        let mut verification_methods = SimpleMap::default();
        verification_methods.insert(
            "account-key".to_string(),
            MoveVerificationMethod {
                id: MoveVerificationMethodID {
                    did: did.clone(),
                    fragment: "account-key".to_string(),
                },
                type_: "EcdsaSecp256k1VerificationKey2019".to_string(),
                controller: did.clone(),
                public_key_multibase: "zQ3shokFTS3brHcDQrn82RUDfCZESWL1ZdCEJwekUDPQiYBme"
                    .to_string(),
            },
        );
        let mut services = SimpleMap::default();
        let mut properties = SimpleMap::default();
        properties.insert("custodianPublicKey".to_string(), "z6Mk".to_string());
        services.insert(
            "custodian".to_string(),
            MoveService {
                id: MoveServiceID {
                    did: did.clone(),
                    fragment: "custodian".to_string(),
                },
                type_: "CadopCustodianService".to_string(),
                service_endpoint: "https://custodian.example".to_string(),
                properties,
            },
        );

        MoveDIDDocument {
            id: did.clone(),
            controller: vec![did],
            verification_methods,
            authentication: vec!["account-key".to_string()],
            assertion_method: vec![],
            capability_invocation: vec!["account-key".to_string()],
            capability_delegation: vec!["account-key".to_string()],
            key_agreement: vec![],
            services,
            also_known_as: vec![],
            account_cap: AccountCap {
                addr: RoochAddress([9u8; 32]),
            },
        }
    }

    #[test]
    fn converts_to_document() {
        let identifier = RoochAddress([9u8; 32]).to_bech32().unwrap();
        let bytes = bcs::to_bytes(&record(&identifier)).unwrap();
        let document = bcs::from_bytes::<MoveDIDDocument>(&bytes)
            .unwrap()
            .into_document();

        let did = format!("did:rooch:{identifier}");
        assert_eq!(document.id, did);
        assert_eq!(document.controller, vec![did.clone()]);
        assert_eq!(document.authentication, vec![format!("{did}#account-key")]);
        assert!(document.assertion_method.is_empty());
        assert_eq!(document.service[0].id, format!("{did}#custodian"));
        assert_eq!(
            document.service[0].properties.get("custodianPublicKey"),
            Some(&Value::String("z6Mk".to_string()))
        );
        assert!(nuwa_did_common::validate_document(&document).is_valid);
    }

    #[test]
    fn object_ids_are_deterministic() {
        let module = RoochAddress::from_bytes(&[0u8; 32]).unwrap();
        let a = did_document_object_id("rooch1abc", &module).unwrap();
        let b = did_document_object_id("rooch1abc", &module).unwrap();
        let c = did_document_object_id("rooch1abd", &module).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.path.len(), 1);
        assert_eq!(a.to_string().len(), 66);
    }

    #[test]
    fn type_tag_uses_full_address() {
        let module: RoochAddress = "0x3".parse().unwrap();
        assert_eq!(
            did_document_type_tag(&module),
            format!("{}3::did::DIDDocument", "0".repeat(63))
        );
    }
}
