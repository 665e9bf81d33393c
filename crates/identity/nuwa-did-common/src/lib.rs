/*!
*   DID Document Definition
*/

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, SeqAccess, Visitor},
};
use serde_json::Value;

pub mod did;
pub mod did_key;
pub mod document;
pub mod relationship;
pub mod rooch_address;
pub mod service;
pub mod validator;
pub mod verification_method;

mod error;

pub use did::{DID, DIDError, DIDMethod, split_fragment};
pub use did_key::{ACCOUNT_KEY_FRAGMENT, did_key_document, did_key_public_key};
pub use error::DocumentError;
pub use relationship::VerificationRelationship;
pub use rooch_address::RoochAddress;
pub use service::{Service, ServiceProperties};
pub use validator::{ValidationResult, validate_document, validate_document_value};
pub use verification_method::{KeyMaterial, VerificationMethod};

pub const DID_V1_CONTEXT: &str = "https://www.w3.org/ns/did/v1";
pub const MULTIKEY_V1_CONTEXT: &str = "https://w3id.org/security/multikey/v1";

/// A [DID Document]
///
/// Relationship arrays hold verification method references. Relative
/// references (`#key-1`) are accepted on input.
///
/// [DID Document]: https://www.w3.org/TR/did-1.1/
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// DID Subject Identifier
    pub id: String,

    #[serde(rename = "@context")]
    #[serde(deserialize_with = "de_string_or_vec", default)]
    pub context: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde(deserialize_with = "de_string_or_vec")]
    pub controller: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub verification_method: Vec<VerificationMethod>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde(deserialize_with = "de_references")]
    pub authentication: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde(deserialize_with = "de_references")]
    pub assertion_method: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde(deserialize_with = "de_references")]
    pub key_agreement: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde(deserialize_with = "de_references")]
    pub capability_invocation: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    #[serde(deserialize_with = "de_references")]
    pub capability_delegation: Vec<String>,

    /// Set of Services
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub service: Vec<Service>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub also_known_as: Vec<String>,
}

/// Accepts either a single string or a sequence of strings
pub(crate) fn de_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVecVisitor;

    impl<'de> Visitor<'de> for StringOrVecVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a sequence of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_owned()])
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(elem) = seq.next_element()? {
                vec.push(elem);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVecVisitor)
}

/// Relationship entries are references; embedded methods are reduced to their id
fn de_references<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(reference) => Ok(reference),
            Value::Object(map) => map
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| de::Error::custom("embedded verification method without id")),
            other => Err(de::Error::custom(format!(
                "invalid verification relationship entry: {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_mixed_shapes() {
        let raw = r##"{
            "@context": "https://www.w3.org/ns/did/v1",
            "id": "did:web:example.com",
            "controller": "did:web:example.com",
            "verificationMethod": [{
                "id": "did:web:example.com#key-1",
                "type": "Ed25519VerificationKey2020",
                "controller": "did:web:example.com",
                "publicKeyMultibase": "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
            }],
            "authentication": ["#key-1"],
            "assertionMethod": [{
                "id": "did:web:example.com#key-2",
                "type": "Ed25519VerificationKey2020",
                "controller": "did:web:example.com",
                "publicKeyMultibase": "z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK"
            }]
        }"##;

        let doc: Document = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.context, vec![DID_V1_CONTEXT.to_string()]);
        assert_eq!(doc.controller, vec!["did:web:example.com".to_string()]);
        assert_eq!(doc.authentication, vec!["#key-1".to_string()]);
        assert_eq!(
            doc.assertion_method,
            vec!["did:web:example.com#key-2".to_string()]
        );
    }

    #[test]
    fn serialize_skips_empty_relationships() {
        let doc = Document::new("did:key:z6MkhaXgBZDvotDkL5257faiztiGiC2QtKLGpbnnEGta2doK");
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("authentication").is_none());
        assert!(value.get("service").is_none());
        assert!(value.get("@context").is_some());
    }
}
