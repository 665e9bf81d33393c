//! Signed objects: creation and verification against a DID Document

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::Utc;
use nuwa_crypto::provider_for;
use nuwa_did_common::{Document, split_fragment};
use nuwa_key_manager::SignerInterface;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use serde_json_canonicalizer::to_string;
use tracing::debug;
use uuid::Uuid;

use crate::{
    DIDAUTH_DOMAIN_SEPARATOR,
    errors::{DIDAuthError, Result},
};

/// What the caller wants to sign
///
/// `nonce` and `timestamp` are added by [create_signature].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Payload {
    pub operation: String,
    pub params: Value,
    pub extra: Map<String, Value>,
}

impl Payload {
    pub fn new(operation: impl Into<String>) -> Self {
        Payload {
            operation: operation.into(),
            ..Default::default()
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Adds a top level field next to `operation` and `params`
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// The signed part of a [SignedObject]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedData {
    pub operation: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    pub nonce: String,
    /// Unix seconds
    pub timestamp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignedData {
    /// RFC 8785 canonical form prefixed with the domain separator
    pub fn signing_input(&self, domain_separator: &str) -> Result<Vec<u8>> {
        let canonical =
            to_string(self).map_err(|e| DIDAuthError::Canonicalization(e.to_string()))?;
        let mut message = Vec::with_capacity(domain_separator.len() + canonical.len());
        message.extend_from_slice(domain_separator.as_bytes());
        message.extend_from_slice(canonical.as_bytes());
        Ok(message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signer_did: String,
    /// Full verification method id, `did#fragment`
    pub key_id: String,
    /// Raw signature bytes, base64url without padding on the wire
    #[serde(serialize_with = "to_base64url", deserialize_with = "from_base64url")]
    pub value: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedObject {
    pub signed_data: SignedData,
    pub signature: SignatureInfo,
}

/// Overrides for [create_signature]
#[derive(Clone, Debug, Default)]
pub struct SignatureOptions {
    /// Defaults to a random UUID v4
    pub nonce: Option<String>,
    /// Defaults to now
    pub timestamp: Option<i64>,
    /// Defaults to [DIDAUTH_DOMAIN_SEPARATOR]
    pub domain_separator: Option<String>,
}

fn to_base64url<S: Serializer>(
    value: &[u8],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64_URL_SAFE_NO_PAD.encode(value))
}

fn from_base64url<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    BASE64_URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(serde::de::Error::custom)
}

/// Signs `payload` as the subject of `document` with `key_id`
///
/// `key_id` may be relative (`#key-1`) and must name a verification method of
/// the document.
pub async fn create_signature(
    payload: Payload,
    signer: &dyn SignerInterface,
    document: &Document,
    key_id: &str,
    options: &SignatureOptions,
) -> Result<SignedObject> {
    let key_id = document.absolute_id(key_id);
    if document.find_verification_method(&key_id).is_none() {
        return Err(DIDAuthError::KeyNotFound {
            did: document.id.clone(),
            key_id,
        });
    }

    let signed_data = SignedData {
        operation: payload.operation,
        params: payload.params,
        nonce: options
            .nonce
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        timestamp: options.timestamp.unwrap_or_else(|| Utc::now().timestamp()),
        extra: payload.extra,
    };

    let separator = options
        .domain_separator
        .as_deref()
        .unwrap_or(DIDAUTH_DOMAIN_SEPARATOR);
    let message = signed_data.signing_input(separator)?;
    let value = signer.sign_with_key_id(&message, &key_id).await?;
    debug!(%key_id, operation = %signed_data.operation, "created DIDAuth signature");

    Ok(SignedObject {
        signed_data,
        signature: SignatureInfo {
            signer_did: document.id.clone(),
            key_id,
            value,
        },
    })
}

/// Checks the signature of `signed_object` against a key of `document`
///
/// Only the cryptographic binding is checked here, timestamp, nonce and
/// relationship rules belong to [verify_auth_header](crate::verify_auth_header).
pub fn verify_signature(
    signed_object: &SignedObject,
    document: &Document,
    domain_separator: &str,
) -> Result<()> {
    let signature = &signed_object.signature;
    if signature.signer_did != document.id || split_fragment(&signature.key_id).0 != document.id {
        return Err(DIDAuthError::KeyNotFound {
            did: document.id.clone(),
            key_id: signature.key_id.clone(),
        });
    }

    let vm = document
        .find_verification_method(&signature.key_id)
        .ok_or_else(|| DIDAuthError::KeyNotFound {
            did: document.id.clone(),
            key_id: signature.key_id.clone(),
        })?;
    let (key_type, public_key) = vm.public_key().map_err(|e| DIDAuthError::InvalidKey {
        key_id: signature.key_id.clone(),
        reason: e.to_string(),
    })?;

    let message = signed_object.signed_data.signing_input(domain_separator)?;
    if provider_for(key_type).verify(&message, &signature.value, &public_key) {
        Ok(())
    } else {
        Err(DIDAuthError::SignatureMismatch {
            key_id: signature.key_id.clone(),
        })
    }
}
