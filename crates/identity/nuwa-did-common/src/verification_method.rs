//! https://www.w3.org/TR/cid-1.0/#verification-methods

use nuwa_crypto::{JWK, KeyMultibaseCodec, KeyType};
use serde::{Deserialize, Serialize};

use crate::DocumentError;

/// Public key material of a verification method
///
/// Exactly one encoding is carried; on the wire it appears as either
/// `publicKeyMultibase` or `publicKeyJwk`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KeyMaterial {
    PublicKeyMultibase(String),
    PublicKeyJwk(JWK),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub controller: String,

    #[serde(flatten)]
    pub key_material: KeyMaterial,

    /// ISO-8601 expiry timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl VerificationMethod {
    /// Builds a multibase verification method for a raw public key
    pub fn from_public_key(
        id: impl Into<String>,
        controller: impl Into<String>,
        key_type: KeyType,
        public_key: &[u8],
    ) -> Self {
        VerificationMethod {
            id: id.into(),
            type_: key_type.verification_method_type().to_string(),
            controller: controller.into(),
            key_material: KeyMaterial::PublicKeyMultibase(KeyMultibaseCodec::encode_with_type(
                public_key, key_type,
            )),
            expires: None,
        }
    }

    /// The fragment part of the id, if any
    pub fn fragment(&self) -> Option<&str> {
        self.id.split_once('#').map(|(_, fragment)| fragment)
    }

    pub fn public_key_multibase(&self) -> Option<&str> {
        match &self.key_material {
            KeyMaterial::PublicKeyMultibase(value) => Some(value),
            KeyMaterial::PublicKeyJwk(_) => None,
        }
    }

    /// Extracts the key type and raw public key bytes
    ///
    /// Multibase values carrying a multicodec prefix are self-describing.
    /// Values without one fall back to the verification method `type`.
    pub fn public_key(&self) -> Result<(KeyType, Vec<u8>), DocumentError> {
        match &self.key_material {
            KeyMaterial::PublicKeyJwk(jwk) => Ok(jwk.to_public_key()?),
            KeyMaterial::PublicKeyMultibase(value) => {
                if let Ok(decoded) = KeyMultibaseCodec::decode_with_type(value) {
                    return Ok(decoded);
                }
                let key_type = KeyType::from_verification_method_type(&self.type_)?;
                let bytes = nuwa_encoding::decode(value).map_err(|e| {
                    DocumentError::KeyMaterial(format!(
                        "{}: publicKeyMultibase can't be decoded: {e}",
                        self.id
                    ))
                })?;
                Ok((key_type, bytes))
            }
        }
    }
}
