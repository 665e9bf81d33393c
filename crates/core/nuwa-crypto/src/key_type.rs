//! Key type enumeration

use std::fmt;

use nuwa_encoding::{
    ED25519_PRIV, ED25519_PUB, EncodingError, P256_PRIV, P256_PUB, SECP256K1_PRIV, SECP256K1_PUB,
};
use serde::{Deserialize, Serialize};

use crate::CryptoError;

pub const ED25519_VERIFICATION_KEY_2020: &str = "Ed25519VerificationKey2020";
pub const ECDSA_SECP256K1_VERIFICATION_KEY_2019: &str = "EcdsaSecp256k1VerificationKey2019";
pub const ECDSA_SECP256R1_VERIFICATION_KEY_2019: &str = "EcdsaSecp256r1VerificationKey2019";

/// Signing algorithms supported by the kit
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum KeyType {
    #[serde(rename = "Ed25519")]
    Ed25519,
    #[serde(rename = "secp256k1")]
    Secp256k1,
    #[serde(rename = "P-256")]
    P256,
}

impl KeyType {
    pub const ALL: [KeyType; 3] = [KeyType::Ed25519, KeyType::Secp256k1, KeyType::P256];

    /// Verification method `type` used when this key is published in a DID document
    pub fn verification_method_type(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => ED25519_VERIFICATION_KEY_2020,
            KeyType::Secp256k1 => ECDSA_SECP256K1_VERIFICATION_KEY_2019,
            KeyType::P256 => ECDSA_SECP256R1_VERIFICATION_KEY_2019,
        }
    }

    /// Maps a verification method `type` back to a key type
    pub fn from_verification_method_type(vm_type: &str) -> Result<Self, CryptoError> {
        match vm_type {
            ED25519_VERIFICATION_KEY_2020 | "Ed25519VerificationKey2018" => Ok(KeyType::Ed25519),
            ECDSA_SECP256K1_VERIFICATION_KEY_2019 => Ok(KeyType::Secp256k1),
            ECDSA_SECP256R1_VERIFICATION_KEY_2019 => Ok(KeyType::P256),
            _ => Err(CryptoError::UnsupportedKeyType(vm_type.to_string())),
        }
    }

    pub fn public_codec(&self) -> u64 {
        match self {
            KeyType::Ed25519 => ED25519_PUB,
            KeyType::Secp256k1 => SECP256K1_PUB,
            KeyType::P256 => P256_PUB,
        }
    }

    pub fn private_codec(&self) -> u64 {
        match self {
            KeyType::Ed25519 => ED25519_PRIV,
            KeyType::Secp256k1 => SECP256K1_PRIV,
            KeyType::P256 => P256_PRIV,
        }
    }

    pub fn from_public_codec(codec: u64) -> Result<Self, CryptoError> {
        match codec {
            ED25519_PUB => Ok(KeyType::Ed25519),
            SECP256K1_PUB => Ok(KeyType::Secp256k1),
            P256_PUB => Ok(KeyType::P256),
            other => Err(EncodingError::UnknownCodec(other).into()),
        }
    }

    pub fn from_private_codec(codec: u64) -> Result<Self, CryptoError> {
        match codec {
            ED25519_PRIV => Ok(KeyType::Ed25519),
            SECP256K1_PRIV => Ok(KeyType::Secp256k1),
            P256_PRIV => Ok(KeyType::P256),
            other => Err(EncodingError::UnknownCodec(other).into()),
        }
    }
}

impl TryFrom<&str> for KeyType {
    type Error = CryptoError;

    /// Accepts the curve names as well as verification method types
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Ed25519" => Ok(KeyType::Ed25519),
            "secp256k1" => Ok(KeyType::Secp256k1),
            "P-256" => Ok(KeyType::P256),
            other => KeyType::from_verification_method_type(other),
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyType::Ed25519 => write!(f, "Ed25519"),
            KeyType::Secp256k1 => write!(f, "secp256k1"),
            KeyType::P256 => write!(f, "P-256"),
        }
    }
}
