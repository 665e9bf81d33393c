//! JWK (JSON Web Key) types per RFC 7517

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{CryptoError, KeyMultibaseCodec, KeyType, error::Result};

/// RFC 7517 JWK Struct
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct JWK {
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

impl JWK {
    /// Returns the KeyType for a JWK
    pub fn key_type(&self) -> Result<KeyType> {
        let curve = match &self.params {
            Params::EC(params) => &params.curve,
            Params::OKP(params) => &params.curve,
        };
        KeyType::try_from(curve.as_str())
    }

    /// Builds a public JWK from raw public key bytes
    ///
    /// ECDSA keys may be compressed or uncompressed.
    pub fn from_public_key(key_type: KeyType, public_key: &[u8]) -> Result<Self> {
        let params = match key_type {
            KeyType::Ed25519 => {
                crate::ed25519::verifying_key(public_key)?;
                Params::OKP(OctectParams {
                    curve: key_type.to_string(),
                    x: BASE64_URL_SAFE_NO_PAD.encode(public_key),
                    d: None,
                })
            }
            KeyType::Secp256k1 | KeyType::P256 => {
                let uncompressed = match key_type {
                    KeyType::Secp256k1 => crate::secp256k1::decompress_public_key(public_key)?,
                    _ => crate::p256::decompress_public_key(public_key)?,
                };
                Params::EC(ECParams {
                    curve: key_type.to_string(),
                    x: BASE64_URL_SAFE_NO_PAD.encode(&uncompressed[1..33]),
                    y: BASE64_URL_SAFE_NO_PAD.encode(&uncompressed[33..65]),
                    d: None,
                })
            }
        };

        Ok(JWK {
            key_id: None,
            params,
        })
    }

    /// Extracts the public key bytes, ECDSA keys in compressed form
    pub fn to_public_key(&self) -> Result<(KeyType, Vec<u8>)> {
        let key_type = self.key_type()?;
        let bytes = match &self.params {
            Params::OKP(params) => {
                let x = decode_coordinate(&params.x)?;
                crate::ed25519::verifying_key(&x)?;
                x
            }
            Params::EC(params) => {
                let mut uncompressed = Vec::with_capacity(65);
                uncompressed.push(0x04);
                uncompressed.extend(decode_coordinate(&params.x)?);
                uncompressed.extend(decode_coordinate(&params.y)?);
                match key_type {
                    KeyType::Secp256k1 => crate::secp256k1::compress_public_key(&uncompressed)?,
                    KeyType::P256 => crate::p256::compress_public_key(&uncompressed)?,
                    KeyType::Ed25519 => {
                        return Err(CryptoError::KeyError(
                            "Ed25519 keys must use the OKP key type".into(),
                        ));
                    }
                }
            }
        };
        Ok((key_type, bytes))
    }

    /// Converts a multikey string into a JWK struct
    pub fn from_multikey(key: &str) -> Result<Self> {
        let (key_type, bytes) = KeyMultibaseCodec::decode_with_type(key)?;
        Self::from_public_key(key_type, &bytes)
    }
}

fn decode_coordinate(value: &str) -> Result<Vec<u8>> {
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| CryptoError::Decoding(format!("JWK coordinate isn't valid base64url: {e}")))
}

/// JWK Key Types and associated Parameters
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    OKP(OctectParams),
}

/// Elliptic Curve parameters (P-256, secp256k1)
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, Eq, ZeroizeOnDrop)]
pub struct ECParams {
    #[serde(rename = "crv")]
    pub curve: String,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// Octet Key Pair parameters (Ed25519)
#[derive(Debug, Serialize, Deserialize, Clone, Zeroize, PartialEq, Eq, ZeroizeOnDrop)]
pub struct OctectParams {
    #[serde(rename = "crv")]
    pub curve: String,
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}
