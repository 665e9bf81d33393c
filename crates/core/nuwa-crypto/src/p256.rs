//! ECDSA P-256 key operations

use p256::{
    AffinePoint, EncodedPoint,
    ecdsa::{
        Signature, SigningKey, VerifyingKey,
        signature::{Signer, Verifier},
    },
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
};
use rand_core::OsRng;

use crate::{CryptoError, CryptoProvider, KeyPair, KeyType, error::Result};

/// ECDSA over P-256 (secp256r1) with SHA-256
#[derive(Debug, Clone, Copy, Default)]
pub struct P256Provider;

fn key_pair(signing_key: &SigningKey) -> KeyPair {
    KeyPair::new(
        KeyType::P256,
        signing_key
            .verifying_key()
            .to_encoded_point(true)
            .as_bytes()
            .to_vec(),
        signing_key.to_bytes().to_vec(),
    )
}

fn signing_key(private_key: &[u8]) -> Result<SigningKey> {
    SigningKey::from_slice(private_key).map_err(|e| {
        CryptoError::KeyError(format!("P-256 secret material isn't valid: {e}"))
    })
}

fn affine_point(public_key: &[u8]) -> Result<AffinePoint> {
    let ep = EncodedPoint::from_bytes(public_key)
        .map_err(|e| CryptoError::KeyError(format!("P-256 public key isn't valid: {e}")))?;

    AffinePoint::from_encoded_point(&ep)
        .into_option()
        .ok_or_else(|| CryptoError::KeyError("P-256 point is not on the curve".into()))
}

/// Compresses a 65 byte uncompressed SEC1 key to 33 bytes
///
/// The prefix is `0x02` or `0x03` depending on the parity of y.
pub fn compress_public_key(public_key: &[u8]) -> Result<Vec<u8>> {
    Ok(affine_point(public_key)?
        .to_encoded_point(true)
        .as_bytes()
        .to_vec())
}

/// Expands a 33 byte compressed SEC1 key to the 65 byte uncompressed form
pub fn decompress_public_key(public_key: &[u8]) -> Result<Vec<u8>> {
    Ok(affine_point(public_key)?
        .to_encoded_point(false)
        .as_bytes()
        .to_vec())
}

/// Converts a DER encoded signature to the 64 byte `r || s` form
pub fn der_to_raw(der: &[u8]) -> Result<Vec<u8>> {
    let signature = Signature::from_der(der)
        .map_err(|e| CryptoError::Signature(format!("invalid DER signature: {e}")))?;
    Ok(signature.to_bytes().to_vec())
}

/// Converts a 64 byte `r || s` signature to DER
pub fn raw_to_der(raw: &[u8]) -> Result<Vec<u8>> {
    let signature = Signature::from_slice(raw)
        .map_err(|e| CryptoError::Signature(format!("invalid raw signature: {e}")))?;
    Ok(signature.to_der().as_bytes().to_vec())
}

/// Parses a raw or DER signature
fn parse_signature(signature: &[u8]) -> Option<Signature> {
    Signature::from_slice(signature)
        .or_else(|_| Signature::from_der(signature))
        .ok()
}

impl CryptoProvider for P256Provider {
    fn key_type(&self) -> KeyType {
        KeyType::P256
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        Ok(key_pair(&SigningKey::random(&mut OsRng)))
    }

    fn key_pair_from_private_key(&self, private_key: &[u8]) -> Result<KeyPair> {
        Ok(key_pair(&signing_key(private_key)?))
    }

    fn sign(&self, data: &[u8], private_key: &[u8]) -> Result<Vec<u8>> {
        let signature: Signature = signing_key(private_key)?.sign(data);
        Ok(signature.to_bytes().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(public_key) else {
            return false;
        };
        let Some(signature) = parse_signature(signature) else {
            return false;
        };
        verifying_key.verify(data, &signature).is_ok()
    }
}
