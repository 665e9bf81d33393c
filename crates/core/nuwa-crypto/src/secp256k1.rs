//! ECDSA secp256k1 key operations

use k256::{
    AffinePoint, EncodedPoint,
    ecdsa::{
        Signature, SigningKey, VerifyingKey,
        signature::{Signer, Verifier},
    },
    elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint},
};
use rand_core::OsRng;

use crate::{CryptoError, CryptoProvider, KeyPair, KeyType, error::Result};

/// ECDSA over secp256k1 with SHA-256. Signatures are low-S normalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct Secp256k1Provider;

fn key_pair(signing_key: &SigningKey) -> KeyPair {
    KeyPair::new(
        KeyType::Secp256k1,
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
        CryptoError::KeyError(format!("secp256k1 secret material isn't valid: {e}"))
    })
}

fn affine_point(public_key: &[u8]) -> Result<AffinePoint> {
    let ep = EncodedPoint::from_bytes(public_key)
        .map_err(|e| CryptoError::KeyError(format!("secp256k1 public key isn't valid: {e}")))?;

    AffinePoint::from_encoded_point(&ep)
        .into_option()
        .ok_or_else(|| CryptoError::KeyError("secp256k1 point is not on the curve".into()))
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

/// Parses a raw or DER signature, normalizing s to the lower half
fn parse_signature(signature: &[u8]) -> Option<Signature> {
    let signature = Signature::from_slice(signature)
        .or_else(|_| Signature::from_der(signature))
        .ok()?;
    Some(signature.normalize_s().unwrap_or(signature))
}

impl CryptoProvider for Secp256k1Provider {
    fn key_type(&self) -> KeyType {
        KeyType::Secp256k1
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compressed_public_key() {
        let key_pair = Secp256k1Provider.generate_key_pair().unwrap();
        assert_eq!(key_pair.public_key.len(), 33);
        assert!(matches!(key_pair.public_key[0], 0x02 | 0x03));

        let uncompressed = decompress_public_key(&key_pair.public_key).unwrap();
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(uncompressed[0], 0x04);
        // parity of y selects the prefix
        let expected_prefix = if uncompressed[64] & 1 == 1 { 0x03 } else { 0x02 };
        assert_eq!(key_pair.public_key[0], expected_prefix);
        assert_eq!(compress_public_key(&uncompressed).unwrap(), key_pair.public_key);
    }

    #[test]
    fn verify_accepts_der_and_uncompressed_key() {
        let key_pair = Secp256k1Provider.generate_key_pair().unwrap();
        let raw = Secp256k1Provider.sign(b"payload", &key_pair.private_key).unwrap();
        assert_eq!(raw.len(), 64);

        let der = raw_to_der(&raw).unwrap();
        assert_eq!(der[0], 0x30);
        assert_eq!(der_to_raw(&der).unwrap(), raw);

        let uncompressed = decompress_public_key(&key_pair.public_key).unwrap();
        assert!(Secp256k1Provider.verify(b"payload", &der, &uncompressed));
        assert!(Secp256k1Provider.verify(b"payload", &raw, &key_pair.public_key));
    }

    #[test]
    fn signatures_are_low_s() {
        let key_pair = Secp256k1Provider.generate_key_pair().unwrap();
        for i in 0..8u8 {
            let raw = Secp256k1Provider.sign(&[i], &key_pair.private_key).unwrap();
            let signature = Signature::from_slice(&raw).unwrap();
            assert!(signature.normalize_s().is_none());
        }
    }

    #[test]
    fn invalid_point() {
        let mut bogus = [0u8; 33];
        bogus[0] = 0x02;
        bogus[1..].fill(0xff);
        assert!(decompress_public_key(&bogus).is_err());
    }
}
