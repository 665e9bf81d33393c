//! Ed25519 key operations

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;

use crate::{CryptoError, CryptoProvider, KeyPair, KeyType, error::Result};

pub const PUBLIC_KEY_LENGTH: usize = ed25519_dalek::PUBLIC_KEY_LENGTH;
pub const SECRET_KEY_LENGTH: usize = ed25519_dalek::SECRET_KEY_LENGTH;

/// Ed25519 provider. Keys are fixed 32 byte values, signatures are deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Provider;

fn signing_key(private_key: &[u8]) -> Result<SigningKey> {
    let seed: [u8; SECRET_KEY_LENGTH] = private_key.try_into().map_err(|_| {
        CryptoError::KeyError(format!(
            "Ed25519 private key must be {SECRET_KEY_LENGTH} bytes, got {}",
            private_key.len()
        ))
    })?;
    Ok(SigningKey::from_bytes(&seed))
}

/// Parses a 32 byte Ed25519 public key
pub fn verifying_key(public_key: &[u8]) -> Result<VerifyingKey> {
    let bytes: [u8; PUBLIC_KEY_LENGTH] = public_key.try_into().map_err(|_| {
        CryptoError::KeyError(format!(
            "Ed25519 public key must be {PUBLIC_KEY_LENGTH} bytes, got {}",
            public_key.len()
        ))
    })?;
    VerifyingKey::from_bytes(&bytes)
        .map_err(|e| CryptoError::KeyError(format!("Ed25519 public key isn't valid: {e}")))
}

impl CryptoProvider for Ed25519Provider {
    fn key_type(&self) -> KeyType {
        KeyType::Ed25519
    }

    fn generate_key_pair(&self) -> Result<KeyPair> {
        let signing_key = SigningKey::generate(&mut OsRng);
        Ok(KeyPair::new(
            KeyType::Ed25519,
            signing_key.verifying_key().to_bytes().to_vec(),
            signing_key.to_bytes().to_vec(),
        ))
    }

    fn key_pair_from_private_key(&self, private_key: &[u8]) -> Result<KeyPair> {
        let signing_key = signing_key(private_key)?;
        Ok(KeyPair::new(
            KeyType::Ed25519,
            signing_key.verifying_key().to_bytes().to_vec(),
            signing_key.to_bytes().to_vec(),
        ))
    }

    fn sign(&self, data: &[u8], private_key: &[u8]) -> Result<Vec<u8>> {
        Ok(signing_key(private_key)?.sign(data).to_bytes().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8], public_key: &[u8]) -> bool {
        let Ok(verifying_key) = verifying_key(public_key) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(data, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 8032 section 7.1, test 1
    const SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const SIGNATURE: &str = "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e065224901555fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b";

    #[test]
    fn rfc8032_vector() {
        let secret = hex::decode(SECRET).unwrap();
        let key_pair = Ed25519Provider.key_pair_from_private_key(&secret).unwrap();
        assert_eq!(hex::encode(&key_pair.public_key), PUBLIC);

        let signature = Ed25519Provider.sign(b"", &secret).unwrap();
        assert_eq!(hex::encode(&signature), SIGNATURE);
        assert!(Ed25519Provider.verify(b"", &signature, &key_pair.public_key));
    }

    #[test]
    fn wrong_length_private_key() {
        assert!(matches!(
            Ed25519Provider.sign(b"data", &[0u8; 31]),
            Err(CryptoError::KeyError(_))
        ));
    }
}
