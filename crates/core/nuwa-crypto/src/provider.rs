//! Crypto provider abstraction
//!
//! Each supported algorithm implements [CryptoProvider]. Providers are
//! stateless and obtained through [provider_for].

use crate::{KeyPair, KeyType, error::Result};

/// Key generation, signing and verification for one algorithm
pub trait CryptoProvider: Send + Sync {
    fn key_type(&self) -> KeyType;

    /// Generates a fresh random key pair
    fn generate_key_pair(&self) -> Result<KeyPair>;

    /// Rebuilds a key pair from its private key bytes
    fn key_pair_from_private_key(&self, private_key: &[u8]) -> Result<KeyPair>;

    /// Signs `data` with the raw private key
    ///
    /// ECDSA providers hash with SHA-256 and return the 64 byte raw compact form.
    fn sign(&self, data: &[u8], private_key: &[u8]) -> Result<Vec<u8>>;

    /// Verifies a signature
    ///
    /// Malformed keys or signatures yield `false`, never an error.
    fn verify(&self, data: &[u8], signature: &[u8], public_key: &[u8]) -> bool;
}

/// Returns the provider for a key type
pub fn provider_for(key_type: KeyType) -> &'static dyn CryptoProvider {
    match key_type {
        KeyType::Ed25519 => &crate::ed25519::Ed25519Provider,
        KeyType::Secp256k1 => &crate::secp256k1::Secp256k1Provider,
        KeyType::P256 => &crate::p256::P256Provider,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_all_key_types() {
        let data = b"nuwa identity kit";
        for key_type in KeyType::ALL {
            let provider = provider_for(key_type);
            assert_eq!(provider.key_type(), key_type);

            let key_pair = provider.generate_key_pair().unwrap();
            let signature = provider.sign(data, &key_pair.private_key).unwrap();
            assert!(provider.verify(data, &signature, &key_pair.public_key));

            // altered data
            assert!(!provider.verify(b"nuwa identity kiT", &signature, &key_pair.public_key));

            // altered signature
            let mut bad_signature = signature.clone();
            bad_signature[10] ^= 0x01;
            assert!(!provider.verify(data, &bad_signature, &key_pair.public_key));

            // altered public key
            let other = provider.generate_key_pair().unwrap();
            assert!(!provider.verify(data, &signature, &other.public_key));
        }
    }

    #[test]
    fn malformed_material_is_false_not_error() {
        for key_type in KeyType::ALL {
            let provider = provider_for(key_type);
            assert!(!provider.verify(b"data", &[1, 2, 3], &[4, 5, 6]));
            assert!(provider.sign(b"data", &[1, 2, 3]).is_err());
        }
    }

    #[test]
    fn key_pair_from_private_key_matches() {
        for key_type in KeyType::ALL {
            let provider = provider_for(key_type);
            let key_pair = provider.generate_key_pair().unwrap();
            let rebuilt = provider
                .key_pair_from_private_key(&key_pair.private_key)
                .unwrap();
            assert_eq!(rebuilt.public_key, key_pair.public_key);
        }
    }
}
