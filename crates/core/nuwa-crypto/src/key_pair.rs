use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{JWK, KeyType, error::Result};

/// Raw key pair produced by a crypto provider
///
/// ECDSA public keys are held in SEC1 compressed form (33 bytes).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    pub key_type: KeyType,
    pub public_key: Vec<u8>,
    pub private_key: Vec<u8>,
}

impl KeyPair {
    pub fn new(key_type: KeyType, public_key: Vec<u8>, private_key: Vec<u8>) -> Self {
        KeyPair {
            key_type,
            public_key,
            private_key,
        }
    }

    /// Public half as a JWK
    pub fn public_jwk(&self) -> Result<JWK> {
        JWK::from_public_key(self.key_type, &self.public_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("key_type", &self.key_type)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
