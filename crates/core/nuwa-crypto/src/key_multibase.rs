//! Algorithm-aware multibase codec
//!
//! A key multibase string is `multibase(varint(codec) || key bytes)`, so the
//! string alone identifies both the key bytes and the algorithm.

use nuwa_encoding::{Multibase, MultiEncodedBuf, multibase};

use crate::{CryptoError, KeyType, error::Result};

/// Encodes and decodes keys together with their algorithm tag
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyMultibaseCodec;

impl KeyMultibaseCodec {
    /// Encodes a public key with base58btc
    pub fn encode_with_type(public_key: &[u8], key_type: KeyType) -> String {
        Self::encode_with_type_and_base(public_key, key_type, Multibase::Base58Btc)
    }

    pub fn encode_with_type_and_base(
        public_key: &[u8],
        key_type: KeyType,
        base: Multibase,
    ) -> String {
        multibase::encode_multikey(key_type.public_codec(), public_key, base)
    }

    /// Decodes a public key multibase string into its key type and bytes
    pub fn decode_with_type(encoded: &str) -> Result<(KeyType, Vec<u8>)> {
        let buf = MultiEncodedBuf::new(multibase::decode(encoded)?)?;
        let key_type = KeyType::from_public_codec(buf.codec())?;
        Ok((key_type, buf.data().to_vec()))
    }

    /// Encodes a private key with base58btc
    pub fn encode_private_with_type(private_key: &[u8], key_type: KeyType) -> String {
        multibase::encode_multikey(key_type.private_codec(), private_key, Multibase::Base58Btc)
    }

    pub fn decode_private_with_type(encoded: &str) -> Result<(KeyType, Vec<u8>)> {
        let buf = MultiEncodedBuf::new(multibase::decode(encoded)?)?;
        let key_type = KeyType::from_private_codec(buf.codec())?;
        Ok((key_type, buf.data().to_vec()))
    }

    /// Decodes a public key and checks it has the expected algorithm
    pub fn decode_expecting(encoded: &str, expected: KeyType) -> Result<Vec<u8>> {
        let (key_type, bytes) = Self::decode_with_type(encoded)?;
        if key_type != expected {
            return Err(CryptoError::KeyError(format!(
                "expected a {expected} key, found {key_type}"
            )));
        }
        Ok(bytes)
    }
}

/// Derives the `did:key` DID for a public key
pub fn did_key_from_public_key(key_type: KeyType, public_key: &[u8]) -> String {
    format!(
        "did:key:{}",
        KeyMultibaseCodec::encode_with_type(public_key, key_type)
    )
}
