//! Multicodec encoding/decoding
//!
//! Multicodec is a self-describing format that prefixes data with a varint
//! indicating the type of data that follows.
//!
//! See: <https://github.com/multiformats/multicodec>

use crate::EncodingError;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ****************************************************************************
// Codec Magic Numbers
// See: https://github.com/multiformats/multicodec/blob/master/table.csv
// ****************************************************************************
pub const ED25519_PUB: u64 = 0xed;
pub const ED25519_PRIV: u64 = 0x1300;
pub const SECP256K1_PUB: u64 = 0xe7;
pub const SECP256K1_PRIV: u64 = 0x1301;
pub const P256_PUB: u64 = 0x1200;
pub const P256_PRIV: u64 = 0x1306;

/// Key codecs understood by the kit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Codec {
    Ed25519Pub,
    Ed25519Priv,
    Secp256k1Pub,
    Secp256k1Priv,
    P256Pub,
    P256Priv,
}

impl Codec {
    /// Convert a raw codec value, rejecting codecs the kit cannot use
    pub fn from_u64(value: u64) -> Result<Self, EncodingError> {
        match value {
            ED25519_PUB => Ok(Codec::Ed25519Pub),
            ED25519_PRIV => Ok(Codec::Ed25519Priv),
            SECP256K1_PUB => Ok(Codec::Secp256k1Pub),
            SECP256K1_PRIV => Ok(Codec::Secp256k1Priv),
            P256_PUB => Ok(Codec::P256Pub),
            P256_PRIV => Ok(Codec::P256Priv),
            other => Err(EncodingError::UnknownCodec(other)),
        }
    }

    pub fn to_u64(self) -> u64 {
        match self {
            Codec::Ed25519Pub => ED25519_PUB,
            Codec::Ed25519Priv => ED25519_PRIV,
            Codec::Secp256k1Pub => SECP256K1_PUB,
            Codec::Secp256k1Priv => SECP256K1_PRIV,
            Codec::P256Pub => P256_PUB,
            Codec::P256Priv => P256_PRIV,
        }
    }

    /// Returns true if this is a public key codec
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Codec::Ed25519Pub | Codec::Secp256k1Pub | Codec::P256Pub
        )
    }

    /// Returns the expected key length for this codec
    pub fn expected_key_length(&self) -> usize {
        match self {
            Codec::Ed25519Pub | Codec::Ed25519Priv => 32,
            Codec::Secp256k1Priv | Codec::P256Priv => 32,
            // compressed SEC1
            Codec::Secp256k1Pub | Codec::P256Pub => 33,
        }
    }
}

/// A multicodec-encoded byte buffer (owned)
///
/// The varint prefix is validated on construction, so the codec and data
/// accessors are infallible.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MultiEncodedBuf {
    bytes: Vec<u8>,
    #[zeroize(skip)]
    codec: u64,
    #[zeroize(skip)]
    offset: usize,
}

impl MultiEncodedBuf {
    /// Parse an existing multicodec-encoded buffer
    pub fn new(bytes: Vec<u8>) -> Result<Self, EncodingError> {
        let (codec, rest) = unsigned_varint::decode::u64(&bytes)
            .map_err(|e| EncodingError::InvalidMulticodec(format!("varint decode: {e}")))?;
        let offset = bytes.len() - rest.len();
        Ok(Self {
            bytes,
            codec,
            offset,
        })
    }

    /// Encode bytes with the given codec
    pub fn encode(codec: Codec, bytes: &[u8]) -> Self {
        Self::encode_raw(codec.to_u64(), bytes)
    }

    /// Encode bytes with a raw codec value
    pub fn encode_raw(codec: u64, bytes: &[u8]) -> Self {
        let mut codec_buffer = unsigned_varint::encode::u64_buffer();
        let encoded_codec = unsigned_varint::encode::u64(codec, &mut codec_buffer);
        let offset = encoded_codec.len();
        let mut result = Vec::with_capacity(offset + bytes.len());
        result.extend(encoded_codec);
        result.extend(bytes);
        Self {
            bytes: result,
            codec,
            offset,
        }
    }

    /// Raw codec value
    pub fn codec(&self) -> u64 {
        self.codec
    }

    /// Codec as typed enum
    pub fn codec_type(&self) -> Result<Codec, EncodingError> {
        Codec::from_u64(self.codec)
    }

    /// Data bytes (without codec prefix)
    pub fn data(&self) -> &[u8] {
        &self.bytes[self.offset..]
    }

    /// Returns the raw bytes, including the codec prefix
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
