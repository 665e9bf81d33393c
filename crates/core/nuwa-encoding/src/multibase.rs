//! Multibase encoding/decoding
//!
//! Multibase is a protocol for self-describing base encodings.
//! The first character indicates the encoding used. Only the three bases
//! used by DID documents are supported here.
//!
//! See: <https://github.com/multiformats/multibase>

use std::fmt;

use base64::{Engine, prelude::BASE64_STANDARD};

use crate::EncodingError;
use crate::multicodec::MultiEncodedBuf;

/// Multibase prefix for base58btc (Bitcoin alphabet)
pub const BASE58BTC_PREFIX: char = 'z';
/// Multibase prefix for RFC 4648 base64 with padding
pub const BASE64PAD_PREFIX: char = 'M';
/// Multibase prefix for lowercase base16
pub const BASE16_PREFIX: char = 'f';

/// Supported multibase encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Multibase {
    #[default]
    Base58Btc,
    Base64Pad,
    Base16,
}

impl Multibase {
    pub fn prefix(&self) -> char {
        match self {
            Multibase::Base58Btc => BASE58BTC_PREFIX,
            Multibase::Base64Pad => BASE64PAD_PREFIX,
            Multibase::Base16 => BASE16_PREFIX,
        }
    }

    pub fn from_prefix(prefix: char) -> Result<Self, EncodingError> {
        match prefix {
            BASE58BTC_PREFIX => Ok(Multibase::Base58Btc),
            BASE64PAD_PREFIX => Ok(Multibase::Base64Pad),
            BASE16_PREFIX => Ok(Multibase::Base16),
            other => Err(EncodingError::InvalidMultibasePrefix(other)),
        }
    }
}

impl fmt::Display for Multibase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multibase::Base58Btc => write!(f, "base58btc"),
            Multibase::Base64Pad => write!(f, "base64pad"),
            Multibase::Base16 => write!(f, "base16"),
        }
    }
}

/// Encode bytes with the given base, prefixed with the base identifier
pub fn encode(bytes: &[u8], base: Multibase) -> String {
    let body = match base {
        Multibase::Base58Btc => bs58::encode(bytes).into_string(),
        Multibase::Base64Pad => BASE64_STANDARD.encode(bytes),
        Multibase::Base16 => hex::encode(bytes),
    };
    format!("{}{body}", base.prefix())
}

/// Decode a multibase string of any supported base
pub fn decode(s: &str) -> Result<Vec<u8>, EncodingError> {
    decode_with_base(s).map(|(_, bytes)| bytes)
}

/// Decode a multibase string, returning the base that was used
pub fn decode_with_base(s: &str) -> Result<(Multibase, Vec<u8>), EncodingError> {
    let mut chars = s.chars();
    let prefix = chars.next().ok_or(EncodingError::Empty)?;
    let base = Multibase::from_prefix(prefix)?;
    let body = chars.as_str();

    let bytes = match base {
        Multibase::Base58Btc => bs58::decode(body)
            .into_vec()
            .map_err(|e| EncodingError::InvalidBase58(e.to_string()))?,
        Multibase::Base64Pad => BASE64_STANDARD
            .decode(body)
            .map_err(|e| EncodingError::InvalidBase64(e.to_string()))?,
        Multibase::Base16 => {
            hex::decode(body).map_err(|e| EncodingError::InvalidBase16(e.to_string()))?
        }
    };

    Ok((base, bytes))
}

/// Decode a base58btc multibase string (must start with 'z')
pub fn decode_base58btc(s: &str) -> Result<Vec<u8>, EncodingError> {
    let Some(encoded) = s.strip_prefix(BASE58BTC_PREFIX) else {
        let prefix = s.chars().next().ok_or(EncodingError::Empty)?;
        return Err(EncodingError::InvalidMultibasePrefix(prefix));
    };

    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| EncodingError::InvalidBase58(e.to_string()))
}

/// Encode bytes as base58btc with multibase prefix 'z'
pub fn encode_base58btc(bytes: &[u8]) -> String {
    encode(bytes, Multibase::Base58Btc)
}

/// Decode a multikey string (multibase + multicodec), returning only the key bytes
pub fn decode_multikey(key: &str) -> Result<Vec<u8>, EncodingError> {
    decode_multikey_with_codec(key).map(|(_, bytes)| bytes)
}

/// Decode a multikey string and return both codec and key bytes
///
/// Any supported multibase prefix is accepted.
pub fn decode_multikey_with_codec(key: &str) -> Result<(u64, Vec<u8>), EncodingError> {
    let bytes = decode(key)?;
    let encoded = MultiEncodedBuf::new(bytes)?;
    Ok((encoded.codec(), encoded.data().to_vec()))
}

/// Encode key bytes with a multicodec prefix as a multibase string
pub fn encode_multikey(codec: u64, key_bytes: &[u8], base: Multibase) -> String {
    let encoded = MultiEncodedBuf::encode_raw(codec, key_bytes);
    encode(encoded.as_bytes(), base)
}
