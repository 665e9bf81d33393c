//! Multibase and multicodec encoding utilities for the Nuwa Identity Kit
//!
//! This crate provides the binary/text encoding primitives used across the kit:
//! - Multibase encoding/decoding (base58btc `z`, base64pad `M`, base16 `f`)
//! - Multicodec varint prefixes and the key codec table
//! - Helpers for multikey strings as found in `publicKeyMultibase` and `did:key`

pub mod multibase;
pub mod multicodec;

pub use multibase::{
    BASE16_PREFIX, BASE58BTC_PREFIX, BASE64PAD_PREFIX, Multibase, decode, decode_base58btc,
    decode_multikey, decode_multikey_with_codec, decode_with_base, encode, encode_base58btc,
    encode_multikey,
};
pub use multicodec::{
    Codec, ED25519_PRIV, ED25519_PUB, MultiEncodedBuf, P256_PRIV, P256_PUB, SECP256K1_PRIV,
    SECP256K1_PUB,
};

mod error;
pub use error::EncodingError;
