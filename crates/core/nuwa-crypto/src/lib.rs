//! Cryptographic primitives for the Nuwa Identity Kit
//!
//! This crate provides:
//! - Per-algorithm crypto providers (Ed25519, ECDSA secp256k1, ECDSA P-256)
//! - SEC1 point compression and DER/raw ECDSA signature normalization
//! - The algorithm-aware key multibase codec used by `publicKeyMultibase`
//! - JWK (JSON Web Key) types per RFC 7517

mod error;
mod jwk;
mod key_multibase;
mod key_pair;
mod key_type;
mod provider;

pub mod ed25519;
pub mod p256;
pub mod secp256k1;

pub use error::{CryptoError, Result};
pub use jwk::{ECParams, JWK, OctectParams, Params};
pub use key_multibase::{KeyMultibaseCodec, did_key_from_public_key};
pub use key_pair::KeyPair;
pub use key_type::KeyType;
pub use provider::{CryptoProvider, provider_for};
