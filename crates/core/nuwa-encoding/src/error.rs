//! Encoding errors

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Invalid multibase prefix: '{0}' is not one of 'z' (base58btc), 'M' (base64pad), 'f' (base16)")]
    InvalidMultibasePrefix(char),

    #[error("Empty multibase string")]
    Empty,

    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(String),

    #[error("Invalid base16 encoding: {0}")]
    InvalidBase16(String),

    #[error("Invalid multicodec: {0}")]
    InvalidMulticodec(String),

    #[error("Unknown codec: 0x{0:x}")]
    UnknownCodec(u64),
}
