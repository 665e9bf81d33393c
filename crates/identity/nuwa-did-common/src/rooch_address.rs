//! Rooch account addresses as used by `did:rooch`

use std::{fmt, str::FromStr};

use bech32::{Bech32m, Hrp};
use serde::{Deserialize, Serialize};

use crate::DocumentError;

pub const ROOCH_HRP: Hrp = Hrp::parse_unchecked("rooch");
pub const ADDRESS_LENGTH: usize = 32;

/// A 32 byte Rooch account address
///
/// Displayed as bech32m with the `rooch` human readable part. Parsing also
/// accepts `0x` prefixed hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoochAddress(pub [u8; ADDRESS_LENGTH]);

impl RoochAddress {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        let bytes: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            DocumentError::Address(format!(
                "expected {ADDRESS_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(RoochAddress(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn to_bech32(&self) -> Result<String, DocumentError> {
        bech32::encode::<Bech32m>(ROOCH_HRP, &self.0)
            .map_err(|e| DocumentError::Address(e.to_string()))
    }

    /// The `did:rooch` DID for this address
    pub fn to_did(&self) -> Result<String, DocumentError> {
        Ok(format!("did:rooch:{}", self.to_bech32()?))
    }
}

impl FromStr for RoochAddress {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex_str) = s.strip_prefix("0x") {
            // short forms such as 0x3 are left padded
            let padded = format!("{hex_str:0>64}");
            let bytes = hex::decode(&padded)
                .map_err(|e| DocumentError::Address(format!("{s}: {e}")))?;
            return RoochAddress::from_bytes(&bytes);
        }

        let (hrp, data) =
            bech32::decode(s).map_err(|e| DocumentError::Address(format!("{s}: {e}")))?;
        if hrp != ROOCH_HRP {
            return Err(DocumentError::Address(format!(
                "expected hrp {ROOCH_HRP}, got {hrp}"
            )));
        }
        RoochAddress::from_bytes(&data)
    }
}

impl fmt::Display for RoochAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_bech32().map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}
