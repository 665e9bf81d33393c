//! Verification relationships

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The five W3C verification relationships
///
/// Key management operations require [CapabilityDelegation],
/// service management requires [CapabilityInvocation].
///
/// [CapabilityDelegation]: VerificationRelationship::CapabilityDelegation
/// [CapabilityInvocation]: VerificationRelationship::CapabilityInvocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationRelationship {
    Authentication,
    AssertionMethod,
    KeyAgreement,
    CapabilityInvocation,
    CapabilityDelegation,
}

impl VerificationRelationship {
    pub const ALL: [VerificationRelationship; 5] = [
        VerificationRelationship::Authentication,
        VerificationRelationship::AssertionMethod,
        VerificationRelationship::KeyAgreement,
        VerificationRelationship::CapabilityInvocation,
        VerificationRelationship::CapabilityDelegation,
    ];

    /// Property name used in a DID document
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationRelationship::Authentication => "authentication",
            VerificationRelationship::AssertionMethod => "assertionMethod",
            VerificationRelationship::KeyAgreement => "keyAgreement",
            VerificationRelationship::CapabilityInvocation => "capabilityInvocation",
            VerificationRelationship::CapabilityDelegation => "capabilityDelegation",
        }
    }

    /// Relationship code used by the Rooch DID contract
    pub fn code(&self) -> u8 {
        match self {
            VerificationRelationship::Authentication => 0,
            VerificationRelationship::AssertionMethod => 1,
            VerificationRelationship::CapabilityInvocation => 2,
            VerificationRelationship::CapabilityDelegation => 3,
            VerificationRelationship::KeyAgreement => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(VerificationRelationship::Authentication),
            1 => Some(VerificationRelationship::AssertionMethod),
            2 => Some(VerificationRelationship::CapabilityInvocation),
            3 => Some(VerificationRelationship::CapabilityDelegation),
            4 => Some(VerificationRelationship::KeyAgreement),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationRelationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationRelationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VerificationRelationship::ALL
            .into_iter()
            .find(|rel| rel.as_str() == s)
            .ok_or_else(|| format!("unknown verification relationship: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_fixed() {
        assert_eq!(VerificationRelationship::Authentication.code(), 0);
        assert_eq!(VerificationRelationship::AssertionMethod.code(), 1);
        assert_eq!(VerificationRelationship::CapabilityInvocation.code(), 2);
        assert_eq!(VerificationRelationship::CapabilityDelegation.code(), 3);
        assert_eq!(VerificationRelationship::KeyAgreement.code(), 4);
        for rel in VerificationRelationship::ALL {
            assert_eq!(VerificationRelationship::from_code(rel.code()), Some(rel));
            assert_eq!(rel.as_str().parse::<VerificationRelationship>(), Ok(rel));
        }
        assert_eq!(VerificationRelationship::from_code(5), None);
    }

    #[test]
    fn serde_names() {
        assert_eq!(
            serde_json::to_string(&VerificationRelationship::CapabilityDelegation).unwrap(),
            "\"capabilityDelegation\""
        );
    }
}
