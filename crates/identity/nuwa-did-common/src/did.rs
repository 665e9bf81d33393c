/*!
 * DID (Decentralized Identifier) parsing
 *
 * ```abnf
 * did                = "did:" method-name ":" method-specific-id
 * method-name        = 1*method-char
 * method-char        = %x61-7A / DIGIT  ; lowercase + digits
 * did-url            = did [ "#" fragment ]
 * ```
 */

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

/// DID methods the kit has registries for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DIDMethod {
    Key,
    Web,
    Rooch,
    Other(String),
}

impl DIDMethod {
    pub fn name(&self) -> &str {
        match self {
            DIDMethod::Key => "key",
            DIDMethod::Web => "web",
            DIDMethod::Rooch => "rooch",
            DIDMethod::Other(name) => name,
        }
    }
}

impl From<&str> for DIDMethod {
    fn from(name: &str) -> Self {
        match name {
            "key" => DIDMethod::Key,
            "web" => DIDMethod::Web,
            "rooch" => DIDMethod::Rooch,
            other => DIDMethod::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DIDMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A parsed DID, optionally carrying a `#fragment`
///
/// ```
/// use nuwa_did_common::DID;
///
/// let did: DID = "did:web:example.com#key-1".parse().unwrap();
/// assert_eq!(did.method().name(), "web");
/// assert_eq!(did.identifier(), "example.com");
/// assert_eq!(did.fragment(), Some("key-1"));
/// assert_eq!(did.did(), "did:web:example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DID {
    method: DIDMethod,
    identifier: String,
    fragment: Option<String>,
}

/// Errors that can occur when parsing a DID
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DIDError {
    /// DID string does not start with "did:"
    MissingPrefix,
    /// Method name is invalid (empty or contains invalid characters)
    InvalidMethod(String),
    /// Method-specific identifier is empty or malformed
    InvalidMethodSpecificId(String),
    /// Fragment is empty
    InvalidFragment(String),
}

impl std::error::Error for DIDError {}

impl fmt::Display for DIDError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DIDError::MissingPrefix => write!(f, "DID must start with 'did:'"),
            DIDError::InvalidMethod(m) => write!(f, "Invalid DID method: {m}"),
            DIDError::InvalidMethodSpecificId(id) => {
                write!(f, "Invalid method-specific ID: {id}")
            }
            DIDError::InvalidFragment(msg) => write!(f, "Invalid fragment: {msg}"),
        }
    }
}

impl DID {
    pub fn new(method: &str, identifier: &str) -> Result<Self, DIDError> {
        format!("did:{method}:{identifier}").parse()
    }

    pub fn method(&self) -> &DIDMethod {
        &self.method
    }

    /// The method-specific identifier
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The DID without any fragment
    pub fn did(&self) -> String {
        format!("did:{}:{}", self.method, self.identifier)
    }

    /// Returns `did#fragment`
    pub fn with_fragment(&self, fragment: &str) -> String {
        format!("{}#{fragment}", self.did())
    }
}

impl FromStr for DID {
    type Err = DIDError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("did:").ok_or(DIDError::MissingPrefix)?;

        let (method_name, rest) = rest
            .split_once(':')
            .ok_or_else(|| DIDError::InvalidMethod("missing method".into()))?;

        if method_name.is_empty()
            || !method_name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        {
            return Err(DIDError::InvalidMethod(method_name.into()));
        }

        let (identifier, fragment) = match rest.split_once('#') {
            Some((_, "")) => return Err(DIDError::InvalidFragment("empty fragment".into())),
            Some((identifier, fragment)) => (identifier, Some(fragment.to_string())),
            None => (rest, None),
        };

        if identifier.is_empty()
            || identifier.ends_with(':')
            || identifier.chars().any(|c| c.is_whitespace() || c == '/')
        {
            return Err(DIDError::InvalidMethodSpecificId(identifier.into()));
        }

        Ok(DID {
            method: DIDMethod::from(method_name),
            identifier: identifier.to_string(),
            fragment,
        })
    }
}

impl fmt::Display for DID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "did:{}:{}", self.method, self.identifier)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

impl Serialize for DID {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DID {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Splits `did#fragment` into its DID and fragment parts
pub fn split_fragment(id: &str) -> (&str, Option<&str>) {
    match id.split_once('#') {
        Some((did, fragment)) => (did, Some(fragment)),
        None => (id, None),
    }
}
