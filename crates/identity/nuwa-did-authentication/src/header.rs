//! `Authorization: DIDAuthV1 <base64url(json)>` encoding

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};

use crate::{
    AUTH_SCHEME,
    errors::{DIDAuthError, Result},
    signature::SignedObject,
};

/// Encodes a signed object as an HTTP `Authorization` header value
pub fn to_authorization_header(signed_object: &SignedObject) -> Result<String> {
    let json = serde_json::to_vec(signed_object)
        .map_err(|e| DIDAuthError::InvalidPayload(e.to_string()))?;
    Ok(format!("{AUTH_SCHEME} {}", BASE64_URL_SAFE_NO_PAD.encode(json)))
}

/// Strict parse of a header produced by [to_authorization_header]
pub fn parse_authorization_header(header: &str) -> Result<SignedObject> {
    let header = header.trim();
    let Some(encoded) = header
        .strip_prefix(AUTH_SCHEME)
        .and_then(|rest| rest.strip_prefix(' '))
    else {
        return Err(DIDAuthError::InvalidHeader(format!(
            "expected scheme {AUTH_SCHEME}"
        )));
    };

    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Err(DIDAuthError::InvalidHeader("empty credentials".to_string()));
    }

    let json = BASE64_URL_SAFE_NO_PAD
        .decode(encoded.trim_end_matches('='))
        .map_err(|e| DIDAuthError::Decode(format!("base64url: {e}")))?;
    let value: serde_json::Value =
        serde_json::from_slice(&json).map_err(|e| DIDAuthError::Decode(format!("JSON: {e}")))?;
    serde_json::from_value(value).map_err(|e| DIDAuthError::InvalidPayload(e.to_string()))
}
