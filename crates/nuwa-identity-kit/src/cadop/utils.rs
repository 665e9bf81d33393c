//! Helpers for the CADOP onboarding flow: key derived DIDs, ID token claim
//! checks and the OIDC `state` parameter.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use chrono::Utc;
use nuwa_crypto::JWK;
use nuwa_did_common::{DID, DIDMethod, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{IdentityKitError, Result};

pub use nuwa_crypto::did_key_from_public_key;

/// Highest sybil resistance level an ID token may claim
pub const MAX_SYBIL_LEVEL: u64 = 3;

/// `did:key` of the public key carried in a JWK
pub fn did_key_from_jwk(jwk: &JWK) -> Result<String> {
    let (key_type, public_key) = jwk.to_public_key()?;
    Ok(did_key_from_public_key(key_type, &public_key))
}

fn string_claim<'a>(claims: &'a Value, name: &str, errors: &mut Vec<String>) -> Option<&'a str> {
    match claims.get(name) {
        None => {
            errors.push(format!("missing claim {name}"));
            None
        }
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(_) => {
            errors.push(format!("claim {name} must be a non-empty string"));
            None
        }
    }
}

fn timestamp_claim(claims: &Value, name: &str, errors: &mut Vec<String>) {
    match claims.get(name) {
        None => errors.push(format!("missing claim {name}")),
        Some(value) if value.as_i64().is_none() => {
            errors.push(format!("claim {name} must be an integer timestamp"))
        }
        Some(_) => {}
    }
}

/// Structural check of the ID token claims a custodian receives
///
/// Every problem is reported, not only the first.
pub fn validate_id_token_claims(claims: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    if !claims.is_object() {
        return ValidationResult::from_errors(vec!["claims must be a JSON object".to_string()]);
    }

    string_claim(claims, "iss", &mut errors);
    string_claim(claims, "jti", &mut errors);
    string_claim(claims, "nonce", &mut errors);

    if let Some(sub) = string_claim(claims, "sub", &mut errors) {
        match sub.parse::<DID>() {
            Ok(did) if *did.method() == DIDMethod::Key => {}
            _ => errors.push(format!("claim sub must be a did:key, got {sub}")),
        }
    }

    match claims.get("aud") {
        None => errors.push("missing claim aud".to_string()),
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(Value::Array(items)) if !items.is_empty() && items.iter().all(Value::is_string) => {}
        Some(_) => errors.push("claim aud must be a string or an array of strings".to_string()),
    }

    timestamp_claim(claims, "exp", &mut errors);
    timestamp_claim(claims, "iat", &mut errors);

    match claims.get("pub_jwk") {
        None => errors.push("missing claim pub_jwk".to_string()),
        Some(value) => {
            let valid = serde_json::from_value::<JWK>(value.clone())
                .ok()
                .is_some_and(|jwk| jwk.to_public_key().is_ok());
            if !valid {
                errors.push("claim pub_jwk must be a valid public JWK".to_string());
            }
        }
    }

    match claims.get("sybil_level") {
        None => errors.push("missing claim sybil_level".to_string()),
        Some(value) => match value.as_u64() {
            Some(level) if level <= MAX_SYBIL_LEVEL => {}
            _ => errors.push(format!(
                "claim sybil_level must be an integer between 0 and {MAX_SYBIL_LEVEL}"
            )),
        },
    }

    ValidationResult::from_errors(errors)
}

/// `true` once `exp` plus the skew has passed, or when `exp` is missing
pub fn is_token_expired(claims: &Value, clock_skew_secs: i64) -> bool {
    match claims.get("exp").and_then(Value::as_i64) {
        Some(exp) => Utc::now().timestamp() > exp.saturating_add(clock_skew_secs),
        None => true,
    }
}

/// `true` while `nbf` (or `iat` when there is no `nbf`) is still in the future
/// beyond the skew
pub fn is_token_not_yet_valid(claims: &Value, clock_skew_secs: i64) -> bool {
    let Some(not_before) = claims
        .get("nbf")
        .or_else(|| claims.get("iat"))
        .and_then(Value::as_i64)
    else {
        return false;
    };
    not_before > Utc::now().timestamp().saturating_add(clock_skew_secs)
}

/// Opaque `state` parameter carried through the OIDC redirect
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OidcState {
    pub custodian_did: String,
    pub nonce: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OidcState {
    pub fn new(custodian_did: impl Into<String>, nonce: impl Into<String>) -> Self {
        OidcState {
            custodian_did: custodian_did.into(),
            nonce: nonce.into(),
            extra: Map::new(),
        }
    }
}

/// JSON, then base64url without padding
pub fn encode_oidc_state(state: &OidcState) -> Result<String> {
    let json = serde_json::to_vec(state)
        .map_err(|e| IdentityKitError::Cadop(format!("couldn't serialize state: {e}")))?;
    Ok(BASE64_URL_SAFE_NO_PAD.encode(json))
}

pub fn decode_oidc_state(state: &str) -> Result<OidcState> {
    let json = BASE64_URL_SAFE_NO_PAD
        .decode(state.trim_end_matches('='))
        .map_err(|e| IdentityKitError::Cadop(format!("state isn't base64url: {e}")))?;
    serde_json::from_slice(&json)
        .map_err(|e| IdentityKitError::Cadop(format!("state isn't a valid OIDC state: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuwa_crypto::{KeyType, provider_for};
    use serde_json::json;

    fn claims() -> Value {
        let key_pair = provider_for(KeyType::Ed25519).generate_key_pair().unwrap();
        let jwk = key_pair.public_jwk().unwrap();
        let now = Utc::now().timestamp();
        json!({
            "iss": "https://idp.example",
            "sub": did_key_from_jwk(&jwk).unwrap(),
            "aud": "did:rooch:custodian",
            "exp": now + 600,
            "iat": now,
            "jti": "token-1",
            "nonce": "n-0",
            "pub_jwk": jwk,
            "sybil_level": 2,
        })
    }

    #[test]
    fn jwk_and_raw_key_derive_the_same_did() {
        for key_type in KeyType::ALL {
            let key_pair = provider_for(key_type).generate_key_pair().unwrap();
            let from_jwk = did_key_from_jwk(&key_pair.public_jwk().unwrap()).unwrap();
            assert_eq!(from_jwk, did_key_from_public_key(key_type, &key_pair.public_key));
        }
    }

    #[test]
    fn accepts_well_formed_claims() {
        let result = validate_id_token_claims(&claims());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn reports_every_problem() {
        let mut claims = claims();
        claims["sub"] = json!("did:web:example.com");
        claims["sybil_level"] = json!(4);
        claims["aud"] = json!([]);
        claims.as_object_mut().unwrap().remove("jti");

        let result = validate_id_token_claims(&claims);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 4, "{:?}", result.errors);
        assert!(!validate_id_token_claims(&json!("token")).is_valid);
    }

    #[test]
    fn expiry_with_skew() {
        let now = Utc::now().timestamp();
        assert!(!is_token_expired(&json!({"exp": now + 60}), 0));
        assert!(is_token_expired(&json!({"exp": now - 60}), 30));
        assert!(!is_token_expired(&json!({"exp": now - 60}), 120));
        assert!(is_token_expired(&json!({}), 300));
    }

    #[test]
    fn not_yet_valid_with_skew() {
        let now = Utc::now().timestamp();
        assert!(is_token_not_yet_valid(&json!({"iat": now + 600}), 60));
        assert!(!is_token_not_yet_valid(&json!({"iat": now + 30}), 60));
        assert!(is_token_not_yet_valid(&json!({"iat": now, "nbf": now + 600}), 60));
        assert!(!is_token_not_yet_valid(&json!({}), 0));
    }

    #[test]
    fn state_round_trip() {
        let mut state = OidcState::new("did:rooch:rooch1custodian", "abc123");
        state.extra.insert("redirectUri".to_string(), json!("https://app.example/cb"));

        let encoded = encode_oidc_state(&state).unwrap();
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+') && !encoded.contains('/'));

        let raw: Value = serde_json::from_slice(&BASE64_URL_SAFE_NO_PAD.decode(&encoded).unwrap())
            .unwrap();
        assert_eq!(raw["custodianDid"], json!("did:rooch:rooch1custodian"));

        assert_eq!(decode_oidc_state(&encoded).unwrap(), state);
        assert!(decode_oidc_state("%%%").is_err());
    }
}
