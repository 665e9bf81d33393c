//! Structural validation of DID documents
//!
//! Validation accumulates every violation instead of stopping at the first.
//! It works on the JSON shape so documents fetched from untrusted sources can
//! be checked before they are deserialized.

use serde_json::Value;

use crate::Document;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<String>) -> Self {
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

const RELATIONSHIPS: [&str; 5] = [
    "authentication",
    "assertionMethod",
    "keyAgreement",
    "capabilityInvocation",
    "capabilityDelegation",
];

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// A non-empty string, or a non-empty array of strings and embedded contexts
fn is_valid_context(context: &Value) -> bool {
    match context {
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| item.as_str().is_some_and(|s| !s.is_empty()) || item.is_object())
        }
        _ => false,
    }
}

/// Validates a typed document
pub fn validate_document(document: &Document) -> ValidationResult {
    match serde_json::to_value(document) {
        Ok(value) => validate_document_value(&value),
        Err(e) => ValidationResult::from_errors(vec![format!("document can't be serialized: {e}")]),
    }
}

/// Validates the JSON form of a document
pub fn validate_document_value(document: &Value) -> ValidationResult {
    let mut errors = Vec::new();

    let id = non_empty_str(document, "id");
    match id {
        None => errors.push("Document must have an id".to_string()),
        Some(id) if !id.starts_with("did:") => {
            errors.push(format!("Document id {id} must start with did:"))
        }
        Some(_) => {}
    }

    match document.get("@context") {
        None => errors.push("Document must have an @context".to_string()),
        Some(context) if !is_valid_context(context) => {
            errors.push("Document @context must be a non-empty string or array".to_string())
        }
        Some(_) => {}
    }

    let mut method_ids = Vec::new();
    match document.get("verificationMethod").and_then(Value::as_array) {
        Some(methods) if !methods.is_empty() => {
            for (index, vm) in methods.iter().enumerate() {
                let vm_id = non_empty_str(vm, "id");
                let label = vm_id
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("verificationMethod[{index}]"));
                match vm_id {
                    Some(vm_id) => method_ids.push(vm_id.to_string()),
                    None => errors.push(format!("{label} must have an id")),
                }
                if non_empty_str(vm, "type").is_none() {
                    errors.push(format!("{label} must have a type"));
                }
                if non_empty_str(vm, "controller").is_none() {
                    errors.push(format!("{label} must have a controller"));
                }
                if non_empty_str(vm, "publicKeyMultibase").is_none()
                    && vm.get("publicKeyJwk").and_then(Value::as_object).is_none()
                {
                    errors.push(format!(
                        "{label} must have publicKeyMultibase or publicKeyJwk"
                    ));
                }
            }
        }
        _ => errors.push("Document must have at least one verification method".to_string()),
    }

    if let Some(services) = document.get("service").and_then(Value::as_array) {
        for (index, service) in services.iter().enumerate() {
            let label = non_empty_str(service, "id")
                .map(str::to_string)
                .unwrap_or_else(|| format!("service[{index}]"));
            if non_empty_str(service, "id").is_none() {
                errors.push(format!("{label} must have an id"));
            }
            if non_empty_str(service, "type").is_none() {
                errors.push(format!("{label} must have a type"));
            }
            if non_empty_str(service, "serviceEndpoint").is_none() {
                errors.push(format!("{label} must have a serviceEndpoint"));
            }
        }
    }

    for relationship in RELATIONSHIPS {
        let Some(entries) = document.get(relationship).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let Some(reference) = entry
                .as_str()
                .or_else(|| entry.get("id").and_then(Value::as_str))
            else {
                errors.push(format!("{relationship} contains an invalid entry"));
                continue;
            };
            let absolute = match (reference.starts_with('#'), id) {
                (true, Some(id)) => format!("{id}{reference}"),
                _ => reference.to_string(),
            };
            // embedded methods define themselves
            if entry.is_object() {
                continue;
            }
            if !method_ids.contains(&absolute) {
                errors.push(format!(
                    "{relationship} references unknown verification method {reference}"
                ));
            }
        }
    }

    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Service, VerificationMethod};
    use nuwa_crypto::KeyType;
    use serde_json::json;

    #[test]
    fn valid_document() {
        let mut doc = Document::new("did:example:alice");
        doc.verification_method.push(VerificationMethod::from_public_key(
            "did:example:alice#key-1",
            "did:example:alice",
            KeyType::Ed25519,
            &[1u8; 32],
        ));
        doc.authentication.push("#key-1".into());
        doc.service
            .push(Service::new("did:example:alice#hub", "Hub", "https://hub.example.com"));

        let result = validate_document(&doc);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn accumulates_all_errors() {
        let result = validate_document_value(&json!({
            "id": "example:alice",
            "verificationMethod": [{"id": "did:example:alice#key-1"}],
            "authentication": ["did:example:alice#missing"],
            "service": [{"id": "did:example:alice#svc"}]
        }));

        assert!(!result.is_valid);
        let joined = result.errors.join("\n");
        assert!(joined.contains("must start with did:"));
        assert!(joined.contains("@context"));
        assert!(joined.contains("must have a type"));
        assert!(joined.contains("must have a controller"));
        assert!(joined.contains("publicKeyMultibase or publicKeyJwk"));
        assert!(joined.contains("serviceEndpoint"));
        assert!(joined.contains("unknown verification method did:example:alice#missing"));
        assert_eq!(result.errors.len(), 8);
    }

    #[test]
    fn context_must_not_be_empty() {
        let mut doc = Document::new("did:example:alice");
        doc.verification_method.push(VerificationMethod::from_public_key(
            "did:example:alice#key-1",
            "did:example:alice",
            KeyType::Ed25519,
            &[1u8; 32],
        ));
        doc.context.clear();

        let result = validate_document(&doc);
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Document @context must be a non-empty string or array".to_string()]
        );

        let mut value = serde_json::to_value(&doc).unwrap();
        value["@context"] = json!("https://www.w3.org/ns/did/v1");
        assert!(validate_document_value(&value).is_valid);
        value["@context"] = json!("");
        assert!(!validate_document_value(&value).is_valid);
    }

    #[test]
    fn requires_a_verification_method() {
        let result = validate_document(&Document::new("did:example:alice"));
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Document must have at least one verification method".to_string()]
        );
    }
}
