//! Deterministic documents for `did:key`

use nuwa_crypto::{KeyMultibaseCodec, KeyType};

use crate::{
    DID, DIDError, DIDMethod, Document, DocumentError, VerificationMethod,
    VerificationRelationship,
};

/// Fragment of the single key embedded in a `did:key`
pub const ACCOUNT_KEY_FRAGMENT: &str = "account-key";

/// Decodes the public key embedded in a `did:key`
pub fn did_key_public_key(did: &str) -> Result<(KeyType, Vec<u8>), DocumentError> {
    let parsed: DID = did.parse()?;
    if parsed.method() != &DIDMethod::Key {
        return Err(DIDError::InvalidMethod(parsed.method().to_string()).into());
    }
    Ok(KeyMultibaseCodec::decode_with_type(parsed.identifier())?)
}

/// Builds the canonical document of a `did:key`
///
/// The single verification method `<did>#account-key` is listed in all five
/// verification relationships.
pub fn did_key_document(did: &str) -> Result<Document, DocumentError> {
    let (key_type, public_key) = did_key_public_key(did)?;
    let did = did.split_once('#').map_or(did, |(did, _)| did);

    let key_id = format!("{did}#{ACCOUNT_KEY_FRAGMENT}");
    let mut document = Document::new(did);
    document.controller.push(did.to_string());
    document
        .verification_method
        .push(VerificationMethod::from_public_key(
            &key_id, did, key_type, &public_key,
        ));
    for relationship in VerificationRelationship::ALL {
        document.relationship_mut(relationship).push(key_id.clone());
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate_document;
    use nuwa_crypto::did_key_from_public_key;

    #[test]
    fn synthesizes_full_permission_document() {
        let did = did_key_from_public_key(KeyType::Ed25519, &[3u8; 32]);
        let doc = did_key_document(&did).unwrap();

        assert_eq!(doc.id, did);
        assert_eq!(doc.verification_method.len(), 1);
        let key_id = format!("{did}#account-key");
        assert_eq!(
            doc.relationships_of(&key_id),
            VerificationRelationship::ALL.to_vec()
        );
        assert!(validate_document(&doc).is_valid);
    }

    #[test]
    fn rejects_other_methods() {
        assert!(did_key_document("did:web:example.com").is_err());
        assert!(did_key_document("did:key:not-multibase").is_err());
    }
}
