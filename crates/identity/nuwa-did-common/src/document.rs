//! Accessors over the DID document model

use crate::{
    DID_V1_CONTEXT, Document, MULTIKEY_V1_CONTEXT, Service, VerificationMethod,
    VerificationRelationship,
};

impl Document {
    /// An empty document for `did` with the default contexts
    pub fn new(did: impl Into<String>) -> Self {
        Document {
            id: did.into(),
            context: vec![DID_V1_CONTEXT.to_string(), MULTIKEY_V1_CONTEXT.to_string()],
            controller: Vec::new(),
            verification_method: Vec::new(),
            authentication: Vec::new(),
            assertion_method: Vec::new(),
            key_agreement: Vec::new(),
            capability_invocation: Vec::new(),
            capability_delegation: Vec::new(),
            service: Vec::new(),
            also_known_as: Vec::new(),
        }
    }

    /// Expands a relative reference (`#key-1`) against the document id
    pub fn absolute_id(&self, reference: &str) -> String {
        if reference.starts_with('#') {
            format!("{}{reference}", self.id)
        } else {
            reference.to_string()
        }
    }

    pub fn relationship(&self, relationship: VerificationRelationship) -> &Vec<String> {
        match relationship {
            VerificationRelationship::Authentication => &self.authentication,
            VerificationRelationship::AssertionMethod => &self.assertion_method,
            VerificationRelationship::KeyAgreement => &self.key_agreement,
            VerificationRelationship::CapabilityInvocation => &self.capability_invocation,
            VerificationRelationship::CapabilityDelegation => &self.capability_delegation,
        }
    }

    pub fn relationship_mut(&mut self, relationship: VerificationRelationship) -> &mut Vec<String> {
        match relationship {
            VerificationRelationship::Authentication => &mut self.authentication,
            VerificationRelationship::AssertionMethod => &mut self.assertion_method,
            VerificationRelationship::KeyAgreement => &mut self.key_agreement,
            VerificationRelationship::CapabilityInvocation => &mut self.capability_invocation,
            VerificationRelationship::CapabilityDelegation => &mut self.capability_delegation,
        }
    }

    pub fn find_verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        let id = self.absolute_id(id);
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// The originally provisioned key, which always holds full permission
    pub fn primary_verification_method(&self) -> Option<&VerificationMethod> {
        self.verification_method.first()
    }

    pub fn has_relationship(&self, id: &str, relationship: VerificationRelationship) -> bool {
        let id = self.absolute_id(id);
        self.relationship(relationship)
            .iter()
            .any(|reference| self.absolute_id(reference) == id)
    }

    /// All relationships the verification method `id` appears in
    pub fn relationships_of(&self, id: &str) -> Vec<VerificationRelationship> {
        VerificationRelationship::ALL
            .into_iter()
            .filter(|rel| self.has_relationship(id, *rel))
            .collect()
    }

    /// Adds `id` to a relationship array if it isn't there yet
    pub fn add_to_relationship(&mut self, id: &str, relationship: VerificationRelationship) {
        if !self.has_relationship(id, relationship) {
            let id = self.absolute_id(id);
            self.relationship_mut(relationship).push(id);
        }
    }

    /// Removes every reference to `id` from a relationship array
    pub fn remove_from_relationship(&mut self, id: &str, relationship: VerificationRelationship) {
        let id = self.absolute_id(id);
        let doc_id = self.id.clone();
        self.relationship_mut(relationship).retain(|reference| {
            let absolute = if reference.starts_with('#') {
                format!("{doc_id}{reference}")
            } else {
                reference.clone()
            };
            absolute != id
        });
    }

    /// Finds a service by full id or by fragment
    pub fn find_service(&self, id: &str) -> Option<&Service> {
        let id = self.absolute_id(id);
        self.service.iter().find(|s| {
            s.id == id || (!id.contains('#') && s.fragment() == Some(id.as_str()))
        })
    }

    pub fn find_services_by_type(&self, type_: &str) -> Vec<&Service> {
        self.service.iter().filter(|s| s.type_ == type_).collect()
    }

    /// Controllers of the document, the document itself when none are listed
    pub fn controllers(&self) -> Vec<&str> {
        if self.controller.is_empty() {
            vec![self.id.as_str()]
        } else {
            self.controller.iter().map(String::as_str).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuwa_crypto::KeyType;

    fn document() -> Document {
        let mut doc = Document::new("did:example:alice");
        doc.verification_method.push(VerificationMethod::from_public_key(
            "did:example:alice#key-1",
            "did:example:alice",
            KeyType::Ed25519,
            &[1u8; 32],
        ));
        doc.authentication.push("#key-1".into());
        doc.capability_delegation.push("did:example:alice#key-1".into());
        doc.service.push(Service::new(
            "did:example:alice#hub",
            "LinkedDomains",
            "https://alice.example.com",
        ));
        doc
    }

    #[test]
    fn relationship_lookup_resolves_relative_references() {
        let doc = document();
        assert!(doc.has_relationship(
            "did:example:alice#key-1",
            VerificationRelationship::Authentication
        ));
        assert!(doc.has_relationship("#key-1", VerificationRelationship::CapabilityDelegation));
        assert!(!doc.has_relationship("#key-1", VerificationRelationship::KeyAgreement));
        assert_eq!(
            doc.relationships_of("#key-1"),
            vec![
                VerificationRelationship::Authentication,
                VerificationRelationship::CapabilityDelegation
            ]
        );
    }

    #[test]
    fn add_and_remove_relationships() {
        let mut doc = document();
        doc.add_to_relationship("#key-1", VerificationRelationship::Authentication);
        assert_eq!(doc.authentication.len(), 1);

        doc.add_to_relationship("#key-1", VerificationRelationship::AssertionMethod);
        assert_eq!(doc.assertion_method, vec!["did:example:alice#key-1".to_string()]);

        doc.remove_from_relationship(
            "did:example:alice#key-1",
            VerificationRelationship::Authentication,
        );
        assert!(doc.authentication.is_empty());
    }

    #[test]
    fn find_by_fragment() {
        let doc = document();
        assert!(doc.find_verification_method("#key-1").is_some());
        assert!(doc.find_service("hub").is_some());
        assert!(doc.find_service("#hub").is_some());
        assert!(doc.find_service("did:example:alice#hub").is_some());
        assert!(doc.find_service("did:example:bob#hub").is_none());
        assert_eq!(doc.find_services_by_type("LinkedDomains").len(), 1);
        assert_eq!(doc.controllers(), vec!["did:example:alice"]);
    }
}
