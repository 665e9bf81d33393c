//! Checks and document transformations shared by every registry
//!
//! The `apply_*` functions never touch their input: they validate the change
//! and return the updated copy, so a failed validation leaves nothing half
//! applied.

use nuwa_did_common::{
    DID, Document, Service, VerificationMethod, VerificationRelationship, validate_document,
};
use tracing::{debug, warn};

use crate::{
    errors::{Result, VDRError},
    types::{MutationOptions, Operation},
};

/// Parses `did` and checks it belongs to `method`
pub fn validate_did_method(did: &str, method: &str) -> Result<DID> {
    let parsed: DID = did.parse()?;
    if parsed.method().name() != method {
        return Err(VDRError::MethodMismatch {
            expected: method.to_string(),
            did: did.to_string(),
        });
    }
    Ok(parsed)
}

/// Structural checks a document must pass before first publication
pub fn validate_document_for_store(document: &Document, method: &str) -> Result<()> {
    validate_did_method(&document.id, method)?;
    let result = validate_document(document);
    if !result.is_valid {
        return Err(VDRError::InvalidDocument(result.errors));
    }
    Ok(())
}

/// Checks that `key_id` may authorize an operation requiring `required`
///
/// The first verification method is the originally provisioned key and
/// holds every permission. Any other key must be listed in the required
/// relationship.
pub fn validate_key_permission(
    document: &Document,
    key_id: &str,
    required: VerificationRelationship,
) -> Result<()> {
    let key_id = document.absolute_id(key_id);
    if document.find_verification_method(&key_id).is_none() {
        return Err(VDRError::VerificationMethodNotFound {
            did: document.id.clone(),
            key_id,
        });
    }

    let is_primary = document
        .primary_verification_method()
        .is_some_and(|vm| vm.id == key_id);
    if is_primary || document.has_relationship(&key_id, required) {
        return Ok(());
    }

    Err(VDRError::PermissionDenied {
        did: document.id.clone(),
        key_id,
        relationship: required,
    })
}

/// Picks the signing key for `operation` and checks its permission
pub async fn authorize(
    document: &Document,
    options: &MutationOptions,
    operation: Operation,
) -> Result<String> {
    let key_id = options.signing_key_id(document).await?;
    if let Err(err) =
        validate_key_permission(document, &key_id, operation.required_relationship())
    {
        warn!(did = %document.id, %key_id, %operation, "permission check failed: {err}");
        return Err(err);
    }
    debug!(did = %document.id, %key_id, %operation, "authorized");
    Ok(key_id)
}

fn check_id_prefix(document: &Document, id: &str) -> Result<()> {
    let prefix = format!("{}#", document.id);
    if !id.starts_with(&prefix) {
        return Err(VDRError::Validation(format!(
            "id {id} must start with {prefix}"
        )));
    }
    Ok(())
}

/// Adds a verification method and lists it in `relationships`
pub fn apply_add_verification_method(
    document: &Document,
    verification_method: &VerificationMethod,
    relationships: &[VerificationRelationship],
) -> Result<Document> {
    let mut verification_method = verification_method.clone();
    verification_method.id = document.absolute_id(&verification_method.id);
    check_id_prefix(document, &verification_method.id)?;
    if document
        .find_verification_method(&verification_method.id)
        .is_some()
    {
        return Err(VDRError::DuplicateId(verification_method.id));
    }
    verification_method.public_key()?;

    let mut updated = document.clone();
    for relationship in relationships {
        updated.add_to_relationship(&verification_method.id, *relationship);
    }
    updated.verification_method.push(verification_method);
    Ok(updated)
}

/// Removes a verification method and every reference to it
///
/// The last verification method and the key signing the removal can't be
/// removed.
pub fn apply_remove_verification_method(
    document: &Document,
    id: &str,
    signing_key_id: &str,
) -> Result<Document> {
    let id = document.absolute_id(id);
    if document.find_verification_method(&id).is_none() {
        return Err(VDRError::VerificationMethodNotFound {
            did: document.id.clone(),
            key_id: id,
        });
    }
    if document.verification_method.len() == 1 {
        return Err(VDRError::Validation(format!(
            "can't remove {id}: it is the last verification method of {}",
            document.id
        )));
    }
    if id == document.absolute_id(signing_key_id) {
        return Err(VDRError::Validation(format!(
            "can't remove {id}: it is the key signing the removal"
        )));
    }

    let mut updated = document.clone();
    updated.verification_method.retain(|vm| vm.id != id);
    for relationship in VerificationRelationship::ALL {
        updated.remove_from_relationship(&id, relationship);
    }
    Ok(updated)
}

pub fn apply_add_service(document: &Document, service: &Service) -> Result<Document> {
    let mut service = service.clone();
    service.id = document.absolute_id(&service.id);
    check_id_prefix(document, &service.id)?;
    if service.type_.is_empty() || service.service_endpoint.is_empty() {
        return Err(VDRError::Validation(format!(
            "service {} needs a type and a serviceEndpoint",
            service.id
        )));
    }
    if document.service.iter().any(|s| s.id == service.id) {
        return Err(VDRError::DuplicateId(service.id));
    }

    let mut updated = document.clone();
    updated.service.push(service);
    Ok(updated)
}

pub fn apply_remove_service(document: &Document, id: &str) -> Result<Document> {
    let Some(service) = document.find_service(id) else {
        return Err(VDRError::ServiceNotFound {
            did: document.id.clone(),
            service_id: document.absolute_id(id),
        });
    };
    let service_id = service.id.clone();

    let mut updated = document.clone();
    updated.service.retain(|s| s.id != service_id);
    Ok(updated)
}

/// Adds and removes one verification method to and from relationships
///
/// Relationships not named in `add` or `remove` are left untouched.
pub fn apply_update_relationships(
    document: &Document,
    id: &str,
    add: &[VerificationRelationship],
    remove: &[VerificationRelationship],
) -> Result<Document> {
    let id = document.absolute_id(id);
    if document.find_verification_method(&id).is_none() {
        return Err(VDRError::VerificationMethodNotFound {
            did: document.id.clone(),
            key_id: id,
        });
    }
    if let Some(both) = add.iter().find(|rel| remove.contains(rel)) {
        return Err(VDRError::Validation(format!(
            "{both} is both added to and removed from {id}"
        )));
    }

    let mut updated = document.clone();
    for relationship in remove {
        updated.remove_from_relationship(&id, *relationship);
    }
    for relationship in add {
        updated.add_to_relationship(&id, *relationship);
    }
    Ok(updated)
}

pub fn apply_update_controller(document: &Document, controller: &[String]) -> Result<Document> {
    if controller.is_empty() {
        return Err(VDRError::Validation(format!(
            "{} needs at least one controller",
            document.id
        )));
    }
    for did in controller {
        did.parse::<DID>()?;
    }

    let mut updated = document.clone();
    updated.controller = controller.to_vec();
    Ok(updated)
}
