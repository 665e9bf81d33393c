//! CADOP service types and their property schemas

use std::{fmt, str::FromStr};

use nuwa_did_common::{Service, ServiceProperties, ValidationResult};
use serde_json::{Value, json};

use crate::{errors::IdentityKitError, kit::ServiceInfo};

pub const CADOP_CUSTODIAN_SERVICE: &str = "CadopCustodianService";
pub const CADOP_IDP_SERVICE: &str = "CadopIdPService";
pub const CADOP_WEB2_PROOF_SERVICE: &str = "CadopWeb2ProofService";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CadopServiceType {
    Custodian,
    IdentityProvider,
    Web2Proof,
}

/// Shape a property value must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyRule {
    String,
    NonEmptyString,
    Object,
    Array,
    NonEmptyArray,
}

impl PropertyRule {
    pub fn check(&self, value: &Value) -> bool {
        match self {
            PropertyRule::String => value.is_string(),
            PropertyRule::NonEmptyString => value.as_str().is_some_and(|s| !s.is_empty()),
            PropertyRule::Object => value.is_object(),
            PropertyRule::Array => value.is_array(),
            PropertyRule::NonEmptyArray => value.as_array().is_some_and(|a| !a.is_empty()),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            PropertyRule::String => "a string",
            PropertyRule::NonEmptyString => "a non-empty string",
            PropertyRule::Object => "an object",
            PropertyRule::Array => "an array",
            PropertyRule::NonEmptyArray => "a non-empty array",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub rule: PropertyRule,
}

const fn property(name: &'static str, rule: PropertyRule) -> PropertySpec {
    PropertySpec { name, rule }
}

/// Required and optional properties of a service type
///
/// Properties not named here are allowed and not checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSchema {
    pub required: &'static [PropertySpec],
    pub optional: &'static [PropertySpec],
}

const CUSTODIAN_SCHEMA: ServiceSchema = ServiceSchema {
    required: &[
        property("custodianPublicKey", PropertyRule::NonEmptyString),
        property("custodianServiceVMType", PropertyRule::NonEmptyString),
    ],
    optional: &[
        property("description", PropertyRule::String),
        property("fees", PropertyRule::Object),
        property("supportedCredentials", PropertyRule::Array),
    ],
};

const IDP_SCHEMA: ServiceSchema = ServiceSchema {
    required: &[property("supportedCredentials", PropertyRule::NonEmptyArray)],
    optional: &[
        property("description", PropertyRule::String),
        property("fees", PropertyRule::Object),
    ],
};

const WEB2_PROOF_SCHEMA: ServiceSchema = ServiceSchema {
    required: &[property("acceptedSignatureTypes", PropertyRule::NonEmptyArray)],
    optional: &[
        property("description", PropertyRule::String),
        property("supportedPlatforms", PropertyRule::Array),
    ],
};

impl CadopServiceType {
    pub const ALL: [CadopServiceType; 3] = [
        CadopServiceType::Custodian,
        CadopServiceType::IdentityProvider,
        CadopServiceType::Web2Proof,
    ];

    /// The `type` string of the service entry
    pub fn as_str(&self) -> &'static str {
        match self {
            CadopServiceType::Custodian => CADOP_CUSTODIAN_SERVICE,
            CadopServiceType::IdentityProvider => CADOP_IDP_SERVICE,
            CadopServiceType::Web2Proof => CADOP_WEB2_PROOF_SERVICE,
        }
    }

    pub fn schema(&self) -> &'static ServiceSchema {
        match self {
            CadopServiceType::Custodian => &CUSTODIAN_SCHEMA,
            CadopServiceType::IdentityProvider => &IDP_SCHEMA,
            CadopServiceType::Web2Proof => &WEB2_PROOF_SCHEMA,
        }
    }

    /// Fragment used when the caller doesn't pick one
    pub fn default_fragment(&self) -> &'static str {
        match self {
            CadopServiceType::Custodian => "custodian-service",
            CadopServiceType::IdentityProvider => "idp-service",
            CadopServiceType::Web2Proof => "web2-proof-service",
        }
    }
}

impl fmt::Display for CadopServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CadopServiceType {
    type Err = IdentityKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CadopServiceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| IdentityKitError::Cadop(format!("unknown CADOP service type: {s}")))
    }
}

/// Checks `properties` against the schema of `service_type`, collecting every violation
pub fn validate_service_properties(
    service_type: CadopServiceType,
    properties: &ServiceProperties,
) -> ValidationResult {
    let schema = service_type.schema();
    let mut errors = Vec::new();

    for spec in schema.required {
        match properties.get(spec.name) {
            None => errors.push(format!("{service_type}: missing required property {}", spec.name)),
            Some(value) if !spec.rule.check(value) => errors.push(format!(
                "{service_type}: {} must be {}",
                spec.name,
                spec.rule.expected()
            )),
            Some(_) => {}
        }
    }
    for spec in schema.optional {
        if let Some(value) = properties.get(spec.name)
            && !spec.rule.check(value)
        {
            errors.push(format!(
                "{service_type}: {} must be {}",
                spec.name,
                spec.rule.expected()
            ));
        }
    }

    ValidationResult::from_errors(errors)
}

/// A service of `service_type` whose properties satisfy its schema
pub fn is_valid_service(service: &Service, service_type: CadopServiceType) -> bool {
    service.type_ == service_type.as_str()
        && validate_service_properties(service_type, &service.properties).is_valid
}

/// Custodian service advertised by a CADOP custodian
#[derive(Clone, Debug, Default)]
pub struct CustodianServiceInfo {
    pub id_fragment: Option<String>,
    pub service_endpoint: String,
    /// Multibase key the custodian adds to DIDs it creates
    pub custodian_public_key: String,
    pub custodian_service_vm_type: String,
    pub description: Option<String>,
    pub fees: Option<Value>,
    pub supported_credentials: Option<Vec<String>>,
}

/// Identity provider issuing Web2 based credentials
#[derive(Clone, Debug, Default)]
pub struct IdpServiceInfo {
    pub id_fragment: Option<String>,
    pub service_endpoint: String,
    pub supported_credentials: Vec<String>,
    pub description: Option<String>,
    pub fees: Option<Value>,
}

#[derive(Clone, Debug, Default)]
pub struct Web2ProofServiceInfo {
    pub id_fragment: Option<String>,
    pub service_endpoint: String,
    pub accepted_signature_types: Vec<String>,
    pub description: Option<String>,
    pub supported_platforms: Option<Vec<String>>,
}

fn service_info(
    service_type: CadopServiceType,
    id_fragment: Option<String>,
    service_endpoint: String,
) -> ServiceInfo {
    ServiceInfo::new(
        id_fragment.unwrap_or_else(|| service_type.default_fragment().to_string()),
        service_type.as_str(),
        service_endpoint,
    )
}

impl From<CustodianServiceInfo> for ServiceInfo {
    fn from(info: CustodianServiceInfo) -> Self {
        let mut service = service_info(
            CadopServiceType::Custodian,
            info.id_fragment,
            info.service_endpoint,
        )
        .with_property("custodianPublicKey", info.custodian_public_key)
        .with_property("custodianServiceVMType", info.custodian_service_vm_type);
        if let Some(description) = info.description {
            service = service.with_property("description", description);
        }
        if let Some(fees) = info.fees {
            service = service.with_property("fees", fees);
        }
        if let Some(credentials) = info.supported_credentials {
            service = service.with_property("supportedCredentials", json!(credentials));
        }
        service
    }
}

impl From<IdpServiceInfo> for ServiceInfo {
    fn from(info: IdpServiceInfo) -> Self {
        let mut service = service_info(
            CadopServiceType::IdentityProvider,
            info.id_fragment,
            info.service_endpoint,
        )
        .with_property("supportedCredentials", json!(info.supported_credentials));
        if let Some(description) = info.description {
            service = service.with_property("description", description);
        }
        if let Some(fees) = info.fees {
            service = service.with_property("fees", fees);
        }
        service
    }
}

impl From<Web2ProofServiceInfo> for ServiceInfo {
    fn from(info: Web2ProofServiceInfo) -> Self {
        let mut service = service_info(
            CadopServiceType::Web2Proof,
            info.id_fragment,
            info.service_endpoint,
        )
        .with_property("acceptedSignatureTypes", json!(info.accepted_signature_types));
        if let Some(description) = info.description {
            service = service.with_property("description", description);
        }
        if let Some(platforms) = info.supported_platforms {
            service = service.with_property("supportedPlatforms", json!(platforms));
        }
        service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn properties(pairs: &[(&str, Value)]) -> ServiceProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn custodian_schema() {
        let valid = properties(&[
            ("custodianPublicKey", json!("z6MkCustodian")),
            ("custodianServiceVMType", json!("Ed25519VerificationKey2020")),
            ("fees", json!({"perDid": 0})),
        ]);
        assert!(validate_service_properties(CadopServiceType::Custodian, &valid).is_valid);

        let invalid = properties(&[
            ("custodianPublicKey", json!("")),
            ("description", json!(42)),
        ]);
        let result = validate_service_properties(CadopServiceType::Custodian, &invalid);
        assert!(!result.is_valid);
        // Empty key, missing VM type and the bad description are all reported
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn idp_requires_credentials() {
        let empty = properties(&[("supportedCredentials", json!([]))]);
        assert!(!validate_service_properties(CadopServiceType::IdentityProvider, &empty).is_valid);

        let valid = properties(&[("supportedCredentials", json!(["google"]))]);
        assert!(validate_service_properties(CadopServiceType::IdentityProvider, &valid).is_valid);
    }

    #[test]
    fn unknown_properties_are_ignored() {
        let props = properties(&[
            ("acceptedSignatureTypes", json!(["EcdsaSecp256k1"])),
            ("extra", json!(true)),
        ]);
        assert!(validate_service_properties(CadopServiceType::Web2Proof, &props).is_valid);
    }

    #[test]
    fn parses_type_names() {
        for service_type in CadopServiceType::ALL {
            assert_eq!(
                service_type.as_str().parse::<CadopServiceType>().unwrap(),
                service_type
            );
        }
        assert!("LLMGateway".parse::<CadopServiceType>().is_err());
    }

    #[test]
    fn typed_infos_satisfy_their_schema() {
        let info: ServiceInfo = CustodianServiceInfo {
            service_endpoint: "https://custodian.example".to_string(),
            custodian_public_key: "z6MkCustodian".to_string(),
            custodian_service_vm_type: "Ed25519VerificationKey2020".to_string(),
            supported_credentials: Some(vec!["google".to_string()]),
            ..Default::default()
        }
        .into();
        assert_eq!(info.id_fragment, "custodian-service");
        assert!(
            validate_service_properties(CadopServiceType::Custodian, &info.properties).is_valid
        );

        let info: ServiceInfo = IdpServiceInfo {
            id_fragment: Some("idp".to_string()),
            service_endpoint: "https://idp.example".to_string(),
            supported_credentials: vec!["github".to_string()],
            ..Default::default()
        }
        .into();
        assert_eq!(info.id_fragment, "idp");
        assert!(
            validate_service_properties(CadopServiceType::IdentityProvider, &info.properties)
                .is_valid
        );
    }
}
