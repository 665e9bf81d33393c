//! `did:web` registry
//!
//! Resolution is an HTTP GET of the document derived from the DID:
//! `did:web:example.com` maps to `https://example.com/.well-known/did.json`
//! and `did:web:example.com:users:alice` to `https://example.com/users/alice/did.json`.
//!
//! Publishing needs authentication this crate knows nothing about, so writes
//! go through a caller supplied [DocumentUploader]. Every mutation re-uploads
//! the whole document.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use nuwa_crypto::KeyMultibaseCodec;
use nuwa_did_common::{
    ACCOUNT_KEY_FRAGMENT, Document, Service, VerificationMethod, VerificationRelationship,
};
use reqwest::{StatusCode, header::ACCEPT};
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    base::{
        apply_add_service, apply_add_verification_method, apply_remove_service,
        apply_remove_verification_method, apply_update_controller, apply_update_relationships,
        authorize, validate_did_method, validate_document_for_store,
    },
    errors::{Result, VDRError},
    types::{DIDCreationRequest, DIDCreationResult, MutationOptions, Operation},
    vdr::VDR,
};

const METHOD: &str = "web";

/// Publishes a full `did:web` document to wherever it is hosted
#[async_trait]
pub trait DocumentUploader: Send + Sync {
    /// Returns `Ok(false)` if the host declined the document
    async fn upload(&self, did: &str, document: &Document) -> Result<bool>;
}

/// Configuration for [WebVDR]
///
/// Use the [WebVDRConfigBuilder] to create a new configuration.
#[derive(Clone)]
pub struct WebVDRConfig {
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) uploader: Option<Arc<dyn DocumentUploader>>,
}

/// - timeout: bound on each document fetch (default: 10 seconds)
/// - user_agent: User-Agent header of fetches (default: `nuwa-vdr/<version>`)
/// - uploader: handler publishing documents, required for `store` and mutations (default: none)
pub struct WebVDRConfigBuilder {
    timeout: Duration,
    user_agent: String,
    uploader: Option<Arc<dyn DocumentUploader>>,
}

impl Default for WebVDRConfigBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("nuwa-vdr/", env!("CARGO_PKG_VERSION")).to_string(),
            uploader: None,
        }
    }
}

impl WebVDRConfigBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn DocumentUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn build(self) -> WebVDRConfig {
        WebVDRConfig {
            timeout: self.timeout,
            user_agent: self.user_agent,
            uploader: self.uploader,
        }
    }
}

/// Maps a `did:web` DID to the URL of its document
///
/// `%3A` in the domain part encodes a port. `localhost` and `127.0.0.1` are
/// fetched over plain http.
pub fn did_to_url(did: &str) -> Result<Url> {
    let parsed = validate_did_method(did, METHOD)?;
    let mut parts = parsed.identifier().split(':');

    let host = parts.next().unwrap_or_default();
    let (domain, port) = match host.split_once("%3A") {
        Some((domain, port)) => {
            let port = port.parse::<u16>().map_err(|err| {
                VDRError::InvalidDID(format!("{did}: port ({port}) must be a number: {err}"))
            })?;
            (domain, Some(port))
        }
        None => (host, None),
    };
    if domain.is_empty() {
        return Err(VDRError::InvalidDID(format!("{did}: missing domain")));
    }

    let mut path = String::new();
    for part in parts {
        path.push('/');
        path.push_str(part);
    }
    if path.is_empty() {
        path.push_str("/.well-known");
    }
    path.push_str("/did.json");

    let scheme = if domain == "localhost" || domain == "127.0.0.1" {
        "http"
    } else {
        "https"
    };
    let url = match port {
        Some(port) => format!("{scheme}://{domain}:{port}{path}"),
        None => format!("{scheme}://{domain}{path}"),
    };

    Url::parse(&url).map_err(|err| VDRError::InvalidDID(format!("{did}: invalid URL: {err}")))
}

pub struct WebVDR {
    config: WebVDRConfig,
    client: reqwest::Client,
}

impl WebVDR {
    pub fn new(config: WebVDRConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|err| VDRError::Http(format!("couldn't build HTTP client: {err}")))?;
        Ok(WebVDR { config, client })
    }

    fn uploader(&self, did: &str) -> Result<&Arc<dyn DocumentUploader>> {
        self.config
            .uploader
            .as_ref()
            .ok_or_else(|| VDRError::UploadHandlerMissing(did.to_string()))
    }

    async fn fetch(&self, did: &str, url: Url) -> Result<Option<Document>> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/did+json, application/json")
            .send()
            .await
            .map_err(|err| VDRError::Http(format!("GET {url} failed: {err}")))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::GONE => return Ok(None),
            status if !status.is_success() => {
                return Err(VDRError::Http(format!("GET {url} returned {status}")));
            }
            _ => {}
        }

        let body = response
            .text()
            .await
            .map_err(|err| VDRError::Http(format!("reading {url} failed: {err}")))?;
        let document: Document = serde_json::from_str(&body).map_err(|err| {
            VDRError::InvalidDocument(vec![format!("{url} isn't a DID document: {err}")])
        })?;

        if document.id != did {
            return Err(VDRError::InvalidDocument(vec![format!(
                "{url} served a document for {} instead of {did}",
                document.id
            )]));
        }
        Ok(Some(document))
    }

    async fn publish(&self, did: &str, document: &Document) -> Result<bool> {
        let accepted = self.uploader(did)?.upload(did, document).await?;
        if accepted {
            debug!(%did, "uploaded did:web document");
        } else {
            warn!(%did, "host declined did:web document");
        }
        Ok(accepted)
    }

    async fn mutate<F>(
        &self,
        did: &str,
        options: &MutationOptions,
        operation: Operation,
        apply: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Document, &str) -> Result<Document> + Send,
    {
        self.uploader(did)?;
        let current = self
            .resolve(did)
            .await?
            .ok_or_else(|| VDRError::DocumentNotFound(did.to_string()))?;
        let key_id = authorize(&current, options, operation).await?;
        let updated = apply(&current, &key_id)?;
        self.publish(did, &updated).await
    }
}

#[async_trait]
impl VDR for WebVDR {
    fn method(&self) -> &str {
        METHOD
    }

    async fn resolve(&self, did: &str) -> Result<Option<Document>> {
        let url = did_to_url(did)?;
        debug!(%did, %url, "resolving did:web");

        match tokio::time::timeout(self.config.timeout, self.fetch(did, url.clone())).await {
            Ok(result) => result.inspect_err(|err| warn!(%did, "did:web resolution failed: {err}")),
            Err(_) => {
                warn!(%did, %url, "did:web resolution timed out");
                Err(VDRError::Timeout(format!(
                    "GET {url} took longer than {}ms",
                    self.config.timeout.as_millis()
                )))
            }
        }
    }

    async fn store(&self, document: &Document, _options: Option<&MutationOptions>) -> Result<bool> {
        validate_document_for_store(document, METHOD)?;
        self.uploader(&document.id)?;

        if self.resolve(&document.id).await?.is_some() {
            return Err(VDRError::AlreadyExists(document.id.clone()));
        }
        let stored = self.publish(&document.id, document).await?;
        if stored {
            info!(did = %document.id, "stored did:web document");
        }
        Ok(stored)
    }

    async fn create(
        &self,
        request: &DIDCreationRequest,
        options: Option<&MutationOptions>,
    ) -> Result<DIDCreationResult> {
        let Some(did) = request.preferred_did.clone() else {
            return Err(VDRError::Validation(
                "did:web creation needs a preferred DID naming the host".to_string(),
            ));
        };
        validate_did_method(&did, METHOD)?;

        let (key_type, public_key) =
            KeyMultibaseCodec::decode_with_type(&request.public_key_multibase)?;
        let controller = request.controller.clone().unwrap_or_else(|| did.clone());
        let key_id = format!("{did}#{ACCOUNT_KEY_FRAGMENT}");

        let mut document = Document::new(&did);
        document.controller.push(controller.clone());
        let mut verification_method =
            VerificationMethod::from_public_key(&key_id, controller, key_type, &public_key);
        if let Some(type_) = &request.key_type {
            verification_method.type_ = type_.clone();
        }
        document.verification_method.push(verification_method);
        let relationships = request
            .initial_relationships
            .clone()
            .unwrap_or_else(|| VerificationRelationship::ALL.to_vec());
        for relationship in relationships {
            document.add_to_relationship(&key_id, relationship);
        }

        if !self.store(&document, options).await? {
            return Err(VDRError::Http(format!("host declined the document of {did}")));
        }
        Ok(DIDCreationResult {
            did,
            document: Some(document),
            transaction_hash: None,
        })
    }

    async fn add_verification_method(
        &self,
        did: &str,
        verification_method: &VerificationMethod,
        relationships: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::AddVerificationMethod, |doc, _| {
            apply_add_verification_method(doc, verification_method, relationships)
        })
        .await
    }

    async fn remove_verification_method(
        &self,
        did: &str,
        id: &str,
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(
            did,
            options,
            Operation::RemoveVerificationMethod,
            |doc, key_id| apply_remove_verification_method(doc, id, key_id),
        )
        .await
    }

    async fn add_service(
        &self,
        did: &str,
        service: &Service,
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::AddService, |doc, _| {
            apply_add_service(doc, service)
        })
        .await
    }

    async fn remove_service(&self, did: &str, id: &str, options: &MutationOptions) -> Result<bool> {
        self.mutate(did, options, Operation::RemoveService, |doc, _| {
            apply_remove_service(doc, id)
        })
        .await
    }

    async fn update_relationships(
        &self,
        did: &str,
        id: &str,
        add: &[VerificationRelationship],
        remove: &[VerificationRelationship],
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::UpdateRelationships, |doc, _| {
            apply_update_relationships(doc, id, add, remove)
        })
        .await
    }

    async fn update_controller(
        &self,
        did: &str,
        controller: &[String],
        options: &MutationOptions,
    ) -> Result<bool> {
        self.mutate(did, options, Operation::UpdateController, |doc, _| {
            apply_update_controller(doc, controller)
        })
        .await
    }
}
