//! Server side verification of DIDAuth headers

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use nuwa_did_common::{Document, VerificationRelationship};
use nuwa_vdr::DIDResolver;
use tracing::{Instrument, Level, debug, span, warn};

use crate::{
    DIDAUTH_DOMAIN_SEPARATOR,
    errors::{DIDAuthError, Result},
    header::parse_authorization_header,
    nonce_store::{InMemoryNonceStore, NonceStore},
    signature::{SignedData, SignedObject, verify_signature},
};

/// Configuration for [verify_auth_header]
///
/// The nonce store lives in the config, so reuse one config across requests
/// for replay protection to hold. Use [DIDAuthVerifyConfigBuilder] to create
/// a new configuration.
#[derive(Clone)]
pub struct DIDAuthVerifyConfig {
    pub(crate) max_clock_skew: Duration,
    pub(crate) domain_separator: String,
    pub(crate) nonce_store: Arc<dyn NonceStore>,
}

impl DIDAuthVerifyConfig {
    pub fn max_clock_skew(&self) -> Duration {
        self.max_clock_skew
    }

    pub fn domain_separator(&self) -> &str {
        &self.domain_separator
    }
}

/// - max_clock_skew: accepted distance between the signed timestamp and now (default: 300 seconds)
/// - domain_separator: prefix bound into every signature (default: `DIDAuthV1:`)
/// - nonce_store: replay cache (default: a new [InMemoryNonceStore])
pub struct DIDAuthVerifyConfigBuilder {
    max_clock_skew: Duration,
    domain_separator: String,
    nonce_store: Option<Arc<dyn NonceStore>>,
}

impl Default for DIDAuthVerifyConfigBuilder {
    fn default() -> Self {
        Self {
            max_clock_skew: Duration::from_secs(300),
            domain_separator: DIDAUTH_DOMAIN_SEPARATOR.to_string(),
            nonce_store: None,
        }
    }
}

impl DIDAuthVerifyConfigBuilder {
    /// Default: 300 seconds
    pub fn with_max_clock_skew(mut self, max_clock_skew: Duration) -> Self {
        self.max_clock_skew = max_clock_skew;
        self
    }

    pub fn with_domain_separator(mut self, domain_separator: impl Into<String>) -> Self {
        self.domain_separator = domain_separator.into();
        self
    }

    /// Share a nonce store between verifiers
    pub fn with_nonce_store(mut self, nonce_store: Arc<dyn NonceStore>) -> Self {
        self.nonce_store = Some(nonce_store);
        self
    }

    pub fn build(self) -> DIDAuthVerifyConfig {
        DIDAuthVerifyConfig {
            max_clock_skew: self.max_clock_skew,
            domain_separator: self.domain_separator,
            nonce_store: self
                .nonce_store
                .unwrap_or_else(|| Arc::new(InMemoryNonceStore::new())),
        }
    }
}

/// A request that passed [verify_auth_header]
#[derive(Clone, Debug, PartialEq)]
pub struct VerifiedAuth {
    pub signer_did: String,
    pub key_id: String,
    pub signed_data: SignedData,
}

/// Checks the timestamp window and returns how long the nonce must be kept
///
/// The signed object stays acceptable until `timestamp + max_skew` has passed,
/// which for future timestamps is later than `now + max_skew`. One extra second
/// covers the truncation of `now` to whole seconds.
fn check_timestamp(timestamp: i64, max_skew: Duration) -> Result<Duration> {
    let now = Utc::now().timestamp();
    let max_skew = max_skew.as_secs();
    if timestamp.abs_diff(now) > max_skew {
        return Err(DIDAuthError::TimestampOutOfRange {
            timestamp,
            now,
            max_skew,
        });
    }
    let ahead = timestamp.saturating_sub(now).max(0).unsigned_abs();
    Ok(Duration::from_secs(max_skew.saturating_add(ahead).saturating_add(1)))
}

async fn resolve(resolver: &dyn DIDResolver, did: &str, force_refresh: bool) -> Result<Document> {
    resolver
        .resolve_did(did, force_refresh)
        .await?
        .ok_or_else(|| DIDAuthError::DocumentNotFound(did.to_string()))
}

/// Verifies the signature, then checks the key may authenticate
fn verify_against(signed: &SignedObject, document: &Document, separator: &str) -> Result<()> {
    verify_signature(signed, document, separator)?;
    if !document.has_relationship(
        &signed.signature.key_id,
        VerificationRelationship::Authentication,
    ) {
        return Err(DIDAuthError::KeyNotAuthorized {
            key_id: signed.signature.key_id.clone(),
        });
    }
    Ok(())
}

/// Verifies an `Authorization` header value
///
/// Steps, any failure ends verification with an error:
/// 1. parse the scheme and decode the signed object
/// 2. timestamp within `max_clock_skew` of now
/// 3. claim the nonce in the nonce store until the timestamp leaves the window
/// 4. resolve the signer's DID Document and verify the signature with the
///    named key, re-resolving once with `force_refresh` if that fails
/// 5. the key must be listed under `authentication`
pub async fn verify_auth_header(
    header: &str,
    resolver: &dyn DIDResolver,
    config: &DIDAuthVerifyConfig,
) -> Result<VerifiedAuth> {
    let _span = span!(Level::DEBUG, "verify_auth_header");

    async move {
        let signed = parse_authorization_header(header)?;
        let signer_did = signed.signature.signer_did.clone();
        debug!(%signer_did, key_id = %signed.signature.key_id, "verifying DIDAuth header");

        let nonce_ttl = check_timestamp(signed.signed_data.timestamp, config.max_clock_skew)?;

        if !config
            .nonce_store
            .try_store_nonce(
                &signer_did,
                &config.domain_separator,
                &signed.signed_data.nonce,
                nonce_ttl,
            )
            .await
        {
            warn!(%signer_did, nonce = %signed.signed_data.nonce, "replayed nonce");
            return Err(DIDAuthError::NonceReplayed {
                did: signer_did,
                nonce: signed.signed_data.nonce,
            });
        }

        let document = resolve(resolver, &signer_did, false).await?;
        if let Err(first) = verify_against(&signed, &document, &config.domain_separator) {
            debug!(
                %signer_did,
                error = %first,
                "verification failed, retrying with fresh document"
            );
            let document = resolve(resolver, &signer_did, true).await?;
            verify_against(&signed, &document, &config.domain_separator)?;
        }

        debug!(%signer_did, "DIDAuth header verified");
        Ok(VerifiedAuth {
            signer_did,
            key_id: signed.signature.key_id,
            signed_data: signed.signed_data,
        })
    }
    .instrument(_span)
    .await
}
