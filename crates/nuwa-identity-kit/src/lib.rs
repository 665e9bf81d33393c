/*!
 * Nuwa Identity Kit
 *
 * Manage a single DID with many keys: publish its DID Document, add and remove
 * keys and services under the verification relationship permission model,
 * sign data and create DIDAuth headers.
 *
 * ```ignore
 * use std::sync::Arc;
 * use nuwa_identity_kit::{IdentityKit, IdentityKitConfig, IdentityKitOptions};
 * use nuwa_identity_kit::vdr::{KeyVDR, VDRRegistry};
 *
 * let registry = Arc::new(VDRRegistry::new().with_vdr(Arc::new(KeyVDR::default())));
 * let config = IdentityKitConfig::builder().with_registry(registry).build();
 * let kit = IdentityKit::from_existing_did(&did, signer, config).await?;
 * let header = kit.create_did_auth_header("ping", json!({}), &key_id).await?;
 * ```
 */

pub mod cadop;
pub mod config;
pub mod errors;
pub mod kit;

pub use cadop::CadopIdentityKit;
pub use config::{IdentityKitConfig, IdentityKitConfigBuilder};
pub use errors::{IdentityKitError, Result};
pub use kit::{IdentityKit, IdentityKitOptions, OperationalKeyInfo, ServiceInfo};

// Re-export the building blocks for convenience to applications
pub use nuwa_crypto as crypto;
pub use nuwa_did_authentication as did_auth;
pub use nuwa_did_common as did_common;
pub use nuwa_encoding as encoding;
pub use nuwa_key_manager as key_manager;
pub use nuwa_vdr as vdr;
