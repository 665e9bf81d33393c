/*!
 * Verifiable Data Registry (VDR) abstraction.
 *
 * A [VDR] resolves and mutates the DID documents of one DID method. Every
 * mutation follows the same sequence: resolve the current document, check the
 * signing key holds the relationship the operation requires, validate the
 * input, apply the change to a copy and publish it.
 *
 * Registries provided here:
 * - [KeyVDR]: `did:key`, documents derived from the identifier and cached in memory
 * - [WebVDR]: `did:web`, documents fetched over HTTPS and published through a caller
 *   supplied uploader
 * - [RoochVDR]: `did:rooch`, documents stored as on-chain objects
 *
 * [VDRRegistry] maps method names to registries and [CachedResolver] adds a
 * TTL cache in front of resolution.
 */

pub mod base;
pub mod errors;
pub mod key;
pub mod registry;
pub mod resolver;
pub mod rooch;
pub mod types;
pub mod vdr;
pub mod web;

pub use errors::{Result, VDRError};
pub use key::{KeyVDR, KeyVDRConfig, KeyVDRConfigBuilder};
pub use registry::VDRRegistry;
pub use resolver::{CachedResolver, CachedResolverConfig, CachedResolverConfigBuilder, DIDResolver};
pub use rooch::{RoochClient, RoochVDR, RoochVDRConfig, RoochVDRConfigBuilder};
pub use types::{
    CADOPCreationRequest, DIDCreationRequest, DIDCreationResult, MutationOptions, Operation,
};
pub use vdr::VDR;
pub use web::{DocumentUploader, WebVDR, WebVDRConfig, WebVDRConfigBuilder, did_to_url};
