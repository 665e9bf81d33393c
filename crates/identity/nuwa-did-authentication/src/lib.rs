/*!
 * DIDAuth v1
 *
 * Stateless request authentication for DID subjects:
 * 1. The client signs `{operation, params, nonce, timestamp}` with a key of its
 *    DID Document ([create_signature]).
 * 2. The signed object travels as `Authorization: DIDAuthV1 <base64url(json)>`
 *    ([to_authorization_header]).
 * 3. The server checks the timestamp window, claims the nonce, resolves the
 *    signer's document and verifies the signature ([verify_auth_header]).
 *
 * The signing input is the domain separator followed by the RFC 8785 (JCS)
 * canonical JSON of `signed_data`.
 */

pub mod errors;
pub mod header;
pub mod nonce_store;
pub mod signature;
pub mod verify;

pub use errors::{DIDAuthError, Result};
pub use header::{parse_authorization_header, to_authorization_header};
pub use nonce_store::{InMemoryNonceStore, NonceStore};
pub use signature::{
    Payload, SignatureInfo, SignatureOptions, SignedData, SignedObject, create_signature,
    verify_signature,
};
pub use verify::{DIDAuthVerifyConfig, DIDAuthVerifyConfigBuilder, VerifiedAuth, verify_auth_header};

/// HTTP authorization scheme token
pub const AUTH_SCHEME: &str = "DIDAuthV1";

/// Default prefix of every signing input
pub const DIDAUTH_DOMAIN_SEPARATOR: &str = "DIDAuthV1:";
