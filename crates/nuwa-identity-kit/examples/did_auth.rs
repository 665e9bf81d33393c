/*!
 * Walks through a did:key identity: publish, add an operational key and a
 * service, then authenticate a request with a DIDAuth header.
 *
 * RUST_LOG=debug cargo run --example did_auth -- --key-type secp256k1
 */

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use nuwa_identity_kit::{
    IdentityKit, IdentityKitConfig, IdentityKitOptions, OperationalKeyInfo, Result, ServiceInfo,
    crypto::{KeyType, provider_for},
    did_auth::{DIDAuthVerifyConfigBuilder, verify_auth_header},
    did_common::{VerificationRelationship, did_key_document},
    key_manager::KeyManager,
    vdr::{KeyVDR, VDRRegistry},
};
use serde_json::json;
use tracing_subscriber::filter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algorithm {
    Ed25519,
    Secp256k1,
    P256,
}

impl From<Algorithm> for KeyType {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Ed25519 => KeyType::Ed25519,
            Algorithm::Secp256k1 => KeyType::Secp256k1,
            Algorithm::P256 => KeyType::P256,
        }
    }
}

/// Nuwa Identity Kit walkthrough
#[derive(Parser)]
#[command(name = "did_auth")]
struct Cli {
    /// Algorithm of the master key
    #[arg(short, long, value_enum, default_value_t = Algorithm::Ed25519)]
    key_type: Algorithm,

    /// Operation name to sign
    #[arg(short, long, default_value = "ping")]
    operation: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // construct a subscriber that prints formatted traces to stdout
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter::EnvFilter::from_default_env())
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Logging setup failed, continuing without logs");
    }

    let registry = Arc::new(VDRRegistry::new().with_vdr(Arc::new(KeyVDR::default())));
    let config = IdentityKitConfig::builder()
        .with_registry(registry.clone())
        .build();

    let (manager, master_key) = KeyManager::create_with_did_key(args.key_type.into()).await?;
    let Some(did) = manager.did().await else {
        return Ok(());
    };
    println!("DID: {did}");

    let mut kit = IdentityKit::new(
        did_key_document(&did)?,
        IdentityKitOptions::with_signer(Arc::new(manager)),
        config,
    )?;
    kit.create_and_publish_if_not_exists().await?;

    let operational = provider_for(KeyType::Ed25519).generate_key_pair()?;
    let key_id = kit
        .add_operational_key_and_publish(
            OperationalKeyInfo::new(KeyType::Ed25519, operational.public_key.clone())
                .with_fragment("ops"),
            &[VerificationRelationship::Authentication],
            Some(&master_key),
        )
        .await?;
    println!("Added operational key: {key_id}");

    let service_id = kit
        .add_service_and_publish(
            ServiceInfo::new("gateway", "LLMGateway", "https://gateway.example"),
            Some(&master_key),
        )
        .await?;
    println!("Added service: {service_id}");

    let header = kit
        .create_did_auth_header(&args.operation, json!({"hello": "world"}), &master_key)
        .await?;
    println!("Authorization: {header}");

    let verify_config = DIDAuthVerifyConfigBuilder::default().build();
    let verified = verify_auth_header(&header, registry.as_ref(), &verify_config).await?;
    println!(
        "Verified {} signed by {}",
        verified.signed_data.operation, verified.key_id
    );

    println!(
        "{}",
        serde_json::to_string_pretty(kit.document()).unwrap_or_default()
    );
    Ok(())
}
