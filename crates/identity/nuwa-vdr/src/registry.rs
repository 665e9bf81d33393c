//! Method name to registry mapping
//!
//! A [VDRRegistry] is an ordinary value that components share through an
//! `Arc`. [VDRRegistry::global] returns a process-wide default instance for
//! call sites that have no registry handed to them.

use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use ahash::AHashMap as HashMap;
use async_trait::async_trait;
use nuwa_did_common::{DID, Document, split_fragment};
use tracing::debug;

use crate::{
    errors::{Result, VDRError},
    resolver::DIDResolver,
    types::{CADOPCreationRequest, DIDCreationRequest, DIDCreationResult, MutationOptions},
    vdr::VDR,
};

static GLOBAL: OnceLock<Arc<VDRRegistry>> = OnceLock::new();

#[derive(Default)]
pub struct VDRRegistry {
    vdrs: RwLock<HashMap<String, Arc<dyn VDR>>>,
}

impl VDRRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default registry, created empty on first use
    pub fn global() -> Arc<VDRRegistry> {
        GLOBAL.get_or_init(|| Arc::new(VDRRegistry::new())).clone()
    }

    pub fn with_vdr(self, vdr: Arc<dyn VDR>) -> Self {
        self.register_vdr(vdr);
        self
    }

    /// Registers `vdr` for its method, replacing any previous registration
    pub fn register_vdr(&self, vdr: Arc<dyn VDR>) {
        let method = vdr.method().to_string();
        debug!(%method, "registering VDR");
        self.vdrs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method, vdr);
    }

    pub fn get_vdr(&self, method: &str) -> Option<Arc<dyn VDR>> {
        self.vdrs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned()
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<String> {
        let mut methods: Vec<String> = self
            .vdrs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        methods.sort();
        methods
    }

    fn require(&self, method: &str) -> Result<Arc<dyn VDR>> {
        self.get_vdr(method)
            .ok_or_else(|| VDRError::NoVdrForMethod(method.to_string()))
    }

    /// The registry for `did`, with any fragment stripped from the DID
    pub fn vdr_for_did<'a>(&self, did: &'a str) -> Result<(Arc<dyn VDR>, &'a str)> {
        let (did, _) = split_fragment(did);
        let parsed: DID = did.parse()?;
        Ok((self.require(parsed.method().name())?, did))
    }

    pub async fn resolve_did(&self, did: &str) -> Result<Option<Document>> {
        let (vdr, did) = self.vdr_for_did(did)?;
        vdr.resolve(did).await
    }

    pub async fn exists(&self, did: &str) -> Result<bool> {
        let (vdr, did) = self.vdr_for_did(did)?;
        vdr.exists(did).await
    }

    pub async fn create_did(
        &self,
        method: &str,
        request: &DIDCreationRequest,
        options: Option<&MutationOptions>,
    ) -> Result<DIDCreationResult> {
        self.require(method)?.create(request, options).await
    }

    pub async fn create_did_via_cadop(
        &self,
        method: &str,
        request: &CADOPCreationRequest,
        options: &MutationOptions,
    ) -> Result<DIDCreationResult> {
        self.require(method)?.create_via_cadop(request, options).await
    }
}

#[async_trait]
impl DIDResolver for VDRRegistry {
    async fn resolve_did(&self, did: &str, _force_refresh: bool) -> Result<Option<Document>> {
        VDRRegistry::resolve_did(self, did).await
    }
}
