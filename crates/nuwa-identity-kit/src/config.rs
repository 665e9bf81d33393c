/*!
 * Identity Kit Configuration options
 */

use std::sync::Arc;

use nuwa_did_authentication::DIDAUTH_DOMAIN_SEPARATOR;
use nuwa_vdr::VDRRegistry;

#[derive(Clone)]
pub struct IdentityKitConfig {
    pub(crate) registry: Arc<VDRRegistry>,
    pub(crate) domain_separator: String,
}

impl IdentityKitConfig {
    /// Returns a builder for `IdentityKitConfig`
    /// Example:
    /// ```
    /// use nuwa_identity_kit::config::IdentityKitConfig;
    ///
    /// let config = IdentityKitConfig::builder().build();
    /// ```
    pub fn builder() -> IdentityKitConfigBuilder {
        IdentityKitConfigBuilder::default()
    }

    pub fn registry(&self) -> &Arc<VDRRegistry> {
        &self.registry
    }

    pub fn domain_separator(&self) -> &str {
        &self.domain_separator
    }
}

impl Default for IdentityKitConfig {
    fn default() -> Self {
        IdentityKitConfigBuilder::default().build()
    }
}

/// Builder for `IdentityKitConfig`.
/// Example:
/// ```
/// use std::sync::Arc;
/// use nuwa_identity_kit::{config::IdentityKitConfig, vdr::{KeyVDR, VDRRegistry}};
///
/// let registry = Arc::new(VDRRegistry::new().with_vdr(Arc::new(KeyVDR::default())));
/// let config = IdentityKitConfig::builder().with_registry(registry).build();
/// ```
#[derive(Default)]
pub struct IdentityKitConfigBuilder {
    /// Registry used to resolve and publish
    /// Default: the process wide [VDRRegistry::global]
    registry: Option<Arc<VDRRegistry>>,

    /// Domain separator of DIDAuth headers created by the kit
    /// Default: `DIDAuthV1:`
    domain_separator: Option<String>,
}

impl IdentityKitConfigBuilder {
    pub fn with_registry(mut self, registry: Arc<VDRRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_domain_separator(mut self, domain_separator: impl Into<String>) -> Self {
        self.domain_separator = Some(domain_separator.into());
        self
    }

    pub fn build(self) -> IdentityKitConfig {
        IdentityKitConfig {
            registry: self.registry.unwrap_or_else(VDRRegistry::global),
            domain_separator: self
                .domain_separator
                .unwrap_or_else(|| DIDAUTH_DOMAIN_SEPARATOR.to_string()),
        }
    }
}
