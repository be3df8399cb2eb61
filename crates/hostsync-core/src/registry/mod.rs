//! Plugin-based provider registry
//!
//! The registry maps provider type names to factories, so the binary can
//! turn a tagged [`ProviderConfig`] into a provider without an if-else chain
//! over concrete types.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hostsync_core::registry::ProviderRegistry;
//!
//! let registry = ProviderRegistry::with_builtin();
//! hostsync_provider_url::register(&registry);
//! hostsync_provider_sql::register(&registry);
//!
//! let provider = registry.create_provider(&resolved.provider)?;
//! let entries = provider.get_host_entries().await?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a `register()` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_provider("url", Box::new(UrlProviderFactory));
//! }
//! ```

use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use crate::providers::ConfigProviderFactory;
use crate::traits::{HostProvider, HostProviderFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Provider registry for plugin-based provider creation
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered provider factories
    providers: RwLock<HashMap<String, Box<dyn HostProviderFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the in-core `config` provider registered
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        registry.register_provider("config", Box::new(ConfigProviderFactory));
        registry
    }

    /// Register a provider factory
    ///
    /// Registering a name twice replaces the earlier factory.
    pub fn register_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn HostProviderFactory>,
    ) {
        let name = name.into();
        tracing::debug!("Registering provider factory: {}", name);
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name, factory);
    }

    /// Create a provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn HostProvider>)`: Created provider instance
    /// - `Err(Error::Unsupported)`: If no factory is registered for the type
    /// - `Err(Error)`: If the factory rejects the configuration
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn HostProvider>> {
        let provider_type = config.type_name();
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers.get(provider_type).ok_or_else(|| {
            Error::unsupported(format!("Provider {} not supported", provider_type))
        })?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut names: Vec<String> = providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }
}
