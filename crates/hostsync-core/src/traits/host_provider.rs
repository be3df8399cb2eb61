// # Host Provider Trait
//
// Defines the interface for sources of host entries.
//
// ## Implementations
//
// - Static/config: `hostsync_core::providers::ConfigProvider`
// - URL: `hostsync-provider-url` crate
// - SQL: `hostsync-provider-sql` crate
//
// ## Usage
//
// ```rust,ignore
// use hostsync_core::HostProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* HostProvider implementation */;
//
//     for entry in provider.get_host_entries().await? {
//         println!("{} -> {:?}", entry.ip, entry.hostnames());
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::entry::HostEntry;

/// Trait for host entry sources
///
/// A provider turns one backing source (inline config, a file, an HTTP
/// endpoint, a database query) into a list of [`HostEntry`] values. The
/// consumer never needs to know which variant it holds.
///
/// # Contract
///
/// - Single attempt per call: no retry, no backoff
/// - No side effects beyond reading the source
/// - Every handle opened during the call is released before it returns,
///   on success and on error
/// - Entries are built fresh on each call
#[async_trait]
pub trait HostProvider: Send + Sync {
    /// Fetch the current host entries
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<HostEntry>)`: Entries in source order
    /// - `Err(Error)`: If the source is unreachable or malformed
    async fn get_host_entries(&self) -> Result<Vec<HostEntry>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing host providers from configuration
pub trait HostProviderFactory: Send + Sync {
    /// Create a HostProvider instance from configuration
    ///
    /// Returns an error if the configuration variant does not belong to
    /// this factory or is incomplete.
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn HostProvider>, crate::Error>;
}
