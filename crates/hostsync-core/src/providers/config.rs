// # Config Provider
//
// Serves host entries that were either loaded together with the config file
// (inline `data` section) or live in a separate data file that is read on
// every call.
//
// No network access and no side effects.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::config::ProviderConfig;
use crate::entry::{HostEntry, parse_entries};
use crate::error::{Error, Result};
use crate::traits::{HostProvider, HostProviderFactory};

const PROVIDER_NAME: &str = "config";

/// Where the entries come from
#[derive(Debug, Clone)]
enum ConfigSource {
    /// Entries already in memory
    Inline(Vec<HostEntry>),
    /// Entry document on disk, parsed at call time
    File(PathBuf),
}

/// Static provider backed by configuration data
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    source: ConfigSource,
}

impl ConfigProvider {
    /// Serve a fixed list of entries
    pub fn from_entries(entries: Vec<HostEntry>) -> Self {
        Self {
            source: ConfigSource::Inline(entries),
        }
    }

    /// Serve the entries found in `path` at call time
    ///
    /// The file may be a bare entry list or a full config document with a
    /// `data` section.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ConfigSource::File(path.into()),
        }
    }
}

#[async_trait]
impl HostProvider for ConfigProvider {
    async fn get_host_entries(&self) -> Result<Vec<HostEntry>> {
        match &self.source {
            ConfigSource::Inline(entries) => Ok(entries.clone()),
            ConfigSource::File(path) => {
                tracing::debug!("Reading host entries from {}", path.display());
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::source_unavailable(
                        PROVIDER_NAME,
                        format!("Failed to read {}: {}", path.display(), e),
                    )
                })?;
                parse_entries(&text)
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating config providers
pub struct ConfigProviderFactory;

impl HostProviderFactory for ConfigProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn HostProvider>> {
        match config {
            ProviderConfig::Config {
                path: Some(path), ..
            } => Ok(Box::new(ConfigProvider::from_path(path.clone()))),
            ProviderConfig::Config { entries, path: None } => {
                Ok(Box::new(ConfigProvider::from_entries(entries.clone())))
            }
            _ => Err(Error::config("Invalid config for config provider")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn inline_entries_are_returned_in_order() {
        let entries = vec![
            HostEntry::new("10.0.0.5", "nas.lan").with_subdomains(["files", "backup"]),
            HostEntry::new("10.0.0.1", "router.lan"),
        ];
        let provider = ConfigProvider::from_entries(entries.clone());
        assert_eq!(provider.get_host_entries().await.unwrap(), entries);
    }

    #[tokio::test]
    async fn file_is_read_at_call_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.yml");
        let provider = ConfigProvider::from_path(&path);

        std::fs::write(&path, "- ip: 10.0.0.1\n  domain: a.lan\n").unwrap();
        assert_eq!(provider.get_host_entries().await.unwrap()[0].domain, "a.lan");

        std::fs::write(&path, "- ip: 10.0.0.2\n  domain: b.lan\n").unwrap();
        assert_eq!(provider.get_host_entries().await.unwrap()[0].domain, "b.lan");
    }

    #[tokio::test]
    async fn missing_file_is_source_error() {
        let provider = ConfigProvider::from_path("/nonexistent/hosts.yml");
        let err = provider.get_host_entries().await.unwrap_err();
        assert!(matches!(err, Error::Source { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts.yml");
        std::fs::write(&path, "- ip: 10.0.0.1\n  domain: [oops\n").unwrap();

        let err = ConfigProvider::from_path(&path)
            .get_host_entries()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn factory_rejects_other_variants() {
        let config = ProviderConfig::Url {
            url: "https://example.com".to_string(),
            token: String::new(),
            timeout_secs: 30,
        };
        assert!(ConfigProviderFactory.create(&config).is_err());
    }
}
