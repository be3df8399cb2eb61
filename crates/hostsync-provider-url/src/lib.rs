// # URL Host Provider
//
// Fetches a host-entry document over HTTP and hands the parsed entries to
// the hosts-file merger.
//
// ## Request
//
// One GET per call. The token is always sent as
// `Authorization: token <value>`, even when empty. The request carries a timeout; there are
// no retries and no caching.
//
// ## Response
//
// Anything other than `200 OK` is an error. The body is parsed as a YAML
// entry document: either a bare list or a mapping with a `data` key.
//
// ## Security
//
// The token never appears in logs or in `Debug` output.

use async_trait::async_trait;
use hostsync_core::config::ProviderConfig;
use hostsync_core::entry::parse_entries;
use hostsync_core::traits::{HostProvider, HostProviderFactory};
use hostsync_core::{Error, HostEntry, Result};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

/// Name under which this provider registers
pub const PROVIDER_NAME: &str = "url";

/// Provider reading entries from an HTTP endpoint
pub struct UrlProvider {
    /// Endpoint to GET
    url: String,

    /// Optional access token
    /// ⚠️ NEVER log this value
    token: String,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

// Custom Debug implementation that hides the token
impl std::fmt::Debug for UrlProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlProvider")
            .field("url", &self.url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl UrlProvider {
    /// Create a new URL provider
    ///
    /// # Parameters
    ///
    /// - `url`: Endpoint serving the entry document
    /// - `token`: Access token sent in the `Authorization` header
    /// - `timeout`: Whole-request timeout
    pub fn new(url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            token: token.into(),
            client,
        })
    }

    /// Create a URL provider with a caller-built client
    pub fn with_client(
        url: impl Into<String>,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            client,
        }
    }

    /// Endpoint this provider reads from
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String> {
        let request = self
            .client
            .get(&self.url)
            .header(AUTHORIZATION, format!("token {}", self.token));

        let response = request.send().await.map_err(|e| {
            Error::source_unavailable(PROVIDER_NAME, format!("Request failed: {}", e))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::HttpStatus {
                url: self.url.clone(),
                status: status.to_string(),
            });
        }

        response.text().await.map_err(|e| {
            Error::source_unavailable(PROVIDER_NAME, format!("Failed to read response: {}", e))
        })
    }
}

#[async_trait]
impl HostProvider for UrlProvider {
    async fn get_host_entries(&self) -> Result<Vec<HostEntry>> {
        tracing::debug!("Fetching host entries from {}", self.url);

        let body = self.fetch().await?;
        let entries = parse_entries(&body)?;

        tracing::debug!("Fetched {} entries from {}", entries.len(), self.url);
        Ok(entries)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Factory for creating URL providers
pub struct UrlProviderFactory;

impl HostProviderFactory for UrlProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn HostProvider>> {
        match config {
            ProviderConfig::Url {
                url,
                token,
                timeout_secs,
            } => {
                config.validate()?;
                Ok(Box::new(UrlProvider::new(
                    url.clone(),
                    token.clone(),
                    Duration::from_secs(*timeout_secs),
                )?))
            }
            _ => Err(Error::config("Invalid config for URL provider")),
        }
    }
}

/// Register the URL provider with a registry
///
/// # Example
///
/// ```rust
/// use hostsync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::with_builtin();
/// hostsync_provider_url::register(&registry);
/// assert!(registry.has_provider("url"));
/// ```
pub fn register(registry: &hostsync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(UrlProviderFactory));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_config(url: &str) -> ProviderConfig {
        ProviderConfig::Url {
            url: url.to_string(),
            token: "secret-token".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_factory_creation() {
        let provider = UrlProviderFactory
            .create(&url_config("http://127.0.0.1:1/hosts.yml"))
            .unwrap();
        assert_eq!(provider.provider_name(), "url");
    }

    #[test]
    fn test_factory_missing_url() {
        let err = UrlProviderFactory.create(&url_config("")).err().unwrap();
        assert_eq!(err.to_string(), "Configuration error: URL is missing");
    }

    #[test]
    fn test_factory_rejects_other_config() {
        let config = ProviderConfig::Config {
            entries: Vec::new(),
            path: None,
        };
        assert!(UrlProviderFactory.create(&config).is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let provider =
            UrlProvider::new("http://hosts.lan/hosts.yml", "secret-token", Duration::from_secs(1))
                .unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<REDACTED>"));
    }

    #[test]
    fn test_register() {
        let registry = hostsync_core::ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_provider("url"));
    }
}
