//! Configuration types for hostsync
//!
//! Two layers live here:
//!
//! - [`HostsConfig`]: the YAML config file as written by the operator, where
//!   every value is optional
//! - [`ResolvedConfig`]: the fully merged, validated bundle handed to the
//!   core, with the provider selected through the tagged [`ProviderConfig`]
//!
//! CLI flags are folded in by [`HostsConfig::resolve`] using
//! [`override_param`]; nothing here reads process-global state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::entry::HostEntry;
use crate::error::{Error, Result};

/// Default request timeout for the URL provider
pub const DEFAULT_URL_TIMEOUT_SECS: u64 = 30;

/// Return the effective value of a parameter that may come from both the
/// config file and the command line. The command line wins.
pub fn override_param<T>(config: Option<T>, cli: Option<T>) -> Option<T> {
    cli.or(config)
}

/// Provider kinds understood by hostsync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Entries from the config file or a local data file
    Config,
    /// Entries fetched over HTTP
    Url,
    /// Entries from a SQL query
    Sql,
}

impl ProviderKind {
    /// Lowercase name used in config files and the registry
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Config => "config",
            ProviderKind::Url => "url",
            ProviderKind::Sql => "sql",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "config" => Ok(ProviderKind::Config),
            "url" => Ok(ProviderKind::Url),
            "sql" => Ok(ProviderKind::Sql),
            _ => Err(Error::unsupported(format!("Provider {} not supported", s))),
        }
    }
}

/// Resolved provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Static entries
    Config {
        /// Inline entries (from the config file's `data` section)
        #[serde(default)]
        entries: Vec<HostEntry>,
        /// Data file read at call time; takes precedence over `entries`
        #[serde(default)]
        path: Option<PathBuf>,
    },

    /// HTTP endpoint returning an entry document
    Url {
        /// URL to GET
        url: String,
        /// Value sent as `Authorization: token <value>`
        #[serde(default)]
        token: String,
        /// Request timeout in seconds
        #[serde(default = "default_url_timeout_secs")]
        timeout_secs: u64,
    },

    /// SQL query returning `(ip, fqdn)` rows
    Sql {
        /// Database driver tag (only "sqlite" is supported)
        driver: String,
        /// Driver-specific data source (a file path for sqlite)
        data_source: String,
        /// Query to execute
        query: String,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::Config { entries, path } => {
                if entries.is_empty() && path.is_none() {
                    return Err(Error::config("hosts data is missing"));
                }
                Ok(())
            }
            ProviderConfig::Url {
                url, timeout_secs, ..
            } => {
                if url.trim().is_empty() {
                    return Err(Error::config("URL is missing"));
                }
                if *timeout_secs == 0 {
                    return Err(Error::config("URL timeout must be > 0"));
                }
                Ok(())
            }
            ProviderConfig::Sql {
                driver,
                data_source,
                query,
            } => {
                if data_source.trim().is_empty() {
                    return Err(Error::config("data source is missing"));
                }
                if driver.trim().is_empty() {
                    return Err(Error::config("database type is missing"));
                }
                if query.trim().is_empty() {
                    return Err(Error::config("SQL query is missing"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider kind
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::Config { .. } => ProviderKind::Config,
            ProviderConfig::Url { .. } => ProviderKind::Url,
            ProviderConfig::Sql { .. } => ProviderKind::Sql,
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &'static str {
        self.kind().as_str()
    }
}

fn default_url_timeout_secs() -> u64 {
    DEFAULT_URL_TIMEOUT_SECS
}

/// Git remote used for snapshots
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitConfig {
    /// Remote URL
    pub url: String,
    /// Token sent as the basic-auth password
    #[serde(default)]
    pub token: String,
}

impl GitConfig {
    /// Create a git configuration
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }
}

// Custom Debug implementation that hides the token
impl fmt::Debug for GitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitConfig")
            .field("url", &self.url)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Config file layout
///
/// ```yaml
/// provider:
///   type: url
///   url-params:
///     url: https://example.com/hosts.yml
///     token: secret
/// git:
///   push: true
///   url: https://example.com/me/hosts.git
///   token: secret
/// data:
///   - ip: 10.0.0.5
///     domain: nas.lan
///     subdomains: [files, backup]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostsConfig {
    /// Provider selection and parameters
    pub provider: ProviderSection,

    /// Git snapshot settings
    pub git: GitSection,

    /// Inline entries for the config provider
    pub data: Vec<HostEntry>,
}

/// `provider` section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProviderSection {
    /// Provider kind (config, url, sql; case-insensitive)
    #[serde(rename = "type")]
    pub kind: Option<String>,

    /// Parameters for the URL provider
    pub url_params: UrlParams,

    /// Parameters for the SQL provider
    pub sql_params: SqlParams,
}

/// `provider.url-params` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UrlParams {
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// `provider.sql-params` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlParams {
    #[serde(rename = "type")]
    pub driver: Option<String>,
    #[serde(alias = "data-source")]
    pub datasource: Option<String>,
    pub query: Option<String>,
}

/// `git` section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSection {
    pub push: Option<bool>,
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Values supplied on the command line
///
/// `path` is overloaded the same way the `--path` flag is: data file for the
/// config provider, URL for the URL provider, data source for SQL.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub path: Option<String>,
    pub token: Option<String>,
    pub db_type: Option<String>,
    pub query: Option<String>,
    pub push: Option<bool>,
    pub git_url: Option<String>,
    pub git_token: Option<String>,
}

/// Fully merged configuration handed to the core
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Selected provider
    pub provider: ProviderConfig,

    /// Git remote, present only when a push was requested
    pub git: Option<GitConfig>,
}

impl HostsConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&text).map_err(|e| {
            Error::config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse a config document
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Merge command-line overrides into this config and validate the result
    ///
    /// # Errors
    ///
    /// - [`Error::Unsupported`] for an unknown provider kind
    /// - [`Error::Config`] for missing provider parameters or a push request
    ///   without a git URL
    pub fn resolve(self, overrides: Overrides) -> Result<ResolvedConfig> {
        let HostsConfig {
            provider: section,
            git,
            data,
        } = self;

        let kind: ProviderKind = override_param(section.kind, overrides.provider)
            .ok_or_else(|| Error::config("provider type is missing"))?
            .parse()?;

        let provider = match kind {
            ProviderKind::Config => ProviderConfig::Config {
                entries: data,
                path: overrides.path.map(PathBuf::from),
            },
            ProviderKind::Url => {
                let params = section.url_params;
                ProviderConfig::Url {
                    url: override_param(params.url, overrides.path).unwrap_or_default(),
                    token: override_param(params.token, overrides.token).unwrap_or_default(),
                    timeout_secs: params.timeout_secs.unwrap_or(DEFAULT_URL_TIMEOUT_SECS),
                }
            }
            ProviderKind::Sql => {
                let params = section.sql_params;
                ProviderConfig::Sql {
                    driver: override_param(params.driver, overrides.db_type).unwrap_or_default(),
                    data_source: override_param(params.datasource, overrides.path)
                        .unwrap_or_default(),
                    query: override_param(params.query, overrides.query).unwrap_or_default(),
                }
            }
        };
        provider.validate()?;

        let push = override_param(git.push, overrides.push).unwrap_or(false);
        let git = if push {
            let url = override_param(git.url, overrides.git_url)
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| Error::config("git URL is missing"))?;
            let token = override_param(git.token, overrides.git_token).unwrap_or_default();
            Some(GitConfig { url, token })
        } else {
            None
        };

        Ok(ResolvedConfig { provider, git })
    }
}
