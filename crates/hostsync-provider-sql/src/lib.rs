//! SQL host provider
//!
//! Runs a caller-supplied query that returns `(ip, fqdn)` rows and turns
//! each row into a [`HostEntry`]. Only the `sqlite` driver is available.
//!
//! The database is opened read-only for the duration of one call; the
//! connection and statement are dropped on every exit path. Queries run on
//! the blocking thread pool so the async runtime is never stalled.

use async_trait::async_trait;
use hostsync_core::config::ProviderConfig;
use hostsync_core::traits::{HostProvider, HostProviderFactory};
use hostsync_core::{Error, HostEntry, Result};
use rusqlite::{Connection, OpenFlags};

/// Name under which this provider registers
pub const PROVIDER_NAME: &str = "sql";

/// Supported database driver
pub const SQLITE_DRIVER: &str = "sqlite";

/// Provider reading entries from a SQL query
#[derive(Debug, Clone)]
pub struct SqlProvider {
    driver: String,
    data_source: String,
    query: String,
}

impl SqlProvider {
    /// Create a new SQL provider
    ///
    /// # Parameters
    ///
    /// - `driver`: Database driver tag; must be `sqlite`
    /// - `data_source`: Database file path or `file:` URI
    /// - `query`: Query returning an IP column and an FQDN column
    pub fn new(
        driver: impl Into<String>,
        data_source: impl Into<String>,
        query: impl Into<String>,
    ) -> Result<Self> {
        let driver = driver.into();
        if !driver.eq_ignore_ascii_case(SQLITE_DRIVER) {
            return Err(Error::unsupported(format!(
                "unsupported DB type: {}",
                driver
            )));
        }

        Ok(Self {
            driver,
            data_source: data_source.into(),
            query: query.into(),
        })
    }

    fn query_entries(&self) -> Result<Vec<HostEntry>> {
        let conn = Connection::open_with_flags(
            &self.data_source,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|e| source_error(format!("Failed to open {}: {}", self.data_source, e)))?;

        let mut stmt = conn
            .prepare(&self.query)
            .map_err(|e| source_error(format!("Invalid query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let ip: String = row.get(0)?;
                let fqdn: String = row.get(1)?;
                Ok((ip, fqdn))
            })
            .map_err(|e| source_error(format!("Query failed: {}", e)))?;

        let mut entries = Vec::new();
        for row in rows {
            let (ip, fqdn) = row.map_err(|e| source_error(format!("Bad row: {}", e)))?;
            let (domain, subdomains) = split_fqdn(&fqdn);
            entries.push(HostEntry::new(ip, domain).with_subdomains(subdomains));
        }

        Ok(entries)
    }
}

#[async_trait]
impl HostProvider for SqlProvider {
    async fn get_host_entries(&self) -> Result<Vec<HostEntry>> {
        tracing::debug!(driver = %self.driver, "Querying host entries from {}", self.data_source);

        let provider = self.clone();
        let entries = tokio::task::spawn_blocking(move || provider.query_entries())
            .await
            .map_err(|e| source_error(format!("Query task failed: {}", e)))??;

        tracing::debug!("Query returned {} entries", entries.len());
        Ok(entries)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

fn source_error(message: String) -> Error {
    Error::source_unavailable(PROVIDER_NAME, message)
}

/// Split an FQDN into a base domain and subdomain list.
///
/// The rightmost two labels form the domain. Everything to the left, if
/// anything, becomes one combined subdomain label. A name with fewer than
/// two labels is returned whole with no subdomains. One trailing root dot
/// is ignored.
///
/// ```
/// use hostsync_provider_sql::split_fqdn;
///
/// assert_eq!(split_fqdn("a.b.example.com"), ("example.com".to_string(), vec!["a.b".to_string()]));
/// assert_eq!(split_fqdn("example.com"), ("example.com".to_string(), vec![]));
/// assert_eq!(split_fqdn("localhost"), ("localhost".to_string(), vec![]));
/// ```
pub fn split_fqdn(fqdn: &str) -> (String, Vec<String>) {
    let fqdn = fqdn.strip_suffix('.').unwrap_or(fqdn);
    let labels: Vec<&str> = fqdn.split('.').collect();
    if labels.len() < 2 {
        return (fqdn.to_string(), Vec::new());
    }

    let split = labels.len() - 2;
    let domain = labels[split..].join(".");
    if split == 0 {
        return (domain, Vec::new());
    }

    (domain, vec![labels[..split].join(".")])
}

/// Factory for creating SQL providers
pub struct SqlProviderFactory;

impl HostProviderFactory for SqlProviderFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn HostProvider>> {
        match config {
            ProviderConfig::Sql {
                driver,
                data_source,
                query,
            } => {
                config.validate()?;
                Ok(Box::new(SqlProvider::new(
                    driver.clone(),
                    data_source.clone(),
                    query.clone(),
                )?))
            }
            _ => Err(Error::config("Invalid config for SQL provider")),
        }
    }
}

/// Register the SQL provider with a registry
pub fn register(registry: &hostsync_core::ProviderRegistry) {
    registry.register_provider(PROVIDER_NAME, Box::new(SqlProviderFactory));
}
