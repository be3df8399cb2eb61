//! Host entry model and exchange format
//!
//! A [`HostEntry`] is the only type that moves between providers, the hosts
//! file merger, and the git snapshot. The exchange format is YAML:
//!
//! ```yaml
//! - ip: 10.0.0.5
//!   domain: nas.lan
//!   subdomains:
//!     - files
//!     - backup
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One `(ip, domain, subdomains)` override record
///
/// The IP is carried as a string and is not validated: whatever a provider
/// returns is written to the hosts file verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// IP literal (IPv4 or IPv6)
    pub ip: String,

    /// Base domain (e.g. "nas.lan")
    pub domain: String,

    /// Subdomain labels, in order
    #[serde(default)]
    pub subdomains: Vec<String>,
}

impl HostEntry {
    /// Create an entry with no subdomains
    pub fn new(ip: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            domain: domain.into(),
            subdomains: Vec::new(),
        }
    }

    /// Set the subdomain labels
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Hostnames this entry resolves to.
    ///
    /// Without subdomains this is just the domain. With subdomains it is one
    /// `sub.domain` per label and the bare domain is left out.
    pub fn hostnames(&self) -> Vec<String> {
        if self.subdomains.is_empty() {
            return vec![self.domain.clone()];
        }

        self.subdomains
            .iter()
            .map(|sub| format!("{}.{}", sub, self.domain))
            .collect()
    }
}

/// Accepted shapes of an entry document
#[derive(Deserialize)]
#[serde(untagged)]
enum EntryDocument {
    /// Bare list of entries
    List(Vec<HostEntry>),

    /// Mapping with the entries under `data` (the config file layout)
    Document {
        #[serde(alias = "host")]
        data: Vec<HostEntry>,
    },
}

/// Parse an entry document.
///
/// Accepts either a bare YAML list or a mapping holding the list under
/// `data` (or `host`), so a full config file can double as a data file.
/// Empty input yields no entries.
pub fn parse_entries(text: &str) -> Result<Vec<HostEntry>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: EntryDocument = serde_yaml::from_str(text)
        .map_err(|e| Error::parse(format!("Invalid host entry document: {}", e)))?;

    Ok(match document {
        EntryDocument::List(entries) => entries,
        EntryDocument::Document { data } => data,
    })
}

/// Serialize entries to the exchange format (a bare YAML list)
pub fn to_yaml(entries: &[HostEntry]) -> Result<String> {
    serde_yaml::to_string(entries)
        .map_err(|e| Error::parse(format!("Failed to serialize host entries: {}", e)))
}
