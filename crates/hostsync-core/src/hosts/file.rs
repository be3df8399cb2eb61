// # Hosts File
//
// Reads the system hosts file, swaps out the managed region, and writes the
// result back.
//
// ## Atomic Writes
//
// New content is written to a sibling temporary file, flushed to disk, given
// mode 0644, and renamed over the original. A failed write leaves the
// original file untouched; the temporary file is removed on a best-effort
// basis.
//
// When the hosts path is a symlink, the link is resolved first and the
// rename targets the real file, so the link itself survives.
//
// The file is handled as bytes; lines outside the managed region need not
// be valid UTF-8.
//
// ## Ordering
//
// The file is read before the provider is queried, and the provider result
// is in hand before anything is written. A provider error therefore never
// touches the file.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::entry::HostEntry;
use crate::error::{Error, Result};
use crate::traits::HostProvider;

use super::{is_managed, merge, split_lines, system_hosts_path};

/// Mode for the rewritten hosts file
#[cfg(unix)]
const HOSTS_FILE_MODE: u32 = 0o644;

/// Handle on a hosts file
///
/// # Permissions
///
/// The system hosts file is normally writable by root only. The caller is
/// responsible for privilege elevation.
///
/// # Example
///
/// ```rust,no_run
/// use hostsync_core::HostsFile;
/// use hostsync_core::providers::ConfigProvider;
/// use hostsync_core::HostEntry;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let provider = ConfigProvider::from_entries(vec![
///         HostEntry::new("10.0.0.5", "nas.lan").with_subdomains(["files", "backup"]),
///     ]);
///
///     let entries = HostsFile::new().update(&provider).await?;
///     assert_eq!(entries.len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct HostsFile {
    path: PathBuf,
}

impl HostsFile {
    /// Target the platform's system hosts file
    pub fn new() -> Self {
        Self {
            path: system_hosts_path(),
        }
    }

    /// Target a custom file (useful for testing)
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the hosts file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the managed region with the provider's current entries
    ///
    /// # Returns
    ///
    /// The provider's entries, for reuse by a later git sync.
    ///
    /// # Errors
    ///
    /// - [`Error::Read`] if the file cannot be read
    /// - whatever the provider returns, with no write performed
    /// - [`Error::Write`] if the new content cannot be written
    pub async fn update(&self, provider: &dyn HostProvider) -> Result<Vec<HostEntry>> {
        let existing = self.read().await?;

        let entries = provider.get_host_entries().await?;
        tracing::debug!(
            "Provider {} returned {} entries",
            provider.provider_name(),
            entries.len()
        );

        let content = merge(&existing, &entries);
        self.write_atomic(&content).await?;

        tracing::info!(
            path = %self.path.display(),
            entries = entries.len(),
            "Updated hosts file"
        );
        Ok(entries)
    }

    /// Remove the managed region, keeping every other line
    ///
    /// Returns the number of lines removed. The file is not rewritten when
    /// there is nothing to remove.
    pub async fn clear(&self) -> Result<usize> {
        let existing = self.read().await?;
        let removed = split_lines(&existing).filter(|line| is_managed(line)).count();

        if removed == 0 {
            tracing::debug!("No managed lines in {}", self.path.display());
            return Ok(0);
        }

        self.write_atomic(&merge(&existing, &[])).await?;
        tracing::info!(
            path = %self.path.display(),
            removed,
            "Removed managed hosts entries"
        );
        Ok(removed)
    }

    /// Lines currently in the managed region
    pub async fn managed_lines(&self) -> Result<Vec<String>> {
        let existing = self.read().await?;
        Ok(split_lines(&existing)
            .filter(|line| is_managed(line))
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect())
    }

    async fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path)
            .await
            .map_err(|source| Error::Read {
                path: self.path.clone(),
                source,
            })
    }

    /// Write `content` to a temporary sibling, then rename it into place
    async fn write_atomic(&self, content: &[u8]) -> Result<()> {
        let target = fs::canonicalize(&self.path)
            .await
            .map_err(|source| Error::Write {
                path: self.path.clone(),
                source,
            })?;
        let temp_path = temp_path_for(&target);

        if let Err(source) = Self::write_temp(&temp_path, content).await {
            Self::discard_temp(&temp_path).await;
            return Err(Error::Write {
                path: temp_path,
                source,
            });
        }

        if let Err(source) = fs::rename(&temp_path, &target).await {
            Self::discard_temp(&temp_path).await;
            return Err(Error::Write {
                path: target,
                source,
            });
        }

        tracing::trace!("Hosts file written: {}", target.display());
        Ok(())
    }

    async fn write_temp(temp_path: &Path, content: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp_path, std::fs::Permissions::from_mode(HOSTS_FILE_MODE))
                .await?;
        }

        Ok(())
    }

    async fn discard_temp(temp_path: &Path) {
        if let Err(e) = fs::remove_file(temp_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to remove {}: {}", temp_path.display(), e);
            }
        }
    }
}

/// Get path to temporary file for atomic writes
fn temp_path_for(target: &Path) -> PathBuf {
    let mut temp = target.as_os_str().to_owned();
    temp.push(".hostsync.tmp");
    PathBuf::from(temp)
}

impl Default for HostsFile {
    fn default() -> Self {
        Self::new()
    }
}
