//! Command orchestration
//!
//! Wires the resolved configuration to the core: pick a provider from the
//! registry, merge its entries into the hosts file, then optionally publish
//! them to git. A git failure never rolls back the hosts-file update.

use anyhow::{Context, Result};
use hostsync_core::{Error, HostEntry, HostsConfig, HostsFile, ProviderRegistry, ResolvedConfig};
use std::path::PathBuf;

use crate::cli::HostArgs;

/// What happened on the git side of a `host` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitStatus {
    /// No push was requested
    Skipped,
    /// A new snapshot commit was pushed
    Pushed { commit_id: String },
    /// The remote already held this snapshot
    NothingToCommit,
}

/// Summary of a `host` run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub entries: usize,
    pub git: GitStatus,
}

/// Registry with every provider compiled into this binary
pub fn build_registry() -> ProviderRegistry {
    let registry = ProviderRegistry::with_builtin();

    #[cfg(feature = "url")]
    hostsync_provider_url::register(&registry);

    #[cfg(feature = "sql")]
    hostsync_provider_sql::register(&registry);

    tracing::debug!("Registered providers: {:?}", registry.list_providers());
    registry
}

/// Load the config file (if any) and merge the command-line overrides
pub fn resolve_config(args: &HostArgs) -> Result<ResolvedConfig, Error> {
    let config = match &args.config {
        Some(path) => HostsConfig::load(path)?,
        None => HostsConfig::new(),
    };
    config.resolve(args.overrides())
}

/// Run the `host` command against `hosts`
pub async fn run_host(
    registry: &ProviderRegistry,
    resolved: ResolvedConfig,
    hosts: &HostsFile,
    git_work_dir: Option<PathBuf>,
) -> Result<HostReport> {
    let provider = registry.create_provider(&resolved.provider)?;
    tracing::info!("Using {} provider", provider.provider_name());

    let entries = hosts
        .update(provider.as_ref())
        .await
        .with_context(|| format!("Failed to update {}", hosts.path().display()))?;
    tracing::info!("Hosts file updated with {} entries", entries.len());

    let git = match resolved.git {
        Some(config) => push_entries(config, entries.clone(), git_work_dir).await?,
        None => GitStatus::Skipped,
    };

    Ok(HostReport {
        entries: entries.len(),
        git,
    })
}

/// Run the `clean` command against `hosts`
pub async fn run_clean(hosts: &HostsFile) -> Result<usize> {
    let removed = hosts
        .clear()
        .await
        .with_context(|| format!("Failed to clean {}", hosts.path().display()))?;
    tracing::info!("Removed {} managed lines", removed);
    Ok(removed)
}

#[cfg(feature = "git")]
async fn push_entries(
    config: hostsync_core::GitConfig,
    entries: Vec<HostEntry>,
    work_dir: Option<PathBuf>,
) -> Result<GitStatus> {
    use hostsync_git::GitSynchronizer;

    tracing::info!("Pushing host data to {}", config.url);

    let mut sync = GitSynchronizer::new(config);
    if let Some(dir) = work_dir {
        sync = sync.with_work_dir(dir);
    }

    let result = tokio::task::spawn_blocking(move || sync.push(&entries))
        .await
        .context("Git push task failed")?;

    match result {
        Ok(outcome) => {
            tracing::info!(
                source = ?outcome.source,
                "Pushed commit {} to {}",
                outcome.commit_id,
                outcome.reference
            );
            Ok(GitStatus::Pushed {
                commit_id: outcome.commit_id,
            })
        }
        Err(e) if e.is_no_changes() => {
            tracing::info!("nothing to commit");
            Ok(GitStatus::NothingToCommit)
        }
        Err(e) => Err(anyhow::Error::new(e).context("Git push failed")),
    }
}

#[cfg(not(feature = "git"))]
async fn push_entries(
    _config: hostsync_core::GitConfig,
    _entries: Vec<HostEntry>,
    _work_dir: Option<PathBuf>,
) -> Result<GitStatus> {
    Err(Error::unsupported("git push support is not compiled in").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostsync_core::ProviderConfig;
    use tempfile::tempdir;

    fn inline_config() -> ResolvedConfig {
        ResolvedConfig {
            provider: ProviderConfig::Config {
                entries: vec![
                    HostEntry::new("10.0.0.5", "nas.lan").with_subdomains(["files", "backup"]),
                ],
                path: None,
            },
            git: None,
        }
    }

    #[test]
    fn registry_has_compiled_providers() {
        let registry = build_registry();
        assert!(registry.has_provider("config"));
        #[cfg(feature = "url")]
        assert!(registry.has_provider("url"));
        #[cfg(feature = "sql")]
        assert!(registry.has_provider("sql"));
    }

    #[test]
    fn resolve_without_config_file() {
        let args = HostArgs {
            provider: Some("config".to_string()),
            path: Some("hosts.yml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_config(&args).unwrap();
        assert_eq!(resolved.provider.type_name(), "config");
        assert!(resolved.git.is_none());
    }

    #[test]
    fn resolve_missing_config_file() {
        let args = HostArgs {
            config: Some(PathBuf::from("/nonexistent/hostsync.yaml")),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn host_updates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "127.0.0.1 localhost\n").unwrap();
        let hosts = HostsFile::with_path(&path);

        let report = run_host(&build_registry(), inline_config(), &hosts, None)
            .await
            .unwrap();

        assert_eq!(report.entries, 1);
        assert_eq!(report.git, GitStatus::Skipped);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "127.0.0.1 localhost\n\
             10.0.0.5\tfiles.nas.lan\t#by-hostsync\n\
             10.0.0.5\tbackup.nas.lan\t#by-hostsync\n"
        );

        assert_eq!(run_clean(&hosts).await.unwrap(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "127.0.0.1 localhost\n");
    }

    #[cfg(feature = "git")]
    #[tokio::test]
    async fn host_pushes_then_reports_nothing_to_commit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "").unwrap();
        let hosts = HostsFile::with_path(&path);

        let remote = dir.path().join("remote.git");
        git2::Repository::init_bare(&remote).unwrap();

        let mut resolved = inline_config();
        resolved.git = Some(hostsync_core::GitConfig::new(remote.to_string_lossy(), ""));
        let work = dir.path().join("work");

        let registry = build_registry();
        let first = run_host(&registry, resolved.clone(), &hosts, Some(work.clone()))
            .await
            .unwrap();
        assert!(matches!(first.git, GitStatus::Pushed { .. }));

        let second = run_host(&registry, resolved, &hosts, Some(work)).await.unwrap();
        assert_eq!(second.git, GitStatus::NothingToCommit);
    }

    #[cfg(feature = "git")]
    #[tokio::test]
    async fn git_failure_keeps_hosts_update() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, "").unwrap();
        let hosts = HostsFile::with_path(&path);

        let mut resolved = inline_config();
        resolved.git = Some(hostsync_core::GitConfig::new(
            dir.path().join("missing-remote").to_string_lossy(),
            "",
        ));

        let result = run_host(
            &build_registry(),
            resolved,
            &hosts,
            Some(dir.path().join("work")),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().matches("#by-hostsync").count(),
            2
        );
    }
}
