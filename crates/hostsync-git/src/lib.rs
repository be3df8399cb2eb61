// # Git Synchronizer
//
// Publishes the current entry set as `host_entries.yml` in a git
// repository, giving the hosts overrides an auditable history.
//
// ## Flow
//
// ```text
// Start -> {Cloned | Bootstrapped} -> SnapshotWritten
//       -> {Clean (NoChanges) | Dirty} -> Committed -> Pushed
// ```
//
// Each call starts from an empty scratch directory. Cloning a remote
// that has no commits yields an unborn HEAD; the first commit is then
// pushed through `origin` to bootstrap the remote.
//
// ## Errors
//
// Every failure is returned to the caller with no retry and no rollback.
// An unchanged snapshot yields [`Error::NoChanges`], which callers treat as
// a benign outcome.
//
// ## Blocking
//
// git2 is synchronous. Async callers should run [`GitSynchronizer::push`]
// on the blocking thread pool.

use git2::build::RepoBuilder;
use git2::{
    Cred, CredentialType, ErrorClass, ErrorCode, FetchOptions, PushOptions, RemoteCallbacks,
    Repository, Signature, StatusOptions,
};
use hostsync_core::entry::to_yaml;
use hostsync_core::hosts::APP_NAME;
use hostsync_core::{Error, GitConfig, HostEntry, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Snapshot file name at the repository root
pub const SNAPSHOT_FILE: &str = "host_entries.yml";

/// Remote the snapshot is pushed to
pub const REMOTE_NAME: &str = "origin";

/// Scratch directory name under the OS temp dir
const SCRATCH_DIR_NAME: &str = "hostsync-git";

/// Basic-auth username; the token is the password
const AUTH_USERNAME: &str = APP_NAME;

const AUTHOR_NAME: &str = APP_NAME;
const AUTHOR_EMAIL: &str = "hostsync@localhost";

/// Stage of a sync, used to label failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Prepare,
    Clone,
    Snapshot,
    Status,
    Commit,
    Push,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Prepare => "prepare",
            SyncStage::Clone => "clone",
            SyncStage::Snapshot => "snapshot",
            SyncStage::Status => "status",
            SyncStage::Commit => "commit",
            SyncStage::Push => "push",
        };
        f.write_str(name)
    }
}

/// How the local repository was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoSource {
    /// Cloned from a remote that already had history
    Cloned,
    /// Remote was empty; a fresh repository was initialized
    Bootstrapped,
}

/// Result of a successful push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// How the local repository was obtained
    pub source: RepoSource,
    /// Id of the pushed commit
    pub commit_id: String,
    /// Full name of the pushed reference (e.g. `refs/heads/main`)
    pub reference: String,
}

/// Pushes entry snapshots to a git remote
///
/// # Example
///
/// ```rust,no_run
/// use hostsync_core::{GitConfig, HostEntry};
/// use hostsync_git::GitSynchronizer;
///
/// let sync = GitSynchronizer::new(GitConfig::new("https://example.com/me/hosts.git", "token"));
/// match sync.push(&[HostEntry::new("10.0.0.1", "router.lan")]) {
///     Ok(outcome) => println!("pushed {}", outcome.commit_id),
///     Err(e) if e.is_no_changes() => println!("nothing to commit"),
///     Err(e) => eprintln!("push failed: {}", e),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct GitSynchronizer {
    config: GitConfig,
    work_dir: PathBuf,
}

impl GitSynchronizer {
    /// Create a synchronizer using `<os temp>/hostsync-git` as scratch space
    pub fn new(config: GitConfig) -> Self {
        Self {
            config,
            work_dir: std::env::temp_dir().join(SCRATCH_DIR_NAME),
        }
    }

    /// Use a different scratch directory
    ///
    /// Anything already in the directory is deleted on every push.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Scratch directory used for the local clone
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Publish `entries` as the new snapshot
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome)`: The snapshot was committed and pushed
    /// - `Err(Error::NoChanges)`: The remote already holds this snapshot
    /// - `Err(Error::Authentication)`: The remote rejected the token
    /// - `Err(Error::RemoteUnreachable)`: Transport failure
    /// - `Err(Error)`: Any other failure, labelled with its stage
    pub fn push(&self, entries: &[HostEntry]) -> Result<SyncOutcome> {
        self.prepare_work_dir()?;

        let (repo, source) = self.open_repository()?;
        tracing::debug!(?source, "Local repository ready at {}", self.work_dir.display());

        self.write_snapshot(entries)?;
        ensure_dirty(&repo)?;

        let commit_id = commit_snapshot(&repo)?;
        tracing::info!("Committed host entries snapshot {}", commit_id);

        let reference = self.push_head(&repo)?;
        tracing::info!("Pushed {} to {}", reference, REMOTE_NAME);

        Ok(SyncOutcome {
            source,
            commit_id: commit_id.to_string(),
            reference,
        })
    }

    fn prepare_work_dir(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.work_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Write {
                path: self.work_dir.clone(),
                source,
            }),
        }
    }

    fn open_repository(&self) -> Result<(Repository, RepoSource)> {
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(remote_callbacks(&self.config.token));

        let repo = RepoBuilder::new()
            .fetch_options(fetch)
            .clone(&self.config.url, &self.work_dir)
            .map_err(|e| map_git_error(SyncStage::Clone, e))?;

        // An empty remote clones fine but leaves HEAD unborn; the first
        // commit then bootstraps the remote's history through `origin`.
        if head_is_unborn(&repo) {
            tracing::info!("Remote {} is empty, bootstrapping", self.config.url);
            return Ok((repo, RepoSource::Bootstrapped));
        }
        Ok((repo, RepoSource::Cloned))
    }

    fn write_snapshot(&self, entries: &[HostEntry]) -> Result<()> {
        let path = self.work_dir.join(SNAPSHOT_FILE);
        let content = to_yaml(entries)?;
        std::fs::write(&path, content).map_err(|source| Error::Write { path, source })
    }

    fn push_head(&self, repo: &Repository) -> Result<String> {
        let head = repo.head().map_err(|e| map_git_error(SyncStage::Push, e))?;
        let reference = head
            .name()
            .ok_or_else(|| Error::git(SyncStage::Push.to_string(), "HEAD name is not valid UTF-8"))?
            .to_string();

        let mut remote = repo
            .find_remote(REMOTE_NAME)
            .map_err(|e| map_git_error(SyncStage::Push, e))?;

        let refspec = format!("{reference}:{reference}");
        let mut rejected: Option<String> = None;
        {
            let mut callbacks = remote_callbacks(&self.config.token);
            callbacks.push_update_reference(|name, status| {
                if let Some(message) = status {
                    rejected = Some(format!("{name}: {message}"));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| map_git_error(SyncStage::Push, e))?;
        }

        if let Some(reason) = rejected {
            return Err(Error::git(
                SyncStage::Push.to_string(),
                format!("remote rejected {reason}"),
            ));
        }

        Ok(reference)
    }
}

fn ensure_dirty(repo: &Repository) -> Result<()> {
    let mut options = StatusOptions::new();
    options.include_untracked(true).recurse_untracked_dirs(true);

    let statuses = repo
        .statuses(Some(&mut options))
        .map_err(|e| map_git_error(SyncStage::Status, e))?;

    if statuses.is_empty() {
        tracing::info!("Snapshot unchanged, nothing to commit");
        return Err(Error::NoChanges);
    }
    Ok(())
}

fn commit_snapshot(repo: &Repository) -> Result<git2::Oid> {
    let commit = || -> std::result::Result<git2::Oid, git2::Error> {
        let mut index = repo.index()?;
        index.add_path(Path::new(SNAPSHOT_FILE))?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let parent = if head_is_unborn(repo) {
            None
        } else {
            Some(repo.head()?.peel_to_commit()?)
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let signature = Signature::now(AUTHOR_NAME, AUTHOR_EMAIL)?;
        let message = format!("update host entries {}", chrono::Utc::now().to_rfc3339());
        repo.commit(Some("HEAD"), &signature, &signature, &message, &tree, &parents)
    };

    commit().map_err(|e| map_git_error(SyncStage::Commit, e))
}

fn head_is_unborn(repo: &Repository) -> bool {
    match repo.head() {
        Ok(_) => false,
        Err(e) => matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound),
    }
}

/// Hands out the token once per operation
///
/// A second request for credentials means the first set was rejected;
/// failing it stops libgit2 from asking forever.
struct CredentialGuard<'a> {
    token: &'a str,
    attempted: bool,
}

impl<'a> CredentialGuard<'a> {
    fn new(token: &'a str) -> Self {
        Self {
            token,
            attempted: false,
        }
    }

    fn credentials(&mut self, allowed: CredentialType) -> std::result::Result<Cred, git2::Error> {
        if self.attempted || !allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return Err(git2::Error::new(
                ErrorCode::Auth,
                ErrorClass::Http,
                "credentials rejected",
            ));
        }
        self.attempted = true;
        Cred::userpass_plaintext(AUTH_USERNAME, self.token)
    }
}

fn remote_callbacks(token: &str) -> RemoteCallbacks<'_> {
    let mut guard = CredentialGuard::new(token);
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, allowed| guard.credentials(allowed));
    callbacks
}

fn map_git_error(stage: SyncStage, err: git2::Error) -> Error {
    if err.code() == ErrorCode::Auth {
        return Error::auth(err.message().to_string());
    }

    match err.class() {
        ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssl | ErrorClass::Ssh => {
            Error::remote_unreachable(format!("{stage}: {}", err.message()))
        }
        _ => Error::git(stage.to_string(), err.message().to_string()),
    }
}
