// # hostsync
//
// Command-line front end for hostsync-core. This is a thin integration
// layer: it parses arguments, initializes logging and the runtime,
// registers the compiled-in providers, and reports the outcome as an exit
// code. All hosts-file, provider and git logic lives in the library crates.
//
// ## Commands
//
// - `hostsync host`: fetch entries from a provider, rewrite the managed
//   region of the hosts file, optionally push a snapshot to git
// - `hostsync clean`: remove the managed region
//
// ## Precedence
//
// Command-line flag > `HOSTSYNC_*` environment variable > config file >
// built-in default.
//
// ## Example
//
// ```bash
// sudo hostsync host -c /etc/hostsync/config.yaml --push
// HOSTSYNC_LOG_LEVEL=debug sudo hostsync host -p url --path https://example.com/hosts.yml
// ```

mod app;
mod cli;

use clap::Parser;
use hostsync_core::{ErrorKind, HostsFile};
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::app::GitStatus;
use crate::cli::{Cli, Commands};

/// Exit codes
///
/// - 0: Success, including a push with nothing to commit
/// - 1: Configuration error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostsyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<HostsyncExitCode> for ExitCode {
    fn from(code: HostsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn parse_log_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Map a failed run to an exit code
fn classify(err: &anyhow::Error) -> HostsyncExitCode {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<hostsync_core::Error>())
        .map(hostsync_core::Error::kind);

    match kind {
        Some(ErrorKind::InvalidConfiguration | ErrorKind::UnsupportedConfiguration) => {
            HostsyncExitCode::ConfigError
        }
        Some(ErrorKind::NoChanges) => HostsyncExitCode::Success,
        _ => HostsyncExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    // clap would exit with 2 on a usage error, which is our runtime-error code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                HostsyncExitCode::ConfigError
            } else {
                HostsyncExitCode::Success
            };
            let _ = e.print();
            return code.into();
        }
    };

    let Some(log_level) = parse_log_level(&cli.log_level) else {
        eprintln!(
            "Configuration error: invalid log level '{}' (expected trace, debug, info, warn or error)",
            cli.log_level
        );
        return HostsyncExitCode::ConfigError.into();
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HostsyncExitCode::ConfigError.into();
    }

    // One sequential operation per invocation
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HostsyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(run(cli.command));

    match result {
        Ok(()) => HostsyncExitCode::Success.into(),
        Err(e) => {
            let code = classify(&e);
            if code == HostsyncExitCode::ConfigError {
                error!("Configuration error: {:#}", e);
            } else {
                error!("{:#}", e);
                if e
                    .chain()
                    .filter_map(|cause| cause.downcast_ref::<hostsync_core::Error>())
                    .any(hostsync_core::Error::is_permission_denied)
                {
                    warn!("The hosts file is usually writable by root only; try running with sudo");
                }
            }
            code.into()
        }
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Host(args) => {
            let resolved = app::resolve_config(&args)?;
            let registry = app::build_registry();
            let hosts = HostsFile::new();

            let report = app::run_host(&registry, resolved, &hosts, args.git_work_dir).await?;
            info!("Hosts file updated successfully ({} entries)", report.entries);

            match report.git {
                GitStatus::Skipped => {}
                GitStatus::Pushed { commit_id } => {
                    info!("Pushed host data to git ({})", commit_id);
                }
                GitStatus::NothingToCommit => info!("Git snapshot already up to date"),
            }
            Ok(())
        }
        Commands::Clean => {
            let removed = app::run_clean(&HostsFile::new()).await?;
            info!("Removed {} managed entries", removed);
            Ok(())
        }
    }
}
