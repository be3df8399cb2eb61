//! Command-line interface definition

use clap::{Args, Parser, Subcommand};
use hostsync_core::Overrides;
use std::path::PathBuf;

const HOST_EXAMPLES: &str = "\
Examples:
  hostsync host --config config.yaml
  hostsync host -c config.yaml --push
  hostsync host -p config --path hosts.yml
  hostsync host -p url --path https://example.com/hosts.yml -t <token>
  hostsync host -p sql --type sqlite --path ./hosts.db --query 'select ip, fqdn from hosts'";

#[derive(Parser, Debug)]
#[command(name = "hostsync")]
#[command(version, about = "Keep the hosts file in sync with a source of host entries.")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "HOSTSYNC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply entries to the system's hosts file
    #[command(after_help = HOST_EXAMPLES)]
    Host(HostArgs),
    /// Remove every managed entry from the system's hosts file
    Clean,
}

#[derive(Args, Debug, Default, Clone)]
pub struct HostArgs {
    /// Config file (YAML)
    #[arg(short, long, env = "HOSTSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data provider: config, url or sql
    #[arg(short, long, env = "HOSTSYNC_PROVIDER")]
    pub provider: Option<String>,

    /// Data file, URL or data source, depending on the provider
    #[arg(long, env = "HOSTSYNC_PATH")]
    pub path: Option<String>,

    /// Token for the URL provider
    #[arg(short, long, env = "HOSTSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Database type for the SQL provider
    #[arg(long = "type", env = "HOSTSYNC_DB_TYPE")]
    pub db_type: Option<String>,

    /// Query for the SQL provider
    #[arg(long, env = "HOSTSYNC_QUERY")]
    pub query: Option<String>,

    /// Push host data to the remote git repository
    #[arg(long)]
    pub push: bool,

    /// Git remote URL
    #[arg(long, env = "HOSTSYNC_GIT_URL")]
    pub git_url: Option<String>,

    /// Git token, sent as the basic-auth password
    #[arg(long, env = "HOSTSYNC_GIT_TOKEN", hide_env_values = true)]
    pub git_token: Option<String>,

    /// Scratch directory for the git clone
    #[arg(long, env = "HOSTSYNC_GIT_WORK_DIR")]
    pub git_work_dir: Option<PathBuf>,
}

impl HostArgs {
    /// Command-line values that take precedence over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            provider: self.provider.clone(),
            path: self.path.clone(),
            token: self.token.clone(),
            db_type: self.db_type.clone(),
            query: self.query.clone(),
            // An absent flag must not switch off `git.push: true` from the file.
            push: self.push.then_some(true),
            git_url: self.git_url.clone(),
            git_token: self.git_token.clone(),
        }
    }
}
