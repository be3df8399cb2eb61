// # hostsync-core
//
// Core library for hostsync: keeps the managed region of the system hosts
// file in sync with a pluggable source of host entries.
//
// ## Architecture Overview
//
// - **HostEntry**: The `(ip, domain, subdomains)` record shared by every component
// - **HostProvider**: Trait for sources of host entries (config, URL, SQL)
// - **ProviderRegistry**: Factory registry selecting a provider from tagged config
// - **HostsFile**: Idempotent merge of the managed region into the hosts file
// - **HostsConfig**: Config file model and command-line override merging
//
// The git snapshot lives in the `hostsync-git` crate and consumes the same
// `HostEntry` list; providers and the git synchronizer never talk to each
// other.
//
// ## Design Principles
//
// 1. **Single Owner**: Only lines carrying the marker are ever touched
// 2. **Idempotency**: Running twice with the same entries changes nothing
// 3. **Plugin-Based**: Providers are registered by name, no hard-coded match on types
// 4. **Library-First**: Everything the CLI does is reachable as a library call
// 5. **No Retries**: Every error goes back to the caller

pub mod config;
pub mod entry;
pub mod error;
pub mod hosts;
pub mod providers;
pub mod registry;
pub mod traits;

// Re-export core types for convenience
pub use config::{GitConfig, HostsConfig, Overrides, ProviderConfig, ProviderKind, ResolvedConfig};
pub use entry::HostEntry;
pub use error::{Error, ErrorKind, Result};
pub use hosts::{HostsFile, MARKER};
pub use registry::ProviderRegistry;
pub use traits::{HostProvider, HostProviderFactory};
