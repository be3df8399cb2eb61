//! Core traits for hostsync
//!
//! - [`HostProvider`]: Produce the current set of host entries from a source
//! - [`HostProviderFactory`]: Build a provider from tagged configuration

pub mod host_provider;

pub use host_provider::{HostProvider, HostProviderFactory};
