//! Test doubles and common utilities for hosts-file contract tests

#![allow(dead_code)]

use hostsync_core::error::{Error, Result};
use hostsync_core::{HostEntry, HostProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A provider returning a fixed entry list and counting its calls
pub struct CountingProvider {
    entries: Vec<HostEntry>,
    call_count: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn new(entries: Vec<HostEntry>) -> Self {
        Self {
            entries,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times get_host_entries() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HostProvider for CountingProvider {
    async fn get_host_entries(&self) -> Result<Vec<HostEntry>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.clone())
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

/// A provider that always fails as if its source were unreachable
pub struct FailingProvider;

#[async_trait::async_trait]
impl HostProvider for FailingProvider {
    async fn get_host_entries(&self) -> Result<Vec<HostEntry>> {
        Err(Error::source_unavailable("failing", "source is down"))
    }

    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

/// The entry used by the end-to-end scenario
pub fn nas_entry() -> HostEntry {
    HostEntry::new("10.0.0.5", "nas.lan").with_subdomains(["files", "backup"])
}

/// Write a hosts file with the given content into `dir`
pub fn hosts_fixture(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("hosts");
    std::fs::write(&path, content).expect("fixture write succeeds");
    path
}
