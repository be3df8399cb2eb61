//! Hosts-file merging
//!
//! hostsync owns exactly the lines of the system hosts file that carry
//! [`MARKER`]. Each run drops every marked line, keeps everything else
//! verbatim and in order, and appends freshly generated lines:
//!
//! ```text
//! 127.0.0.1 localhost
//! 10.0.0.5	files.nas.lan	#by-hostsync
//! 10.0.0.5	backup.nas.lan	#by-hostsync
//! ```
//!
//! Running twice with the same entries produces the same file.

pub mod file;

pub use file::HostsFile;

use std::path::PathBuf;

use crate::entry::HostEntry;

macro_rules! app_name {
    () => {
        "hostsync"
    };
}

/// Application name the marker is derived from
pub const APP_NAME: &str = app_name!();

/// Sentinel appended to every line hostsync writes
pub const MARKER: &str = concat!("#by-", app_name!());

#[cfg(windows)]
const SYSTEM_HOSTS_PATH: &str = r"C:\Windows\System32\drivers\etc\hosts";

#[cfg(not(windows))]
const SYSTEM_HOSTS_PATH: &str = "/etc/hosts";

/// Path of the platform's hosts file
pub fn system_hosts_path() -> PathBuf {
    PathBuf::from(SYSTEM_HOSTS_PATH)
}

/// Returns `true` if the line belongs to the managed region
///
/// Lines are raw bytes: a hosts file is not required to be UTF-8.
pub fn is_managed(line: &[u8]) -> bool {
    let marker = MARKER.as_bytes();
    line.windows(marker.len()).any(|window| window == marker)
}

/// Split file content into lines without their `\n` terminator.
///
/// Other bytes, including a `\r` before the newline, are kept as is.
pub fn split_lines(content: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = content.strip_suffix(b"\n").unwrap_or(content);
    let lines = if content.is_empty() { None } else { Some(body) };
    lines
        .into_iter()
        .flat_map(|body| body.split(|byte| *byte == b'\n'))
}

/// Generate the managed lines for `entries`.
///
/// Entry order is kept, and within an entry the subdomain order.
pub fn managed_lines(entries: &[HostEntry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|entry| {
            entry
                .hostnames()
                .into_iter()
                .map(move |hostname| format!("{}\t{}\t{}", entry.ip, hostname, MARKER))
        })
        .collect()
}

/// Merge unmanaged content with the managed lines for `entries`.
///
/// `existing` is the current file content; unmanaged lines are copied
/// byte for byte. The result always ends with exactly one newline after the
/// last line.
pub fn merge(existing: &[u8], entries: &[HostEntry]) -> Vec<u8> {
    let managed = managed_lines(entries);
    let mut output = Vec::with_capacity(existing.len());

    let kept = split_lines(existing).filter(|line| !is_managed(line));
    let generated = managed.iter().map(String::as_bytes);
    for (i, line) in kept.chain(generated).enumerate() {
        if i > 0 {
            output.push(b'\n');
        }
        output.extend_from_slice(line);
    }

    output.push(b'\n');
    output
}
