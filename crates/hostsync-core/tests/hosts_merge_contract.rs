//! Contract Test: Hosts-File Merge
//!
//! Constraints verified:
//! - Unmarked lines survive untouched and in order
//! - The managed region is replaced, never duplicated
//! - Entry → line expansion follows the subdomain rule
//! - A provider failure leaves the file untouched
//!
//! If this test fails, the hosts file can be corrupted.

mod common;

use common::*;
use hostsync_core::{Error, ErrorKind, HostEntry, HostsFile, MARKER};

#[tokio::test]
async fn end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_fixture(dir.path(), "127.0.0.1 localhost\n");

    let provider = CountingProvider::new(vec![nas_entry()]);
    let entries = HostsFile::with_path(&path).update(&provider).await.unwrap();

    assert_eq!(entries, vec![nas_entry()]);
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "127.0.0.1 localhost".to_string(),
            format!("10.0.0.5\tfiles.nas.lan\t{}", MARKER),
            format!("10.0.0.5\tbackup.nas.lan\t{}", MARKER),
        ]
    );
}

#[tokio::test]
async fn second_run_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_fixture(dir.path(), "127.0.0.1 localhost\n::1 localhost\n");
    let hosts = HostsFile::with_path(&path);
    let provider = CountingProvider::new(vec![
        nas_entry(),
        HostEntry::new("10.0.0.1", "router.lan"),
    ]);

    hosts.update(&provider).await.unwrap();
    let first = std::fs::read_to_string(&path).unwrap();

    hosts.update(&provider).await.unwrap();
    let second = std::fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.call_count(), 2);
    assert_eq!(second.matches(MARKER).count(), 3);
}

#[tokio::test]
async fn unmarked_lines_keep_their_order() {
    let dir = tempfile::tempdir().unwrap();
    let original = "# static table\n127.0.0.1\tlocalhost\n10.1.1.1 old.lan #by-hostsync\n\
                    192.168.1.1   gateway   # router\n\n10.2.2.2 stale.lan #by-hostsync\n";
    let path = hosts_fixture(dir.path(), original);

    let provider = CountingProvider::new(vec![HostEntry::new("10.0.0.1", "router.lan")]);
    HostsFile::with_path(&path).update(&provider).await.unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "# static table\n127.0.0.1\tlocalhost\n192.168.1.1   gateway   # router\n\n\
         10.0.0.1\trouter.lan\t#by-hostsync\n"
    );
}

#[tokio::test]
async fn shrinking_entry_set_removes_old_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = hosts_fixture(dir.path(), "127.0.0.1 localhost\n");
    let hosts = HostsFile::with_path(&path);

    hosts
        .update(&CountingProvider::new(vec![nas_entry()]))
        .await
        .unwrap();
    hosts
        .update(&CountingProvider::new(Vec::new()))
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "127.0.0.1 localhost\n");
}

#[tokio::test]
async fn provider_failure_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let original = "127.0.0.1 localhost\n10.0.0.1\trouter.lan\t#by-hostsync\n";
    let path = hosts_fixture(dir.path(), original);

    let err = HostsFile::with_path(&path)
        .update(&FailingProvider)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Source { .. }));
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn read_failure_skips_provider() {
    let dir = tempfile::tempdir().unwrap();
    let provider = CountingProvider::new(vec![nas_entry()]);

    let err = HostsFile::with_path(dir.path().join("missing"))
        .update(&provider)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReadFailure);
    assert_eq!(provider.call_count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn write_failure_keeps_original_content() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let original = "127.0.0.1 localhost\n";
    let path = hosts_fixture(dir.path(), original);

    // A read-only directory lets us read the file but not create the temp file.
    std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o555)).unwrap();
    let result = HostsFile::with_path(&path)
        .update(&CountingProvider::new(vec![nas_entry()]))
        .await;
    std::fs::set_permissions(dir.path(), std::fs::Permissions::from_mode(0o755)).unwrap();

    let Err(err) = result else {
        // Running with CAP_DAC_OVERRIDE; nothing to assert.
        return;
    };
    assert_eq!(err.kind(), ErrorKind::WriteFailure);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}
