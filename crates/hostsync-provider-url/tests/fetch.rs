//! Provider tests against a one-shot local HTTP responder

use hostsync_core::{Error, ErrorKind, HostEntry, HostProvider};
use hostsync_provider_url::UrlProvider;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve exactly one response and return the raw request text
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/hosts.yml", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/yaml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&request).into_owned()
    });

    (url, handle)
}

/// Provider whose client ignores proxy settings from the environment
fn provider(url: impl Into<String>, token: &str) -> UrlProvider {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    UrlProvider::with_client(url, token, client)
}

const DOCUMENT: &str = "- ip: 10.0.0.5\n  domain: nas.lan\n  subdomains: [files, backup]\n- ip: 10.0.0.1\n  domain: router.lan\n";

#[tokio::test]
async fn fetches_and_parses_entries() {
    let (url, server) = serve_once("200 OK", DOCUMENT).await;
    let provider = provider(url, "abc123");

    let entries = provider.get_host_entries().await.unwrap();
    assert_eq!(
        entries,
        vec![
            HostEntry::new("10.0.0.5", "nas.lan").with_subdomains(["files", "backup"]),
            HostEntry::new("10.0.0.1", "router.lan"),
        ]
    );

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("get /hosts.yml"));
    assert!(request.contains("authorization: token abc123"));
}

#[tokio::test]
async fn empty_token_still_sends_authorization() {
    let (url, server) = serve_once("200 OK", DOCUMENT).await;
    let provider = provider(url, "");

    provider.get_host_entries().await.unwrap();
    let request = server.await.unwrap().to_lowercase();
    assert!(request.contains("authorization: token"));
}

#[tokio::test]
async fn accepts_config_shaped_document() {
    let (url, _server) =
        serve_once("200 OK", "data:\n  - ip: 192.168.1.10\n    domain: media.lan\n").await;
    let provider = provider(url, "");

    let entries = provider.get_host_entries().await.unwrap();
    assert_eq!(entries, vec![HostEntry::new("192.168.1.10", "media.lan")]);
}

#[tokio::test]
async fn non_200_status_is_error() {
    let (url, _server) = serve_once("404 Not Found", "missing").await;
    let provider = provider(url.clone(), "");

    let err = provider.get_host_entries().await.unwrap_err();
    match &err {
        Error::HttpStatus { url: failed, status } => {
            assert_eq!(failed, &url);
            assert!(status.starts_with("404"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::SourceUnavailable);
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let (url, _server) = serve_once("200 OK", "- ip: [broken").await;
    let provider = provider(url, "");

    let err = provider.get_host_entries().await.unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_source_error() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = provider(format!("http://{addr}/hosts.yml"), "");
    let err = provider.get_host_entries().await.unwrap_err();
    assert!(matches!(err, Error::Source { .. }));
}
