//! Integration tests for the streaming transfer engine.

use std::time::Duration;

use animelon_dl::config::Settings;
use animelon_dl::download::{TransferError, TransferOutcome, transfer_video};
use animelon_dl::session::build_session;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_settings() -> Settings {
    Settings {
        sleep: Duration::ZERO,
        retry_sleep: Duration::ZERO,
        max_tries: 2,
        ..Settings::default()
    }
}

const UA: &str = "Mozilla/5.0 (Test Agent)";

#[tokio::test]
async fn fresh_transfer_streams_the_whole_body() {
    let server = MockServer::start().await;
    let content = b"FULL VIDEO CONTENT 0123456789".to_vec();
    Mock::given(method("GET"))
        .and(path("/stream/ep1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("ep1.mp4");
    let outcome = transfer_video(
        &build_session(),
        &format!("{}/stream/ep1", server.uri()),
        &destination,
        UA,
        "ozez",
        &test_settings(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, TransferOutcome::Completed);
    assert_eq!(std::fs::read(&destination).unwrap(), content);
}

#[tokio::test]
async fn partial_file_resumes_with_a_byte_range_request() {
    let server = MockServer::start().await;
    let prefix = b"FIRST-8b".to_vec();
    let remainder = b" AND THE REST OF THE STREAM".to_vec();

    // Only a request carrying the exact resume range matches; anything else
    // falls through to wiremock's 404 and fails the transfer.
    Mock::given(method("GET"))
        .and(path("/stream/ep1"))
        .and(header("Range", "bytes=8-"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(remainder.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("ep1.mp4");
    std::fs::write(&destination, &prefix).unwrap();

    let outcome = transfer_video(
        &build_session(),
        &format!("{}/stream/ep1", server.uri()),
        &destination,
        UA,
        "ozez",
        &test_settings(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, TransferOutcome::Completed);
    // Bytes [0, 8) were never rewritten; the remainder was appended.
    let expected: Vec<u8> = prefix.iter().chain(remainder.iter()).copied().collect();
    assert_eq!(std::fs::read(&destination).unwrap(), expected);
}

#[tokio::test]
async fn range_not_satisfiable_means_already_complete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/ep1"))
        .and(header("Range", "bytes=12-"))
        .respond_with(ResponseTemplate::new(416))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("ep1.mp4");
    std::fs::write(&destination, b"ALL 12 BYTES").unwrap();

    let outcome = transfer_video(
        &build_session(),
        &format!("{}/stream/ep1", server.uri()),
        &destination,
        UA,
        "ozez",
        &test_settings(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, TransferOutcome::AlreadyComplete);
    // Nothing was written.
    assert_eq!(std::fs::read(&destination).unwrap(), b"ALL 12 BYTES");
}

#[tokio::test]
async fn unexpected_status_is_a_transient_failure_and_keeps_partial_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/ep1"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("ep1.mp4");
    std::fs::write(&destination, b"partial").unwrap();

    let err = transfer_video(
        &build_session(),
        &format!("{}/stream/ep1", server.uri()),
        &destination,
        UA,
        "ozez",
        &test_settings(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, TransferError::HttpStatus { status: 403, .. }));
    // The partial file survives as resume state for the next run.
    assert_eq!(std::fs::read(&destination).unwrap(), b"partial");
}

#[tokio::test]
async fn transfer_sends_the_stream_specific_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/gated"))
        .and(header("User-Agent", "Gated Agent/2.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("gated.mp4");
    let outcome = transfer_video(
        &build_session(),
        &format!("{}/stream/gated", server.uri()),
        &destination,
        "Gated Agent/2.0",
        "stz",
        &test_settings(),
    )
    .await
    .unwrap();

    assert_eq!(outcome, TransferOutcome::Completed);
}

#[tokio::test]
async fn header_overrides_do_not_leak_into_later_requests() {
    let server = MockServer::start().await;
    let client = build_session();

    Mock::given(method("GET"))
        .and(path("/stream/first"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"first".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    // A later plain request must carry neither the Range header nor the
    // stream-specific User-Agent from the finished transfer.
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .and(wiremock::matchers::header_exists("User-Agent"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    transfer_video(
        &client,
        &format!("{}/stream/first", server.uri()),
        &dir.path().join("first.mp4"),
        "Override Agent/9.9",
        "ozez",
        &test_settings(),
    )
    .await
    .unwrap();

    let response = client
        .get(format!("{}/api/ping", server.uri()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Inspect what actually arrived for the ping.
    let requests = server.received_requests().await.unwrap();
    let ping = requests
        .iter()
        .find(|req| req.url.path() == "/api/ping")
        .unwrap();
    assert!(ping.headers.get("Range").is_none());
    let ua = ping.headers.get("User-Agent").unwrap().to_str().unwrap();
    assert!(ua.starts_with("Mozilla/5.0 (Windows NT 10.0"), "{ua}");
}
