//! Retry behavior against a canned local HTTP server.
//!
//! The server plays back a fixed sequence of responses and counts the
//! requests it serves, so the tests can assert exact attempt counts.

use hbx_transport::{ApiTransport, Credentials, RetryPolicy, TransportError};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serve one canned response per incoming connection, in order.
/// Returns the base URL and the served-request counter.
async fn canned_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let counter = Arc::new(AtomicU32::new(0));
    let served = counter.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            // Drain the request head; canned tests never need the body.
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            served.fetch_add(1, Ordering::SeqCst);

            let reason = match status {
                200 => "OK",
                401 => "Unauthorized",
                503 => "Service Unavailable",
                _ => "Unknown",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\n\
                 Content-Type: application/json\r\n\
                 Content-Length: {}\r\n\
                 Connection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}"), counter)
}

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(10))
}

fn transport(url: &str, policy: RetryPolicy) -> ApiTransport {
    ApiTransport::with_options(
        url,
        Credentials::default(),
        Duration::from_secs(5),
        policy,
        CancellationToken::new(),
    )
    .unwrap()
}

#[tokio::test]
async fn two_transient_failures_then_success_uses_three_attempts() {
    let (url, counter) = canned_server(vec![
        (503, "{}"),
        (503, "{}"),
        (200, "{\"ok\":true}"),
    ])
    .await;
    let transport = transport(&url, fast_policy(3));

    let value = transport.get("/api/v1/accounts").await.unwrap();
    assert_eq!(value["ok"], true);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unauthorized_fails_on_first_attempt() {
    let (url, counter) = canned_server(vec![(401, "{\"detail\":\"unauthorized\"}")]).await;
    let transport = transport(&url, fast_policy(3));

    let err = transport.get("/api/v1/accounts").await.unwrap_err();
    assert!(matches!(err, TransportError::Authentication { .. }));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn exhausted_retry_budget_returns_last_error() {
    let (url, counter) = canned_server(vec![(503, "{}"), (503, "{}"), (503, "{}")]).await;
    let transport = transport(&url, fast_policy(3));

    let err = transport.get("/api/v1/accounts").await.unwrap_err();
    assert!(matches!(err, TransportError::Server { status: 503, .. }));
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn connection_refused_classified_as_connectivity() {
    // Bind then drop to find a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = transport(&format!("http://{addr}"), RetryPolicy::none());
    let err = transport.get("/api/v1/accounts").await.unwrap_err();
    assert!(matches!(err, TransportError::Connectivity { .. }));
}

#[tokio::test]
async fn cancelled_token_aborts_before_first_attempt() {
    let (url, counter) = canned_server(vec![(200, "{}")]).await;
    let cancel = CancellationToken::new();
    cancel.cancel();
    let transport = ApiTransport::with_options(
        &url,
        Credentials::default(),
        Duration::from_secs(5),
        fast_policy(3),
        cancel,
    )
    .unwrap();

    let err = transport.get("/api/v1/accounts").await.unwrap_err();
    assert!(matches!(err, TransportError::Cancelled));
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn error_detail_from_body_is_surfaced() {
    let (url, _) = canned_server(vec![(200, "{\"detail\":\"invalid executor_config\"}")]).await;
    let transport = transport(&url, RetryPolicy::none());

    let err = transport.get("/api/v1/executors/abc").await.unwrap_err();
    match err {
        TransportError::Validation { detail, .. } => {
            assert_eq!(detail, "invalid executor_config");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}
