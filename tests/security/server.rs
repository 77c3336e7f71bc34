//! Server infrastructure security integration tests.
//!
//! These tests start a real server, send raw TCP traffic, and assert on
//! observable behavior.

use std::time::Duration;

use fare::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::common::{TestApp, raw_request};

const PING: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";

/// Application routes with default limits.
async fn start_test_server() -> TestApp {
    TestApp::start().await
}

/// Routes that misbehave on purpose: `/panic` and `/slow`.
async fn start_faulty_server() -> TestApp {
    let mut router = Router::new();
    router.get("/panic", |_ctx| async move {
        panic!("test panic");
    });
    router.get("/slow", |_ctx| async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        fare::response::ok(&serde_json::json!({ "slow": true }))
    });
    TestApp::start_with(|_| {}, Some(router.into_handle())).await
}

/// A declared body larger than `max_body_bytes` is refused on the header alone.
#[tokio::test]
async fn server_rejects_oversized_body() {
    let app = TestApp::start_with(|c| c.server.max_body_bytes = 1024, None).await;

    let response = raw_request(
        app.addr(),
        b"POST /documents/upload HTTP/1.1\r\nHost: localhost\r\nContent-Length: 4096\r\nConnection: close\r\n\r\n",
    )
    .await;
    let response_str = String::from_utf8_lossy(&response);

    app.shutdown().await;

    assert!(
        response_str.contains("413"),
        "Expected 413 Payload Too Large, got:\n{response_str}"
    );
}

/// Uploads are subject to the same limit when the body is streamed chunked.
#[tokio::test]
async fn server_rejects_oversized_chunked_body() {
    let app = TestApp::start_with(|c| c.server.max_body_bytes = 16, None).await;

    let response = raw_request(
        app.addr(),
        b"POST /documents/upload HTTP/1.1\r\nHost: localhost\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n20\r\n0123456789abcdef0123456789abcdef\r\n0\r\n\r\n",
    )
    .await;
    let response_str = String::from_utf8_lossy(&response);

    app.shutdown().await;

    assert!(response_str.contains("413"), "got:\n{response_str}");
}

/// Opening 200 connections should see at least one refused or answered 503.
#[tokio::test]
async fn server_rejects_excess_connections() {
    let app = start_test_server().await;
    let addr = app.addr();

    let mut streams = Vec::new();
    let mut refused = 0usize;

    for _ in 0..200 {
        match TcpStream::connect(addr).await {
            Ok(s) => streams.push(s),
            Err(_) => refused += 1,
        }
    }

    tokio::time::sleep(Duration::from_millis(100)).await;

    let mut service_unavailable = 0usize;
    for mut stream in streams {
        if stream.write_all(PING).await.is_ok() {
            let mut buf = vec![0u8; 4096];
            if let Ok(Ok(n)) = tokio::time::timeout(Duration::from_secs(5), stream.read(&mut buf)).await
                && n > 0
                && String::from_utf8_lossy(&buf[..n]).contains("503")
            {
                service_unavailable += 1;
            }
        }
    }

    app.shutdown().await;

    assert!(
        refused + service_unavailable > 0,
        "Expected at least one connection refused or 503, but all 200 were accepted and served"
    );
}

/// Connections that stall during header transmission are closed.
#[tokio::test]
async fn server_closes_slow_connections() {
    let app = start_test_server().await;

    let mut stream = TcpStream::connect(app.addr()).await.expect("failed to connect");
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .expect("failed to write partial request");

    tokio::time::sleep(Duration::from_secs(3)).await;

    let mut buf = vec![0u8; 4096];
    let result = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf)).await;

    app.shutdown().await;

    match result {
        Ok(Ok(0)) | Ok(Err(_)) => {}
        Ok(Ok(n)) => {
            let resp = String::from_utf8_lossy(&buf[..n]);
            assert!(
                resp.contains("408") || resp.contains("timeout"),
                "Expected connection close or 408, got:\n{resp}"
            );
        }
        Err(_) => panic!("Server did not close the slow connection within 5 seconds"),
    }
}

/// Every response carries the standard security headers, redirects included.
#[tokio::test]
async fn server_returns_security_headers() {
    let app = start_test_server().await;
    app.seed("carol", false, false).await;
    app.seed("bob", false, false).await;

    let page = app.get("/", None).await;
    let redirect = app.get("/users/bob/permission/", Some("carol")).await;
    let not_found = app.get("/nowhere", None).await;

    app.shutdown().await;

    for reply in [&page, &redirect, &not_found] {
        for name in [
            "X-Content-Type-Options",
            "X-Frame-Options",
            "Cache-Control",
            "Content-Security-Policy",
        ] {
            assert!(reply.header(name).is_some(), "missing {name} on {reply:?}");
        }
    }
    assert_eq!(redirect.status, 302);
    assert_eq!(not_found.status, 404);
}

/// The server speaks HTTP/2 when a client sends the connection preface.
#[tokio::test]
async fn server_speaks_http2() {
    let app = start_test_server().await;

    let mut preface = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n".to_vec();
    // SETTINGS frame: length=0, type=0x04, flags=0x00, stream=0
    preface.extend_from_slice(&[0, 0, 0, 0x04, 0x00, 0, 0, 0, 0]);

    let mut stream = TcpStream::connect(app.addr()).await.expect("failed to connect");
    stream.write_all(&preface).await.expect("failed to write h2 preface");

    let mut buf = vec![0u8; 256];
    let result = tokio::time::timeout(Duration::from_secs(2), stream.read(&mut buf)).await;

    app.shutdown().await;

    match result {
        Ok(Ok(n)) if n >= 9 => assert_eq!(buf[3], 0x04, "Expected HTTP/2 SETTINGS frame"),
        other => panic!("HTTP/2 not supported: {other:?}"),
    }
}

/// Responses carry an `X-Request-Id` holding a UUID.
#[tokio::test]
async fn server_returns_request_id_header() {
    let app = start_test_server().await;
    let reply = app.get("/", None).await;
    app.shutdown().await;

    let value = reply.header("X-Request-Id").expect("missing X-Request-Id");
    assert!(
        uuid::Uuid::try_parse(value).is_ok(),
        "X-Request-Id should be a valid UUID, got: {value}"
    );
}

#[tokio::test]
async fn server_propagates_client_request_id() {
    let app = start_test_server().await;
    let client_id = "550e8400-e29b-41d4-a716-446655440000";

    let req = format!(
        "GET / HTTP/1.1\r\nHost: localhost\r\nX-Request-Id: {client_id}\r\nConnection: close\r\n\r\n"
    );
    let reply = crate::common::parse(&raw_request(app.addr(), req.as_bytes()).await);

    app.shutdown().await;

    assert_eq!(reply.header("X-Request-Id"), Some(client_id));
}

#[tokio::test]
async fn server_ignores_invalid_request_id() {
    let app = start_test_server().await;

    let response = raw_request(
        app.addr(),
        b"GET / HTTP/1.1\r\nHost: localhost\r\nX-Request-Id: not-a-uuid\r\nConnection: close\r\n\r\n",
    )
    .await;
    let reply = crate::common::parse(&response);

    app.shutdown().await;

    let value = reply.header("X-Request-Id").expect("missing X-Request-Id");
    assert_ne!(value, "not-a-uuid");
}

/// A form POST with the wrong Content-Type is refused with 415.
#[tokio::test]
async fn server_rejects_wrong_content_type() {
    let app = start_test_server().await;
    app.seed("alice", true, false).await;
    app.seed("bob", false, false).await;

    let request = format!(
        "POST /users/bob/permission/ HTTP/1.1\r\nHost: localhost\r\nAuthorization: Bearer {}\r\nContent-Type: text/plain\r\nContent-Length: 15\r\nConnection: close\r\n\r\nstaff_member=on",
        app.token("alice")
    );
    let reply = crate::common::parse(&raw_request(app.addr(), request.as_bytes()).await);

    assert_eq!(reply.status, 415);
    assert!(!app.user("bob").await.staff_member);

    app.shutdown().await;
}

/// An unknown method on a known path is 405, not 404.
#[tokio::test]
async fn server_reports_method_not_allowed() {
    let app = start_test_server().await;

    let response = raw_request(
        app.addr(),
        b"DELETE /users/ HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;

    app.shutdown().await;

    assert_eq!(crate::common::parse(&response).status, 405);
}

/// A handler that panics returns 500, not a connection reset.
#[tokio::test]
async fn server_returns_500_on_handler_panic() {
    let app = start_faulty_server().await;

    let response = raw_request(
        app.addr(),
        b"GET /panic HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    let response_str = String::from_utf8_lossy(&response);

    app.shutdown().await;

    assert!(
        response_str.contains("500"),
        "Expected 500 on handler panic, got:\n{response_str}"
    );
    assert!(!response_str.contains("test panic"));
}

/// In-flight requests complete after the shutdown signal.
#[tokio::test]
async fn server_drains_on_shutdown() {
    let app = start_faulty_server().await;

    let mut stream = TcpStream::connect(app.addr()).await.expect("failed to connect");
    stream
        .write_all(b"GET /slow HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("failed to write");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let shutdown_handle = tokio::spawn(async move { app.shutdown().await });

    let mut buf = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut buf)).await;

    let response_str = String::from_utf8_lossy(&buf);
    assert!(
        response_str.contains("200") && response_str.contains("slow"),
        "Expected slow handler to complete during drain, got:\n{response_str}"
    );

    shutdown_handle.await.unwrap();
}
