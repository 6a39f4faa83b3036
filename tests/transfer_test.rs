//! End-to-end paced transfer tests over real sockets.
//!
//! Run with: cargo test --test transfer_test -- --nocapture

mod common;

use bloatmeter::config::ServerConfig;
use bloatmeter::transfer::UploadReport;
use common::{connect, get, post, read_raw_response, request, spawn_server};
use hyper::{Method, StatusCode};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Lower bound from a decimal-Mbps cap, with slack for timer jitter
fn min_duration(bytes: usize, mbps: f64) -> Duration {
    Duration::from_secs_f64(bytes as f64 * 8.0 / (mbps * 1_000_000.0) * 0.95)
}

#[tokio::test]
async fn test_unlimited_download_exact_length() {
    let addr = spawn_server(ServerConfig::default()).await;

    for size in [1usize, 1000, 256 * 1024 + 1, 5 * 1024 * 1024] {
        let response = get(addr, &format!("/api/download/{size}")).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("content-length"), Some(size.to_string().as_str()));
        assert_eq!(response.body.len(), size);
        println!("✓ {size} bytes delivered");
    }
}

#[tokio::test]
async fn test_download_clamped_to_maximum() {
    let addr = spawn_server(ServerConfig::default()).await;

    let mut sender = connect(addr).await;
    let response = sender
        .send_request(request(addr, Method::GET, "/api/download/999999999999", Vec::new()))
        .await
        .unwrap();

    // Only the headers matter here; 100 MiB of body is not worth reading
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-length"],
        (100 * 1024 * 1024).to_string().as_str()
    );
}

#[tokio::test]
async fn test_paced_download_respects_cap() {
    let mbps = 8.0;
    let size = 1024 * 1024;
    let addr = spawn_server(ServerConfig {
        max_download_mbps: Some(mbps),
        ..Default::default()
    })
    .await;

    let start = Instant::now();
    let response = get(addr, &format!("/api/download/{size}")).await;
    let elapsed = start.elapsed();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.len(), size);
    println!("Paced 1 MiB at {mbps} Mbps in {}ms", elapsed.as_millis());
    assert!(elapsed >= min_duration(size, mbps), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "too slow: {elapsed:?}");
}

#[tokio::test]
async fn test_paced_download_partial_last_chunk() {
    let mbps = 16.0;
    let size = 3 * 256 * 1024 + 4321;
    let addr = spawn_server(ServerConfig {
        max_download_mbps: Some(mbps),
        ..Default::default()
    })
    .await;

    let start = Instant::now();
    let response = get(addr, &format!("/api/download/{size}")).await;
    let elapsed = start.elapsed();

    assert_eq!(response.body.len(), size);
    assert!(elapsed >= min_duration(size, mbps), "too fast: {elapsed:?}");
}

#[tokio::test]
async fn test_unlimited_upload_counts_bytes() {
    let addr = spawn_server(ServerConfig::default()).await;
    let payload = vec![42u8; 3 * 1024 * 1024];

    let response = post(addr, "/api/upload", payload.clone()).await;
    assert_eq!(response.status, StatusCode::OK);

    let report: UploadReport = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(report.bytes_received, payload.len() as u64);
    assert!(!report.limited);
    assert!(response.json().get("maxConfiguredMbps").is_none());
}

#[tokio::test]
async fn test_limited_upload_never_drops_data() {
    let mbps = 8.0;
    let addr = spawn_server(ServerConfig {
        max_upload_mbps: Some(mbps),
        ..Default::default()
    })
    .await;

    // Odd size so the last drain chunk is partial
    let payload = vec![7u8; 512 * 1024 + 123];
    let start = Instant::now();
    let response = post(addr, "/api/upload", payload.clone()).await;
    let elapsed = start.elapsed();

    assert_eq!(response.status, StatusCode::OK);
    let report: UploadReport = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(report.bytes_received, payload.len() as u64);
    assert!(report.limited);
    assert_eq!(report.max_configured_mbps, Some(mbps));
    assert!(report.speed_mbps <= mbps * 1.1, "speed {}", report.speed_mbps);
    assert!(elapsed >= min_duration(payload.len(), mbps));
}

#[tokio::test]
async fn test_limited_upload_with_small_buffer() {
    let addr = spawn_server(ServerConfig {
        max_upload_mbps: Some(40.0),
        upload_buffer_limit: 64 * 1024,
        ..Default::default()
    })
    .await;

    let payload = vec![1u8; 1024 * 1024];
    let response = post(addr, "/api/upload", payload.clone()).await;

    assert_eq!(response.status, StatusCode::OK);
    let report: UploadReport = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(report.bytes_received, payload.len() as u64);
}

#[tokio::test]
async fn test_upload_timeout_responds_once() {
    let addr = spawn_server(ServerConfig {
        upload_timeout_secs: 1,
        ..Default::default()
    })
    .await;

    // Promise 1000 bytes, send 10, then stall
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "POST /api/upload HTTP/1.1\r\nHost: {addr}\r\nContent-Length: 1000\r\n\r\n0123456789"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let start = Instant::now();
    let (status, body) = read_raw_response(&mut stream).await;
    assert_eq!(status, 408);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["code"], "UPLOAD_TIMEOUT");
    assert!(start.elapsed() >= Duration::from_millis(900));

    // No second response may follow on the same connection
    let mut rest = vec![0u8; 1024];
    match tokio::time::timeout(Duration::from_millis(500), stream.read(&mut rest)).await {
        Ok(Ok(n)) => assert!(
            !String::from_utf8_lossy(&rest[..n]).contains("HTTP/1.1"),
            "unexpected second response"
        ),
        Ok(Err(_)) | Err(_) => {}
    }
}

#[tokio::test]
async fn test_load_chunk_echo() {
    let addr = spawn_server(ServerConfig::default()).await;

    let response = post(addr, "/api/load-chunk", vec![0u8; 100_000]).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["receivedSize"], 100_000);
    assert_eq!(body["timestamp"], body["responseTime"]);
}
