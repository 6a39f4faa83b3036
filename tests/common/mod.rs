//! Shared helpers for integration tests: a live server on a random port and
//! an HTTP/1.1 client for it.

#![allow(dead_code)]

use bloatmeter::api::{create_api_server, AppState};
use bloatmeter::config::ServerConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::client::conn::http1;
use hyper::header::{HeaderMap, CONTENT_TYPE, HOST};
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};

pub async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let app = create_api_server(AppState::new(config).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Open a fresh HTTP/1.1 connection to the server
pub async fn connect(addr: SocketAddr) -> http1::SendRequest<Full<Bytes>> {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();

    tokio::spawn(async move {
        if let Err(e) = conn.await {
            println!("Connection error: {e}");
        }
    });

    sender
}

pub fn request(addr: SocketAddr, method: Method, path: &str, body: Vec<u8>) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, addr.to_string())
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

/// Send one request and read the whole response body
pub async fn send(addr: SocketAddr, req: Request<Full<Bytes>>) -> HttpResponse {
    let mut sender = connect(addr).await;
    let response = sender.send_request(req).await.unwrap();

    let (parts, body) = response.into_parts();
    let body = body.collect().await.unwrap().to_bytes();

    HttpResponse {
        status: parts.status,
        headers: parts.headers,
        body,
    }
}

pub async fn get(addr: SocketAddr, path: &str) -> HttpResponse {
    send(addr, request(addr, Method::GET, path, Vec::new())).await
}

pub async fn post(addr: SocketAddr, path: &str, body: Vec<u8>) -> HttpResponse {
    send(addr, request(addr, Method::POST, path, body)).await
}

/// Raw status code and body of one Content-Length response on a plain socket.
///
/// Used where the request itself has to misbehave (a body that never
/// finishes), which a well-formed client cannot send.
pub async fn read_raw_response(stream: &mut TcpStream) -> (u16, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = vec![0u8; 16 * 1024];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response headers");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let content_length: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .expect("content-length header");

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    (status, body)
}
