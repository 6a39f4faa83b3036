use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::api::types::*;
use crate::session::now_millis;
use crate::transfer::{DownloadStreamer, UploadReport};
use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Path, Query, State},
    http::header,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Largest body accepted by `/api/load-chunk`.
pub const MAX_LOAD_CHUNK_BYTES: usize = 100 * 1024 * 1024;

pub struct RestApi {
    state: Arc<AppState>,
}

impl RestApi {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/config", get(get_config))
            .route("/api/download/:size", get(download))
            .route("/api/upload", post(upload))
            .route(
                "/api/load-chunk",
                post(load_chunk).layer(DefaultBodyLimit::max(MAX_LOAD_CHUNK_BYTES)),
            )
            .route("/api/ping", get(ping))
            .route("/api/health", get(health_check))
            .with_state(self.state.clone())
    }
}

async fn get_config(State(state): State<Arc<AppState>>) -> Json<ClientConfigResponse> {
    Json(state.config().snapshot().into())
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path(size): Path<String>,
) -> ApiResult<Response> {
    let stream = state
        .downloads()
        .start(DownloadStreamer::parse_size(&size))?;
    let content_length = stream.content_length();

    Response::builder()
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONTENT_LENGTH, content_length)
        .body(Body::from_stream(stream.into_stream()))
        .map_err(|e| ApiError::InternalError(format!("Failed to build download response: {e}")))
}

async fn upload(State(state): State<Arc<AppState>>, body: Body) -> ApiResult<Json<UploadReport>> {
    let report = state.uploads().receive(body.into_data_stream()).await?;
    Ok(Json(report))
}

async fn load_chunk(body: Bytes) -> Json<LoadChunkResponse> {
    let timestamp = now_millis();

    Json(LoadChunkResponse {
        timestamp,
        received_size: body.len(),
        response_time: timestamp,
    })
}

async fn ping(Query(query): Query<PingQuery>) -> Json<PingResponse> {
    let server_timestamp = now_millis();
    let client_timestamp = query
        .timestamp
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(server_timestamp);

    Json(PingResponse {
        client_timestamp,
        server_timestamp,
        response_time: server_timestamp,
    })
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now_millis(),
        connections: state.registry().len(),
        config: state.config().snapshot(),
    })
}

/// Integer prefix of `raw`, with an optional sign
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());

    rest[..digits_end].parse::<i64>().ok().map(|v| sign * v)
}
