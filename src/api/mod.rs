mod error;
mod rest;
mod state;
mod types;
mod websocket;

pub use error::{ApiError, ApiResult};
pub use rest::{RestApi, MAX_LOAD_CHUNK_BYTES};
pub use state::AppState;
pub use types::*;
pub use websocket::websocket_handler;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create a complete API server with REST, WebSocket and static file support
pub fn create_api_server(state: AppState) -> Router {
    let state = Arc::new(state);
    let rest_api = RestApi::new(state.clone());
    let static_files = ServeDir::new(&state.config().static_dir);

    // Configure CORS to allow frontend requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ws_router = Router::new()
        .route("/ws", get(websocket_handler))
        .with_state(state);

    Router::new()
        .merge(rest_api.router())
        .merge(ws_router)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
