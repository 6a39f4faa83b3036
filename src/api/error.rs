use crate::api::types::ErrorResponse;
use crate::transfer::TransferError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_code) = match self {
            ApiError::Transfer(TransferError::Timeout(_)) => (
                StatusCode::REQUEST_TIMEOUT,
                "Upload test timeout".to_string(),
                "UPLOAD_TIMEOUT",
            ),
            ApiError::Transfer(TransferError::Stream(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upload test failed".to_string(),
                "UPLOAD_FAILED",
            ),
            ApiError::Transfer(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), "TRANSFER_ERROR")
            }
            ApiError::InternalError(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e, "INTERNAL_ERROR")
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
            code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
