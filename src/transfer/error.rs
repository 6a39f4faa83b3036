use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Upload test timeout after {0:?}")]
    Timeout(Duration),

    #[error("Upload stream failed: {0}")]
    Stream(String),

    #[error("Client disconnected")]
    ClientDisconnected,

    #[error("Pacing error: {0}")]
    Pacing(#[from] crate::pacing::PacingError),
}

pub type TransferResult<T> = Result<T, TransferError>;
