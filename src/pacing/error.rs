use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PacingError {
    #[error("Invalid target rate: {0} Mbps (must be positive and finite)")]
    InvalidRate(f64),

    #[error("Chunk size must be greater than zero")]
    ZeroChunkSize,
}

pub type PacingResult<T> = Result<T, PacingError>;
