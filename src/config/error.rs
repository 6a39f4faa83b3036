use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive number of Mbps (got {value})")]
    InvalidRate { name: &'static str, value: f64 },

    #[error("Upload timeout must be at least one second")]
    InvalidTimeout,

    #[error("Pacing error: {0}")]
    Pacing(#[from] crate::pacing::PacingError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
