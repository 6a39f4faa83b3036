use thiserror::Error;

#[derive(Error, Debug)]
pub enum EchoError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Session error: {0}")]
    Session(#[from] crate::session::SessionError),
}

pub type EchoResult<T> = Result<T, EchoError>;
