//! Latency echo channel: the message protocol spoken over `/ws`.
//!
//! Frames are JSON text messages of the form `{"event": <name>, "data": <payload>}`.
//! Every message is answered inline by the session's own task, so replies never
//! wait behind a paced transfer.

pub mod channel;
pub mod error;
pub mod types;

pub use channel::EchoChannel;
pub use error::{EchoError, EchoResult};
pub use types::{ClientEvent, LoadData, LoadResponse, ServerEvent, TestStarted};
