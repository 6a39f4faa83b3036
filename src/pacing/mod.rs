//! Bandwidth pacing primitives shared by the download and upload paths.

pub mod error;
pub mod pacer;
pub mod payload;
pub mod types;

pub use error::{PacingError, PacingResult};
pub use pacer::{PaceClock, RatePacer};
pub use payload::PayloadSource;
pub use types::{RateConfig, TransferState, MAX_CONSUME_CHUNK, MAX_EMIT_CHUNK};
