pub mod error;
pub mod registry;
pub mod types;

pub use error::{SessionError, SessionResult};
pub use registry::{SessionGuard, SessionRegistry};
pub use types::{now_millis, EchoSession};
