pub mod error;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use types::{ConfigSnapshot, ServerConfig};
