//! Bufferbloat test server.
//!
//! Serves paced download and upload transfers next to a low-latency echo
//! channel, so clients can measure round-trip latency while the link is
//! saturated at a controlled rate.

pub mod api;
pub mod config;
pub mod echo;
pub mod metrics;
pub mod pacing;
pub mod session;
pub mod transfer;
