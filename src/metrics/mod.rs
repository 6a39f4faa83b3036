//! Metrics and observability module
//!
//! Prometheus-compatible metrics for the bufferbloat test server.
//!
//! Key metrics exposed:
//! - Bytes downloaded and uploaded, per pacing mode
//! - Completed, aborted, timed-out and failed transfers
//! - Effective transfer throughput
//! - Active echo sessions and echo message counts

pub mod exporter;
pub mod recorder;

pub use exporter::{metrics_route, serve_metrics, start_metrics_server, MetricsConfig, MetricsError};
pub use recorder::{
    init_metrics, record_download_aborted, record_download_complete, record_echo_message,
    record_session_closed, record_session_opened, record_upload_complete, record_upload_failed,
};
