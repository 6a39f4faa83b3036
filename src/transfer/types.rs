use crate::pacing::TransferState;
use serde::{Deserialize, Serialize};

/// Hard cap on a single download payload.
pub const MAX_DOWNLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Payload size used when the requested size is missing or unusable.
pub const DEFAULT_DOWNLOAD_BYTES: u64 = 1024;

/// Result body of `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub bytes_received: u64,
    pub duration_ms: u64,
    pub speed_mbps: f64,
    pub limited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_configured_mbps: Option<f64>,
}

impl UploadReport {
    pub fn from_state(state: &TransferState, max_configured_mbps: Option<f64>) -> Self {
        Self {
            bytes_received: state.bytes_moved(),
            duration_ms: state.elapsed().as_millis() as u64,
            speed_mbps: state.effective_mbps(),
            limited: max_configured_mbps.is_some(),
            max_configured_mbps,
        }
    }
}

/// Completion summary of a download; logged, never sent to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub bytes_sent: u64,
    pub elapsed_ms: u64,
    pub mbps: f64,
    pub limited: bool,
}

impl DownloadReport {
    pub fn from_state(state: &TransferState, limited: bool) -> Self {
        Self {
            bytes_sent: state.bytes_moved(),
            elapsed_ms: state.elapsed().as_millis() as u64,
            mbps: state.effective_mbps(),
            limited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_report_omits_max() {
        let report = UploadReport {
            bytes_received: 100,
            duration_ms: 10,
            speed_mbps: 0.08,
            limited: false,
            max_configured_mbps: None,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["bytesReceived"], 100);
        assert_eq!(json["durationMs"], 10);
        assert_eq!(json["limited"], false);
        assert!(json.get("maxConfiguredMbps").is_none());
    }

    #[test]
    fn test_limited_report_includes_max() {
        let report = UploadReport {
            bytes_received: 100,
            duration_ms: 10,
            speed_mbps: 0.08,
            limited: true,
            max_configured_mbps: Some(25.0),
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"maxConfiguredMbps\":25.0"));
        assert!(json.contains("\"speedMbps\""));
    }
}
