use crate::config::ConfigSnapshot;
use serde::{Deserialize, Serialize};

/// Body of `GET /api/config`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigResponse {
    pub public_url: String,
    pub max_download_mbps: Option<f64>,
    pub max_upload_mbps: Option<f64>,
    pub test_duration: u64,
    pub packet_size: u64,
    pub packet_rate: u64,
}

impl From<ConfigSnapshot> for ClientConfigResponse {
    fn from(snapshot: ConfigSnapshot) -> Self {
        Self {
            public_url: snapshot.public_url,
            max_download_mbps: snapshot.max_download_mbps,
            max_upload_mbps: snapshot.max_upload_mbps,
            test_duration: snapshot.test_duration,
            packet_size: snapshot.packet_size,
            packet_rate: snapshot.packet_rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadChunkResponse {
    pub timestamp: i64,
    pub received_size: usize,
    pub response_time: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PingQuery {
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub client_timestamp: i64,
    pub server_timestamp: i64,
    pub response_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub connections: usize,
    pub config: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
