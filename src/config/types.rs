use crate::config::error::{ConfigError, ConfigResult};
use crate::pacing::{RateConfig, MAX_CONSUME_CHUNK, MAX_EMIT_CHUNK};
use crate::transfer::upload::DEFAULT_BUFFER_LIMIT;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration, read from flags or the environment.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about = "Bufferbloat and speed test server")]
pub struct ServerConfig {
    /// Port to listen on
    #[arg(long, env = "LISTEN_PORT", default_value_t = 8081)]
    pub listen_port: u16,

    /// Externally visible base URL, defaults to http://localhost:<port>
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Download bandwidth cap in Mbps, unlimited when unset
    #[arg(long, env = "MAX_DOWNLOAD_MBPS")]
    pub max_download_mbps: Option<f64>,

    /// Upload bandwidth cap in Mbps, unlimited when unset
    #[arg(long, env = "MAX_UPLOAD_MBPS")]
    pub max_upload_mbps: Option<f64>,

    /// Suggested test duration handed to clients, in seconds
    #[arg(long, env = "DEFAULT_TEST_DURATION", default_value_t = 30)]
    pub test_duration: u64,

    /// Suggested echo packet size handed to clients, in bytes
    #[arg(long, env = "DEFAULT_PACKET_SIZE", default_value_t = 1024)]
    pub packet_size: u64,

    /// Suggested echo rate handed to clients, packets per second
    #[arg(long, env = "DEFAULT_PACKET_RATE", default_value_t = 100)]
    pub packet_rate: u64,

    /// Wall-clock budget for one upload exchange, in seconds
    #[arg(long, env = "UPLOAD_TIMEOUT_SECS", default_value_t = 30)]
    pub upload_timeout_secs: u64,

    /// Bytes a limited upload may queue ahead of the drain (0 = unbounded)
    #[arg(long, env = "UPLOAD_BUFFER_LIMIT_BYTES", default_value_t = DEFAULT_BUFFER_LIMIT)]
    pub upload_buffer_limit: usize,

    /// Directory of static frontend files
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    pub static_dir: PathBuf,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 8081,
            public_url: None,
            max_download_mbps: None,
            max_upload_mbps: None,
            test_duration: 30,
            packet_size: 1024,
            packet_rate: 100,
            upload_timeout_secs: 30,
            upload_buffer_limit: DEFAULT_BUFFER_LIMIT,
            static_dir: PathBuf::from("public"),
            metrics_addr: None,
        }
    }
}

impl ServerConfig {
    /// Load `.env` (if present), parse flags and environment, then validate
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in [
            ("MAX_DOWNLOAD_MBPS", self.max_download_mbps),
            ("MAX_UPLOAD_MBPS", self.max_upload_mbps),
        ] {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(ConfigError::InvalidRate { name, value });
                }
            }
        }

        if self.upload_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }

    pub fn public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.listen_port))
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.listen_port))
    }

    pub fn download_rate(&self) -> ConfigResult<RateConfig> {
        Ok(RateConfig::new(self.max_download_mbps, MAX_EMIT_CHUNK)?)
    }

    pub fn upload_rate(&self) -> ConfigResult<RateConfig> {
        Ok(RateConfig::new(self.max_upload_mbps, MAX_CONSUME_CHUNK)?)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.max_download_mbps.is_some() || self.max_upload_mbps.is_some()
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            listen_port: self.listen_port,
            public_url: self.public_url(),
            max_download_mbps: self.max_download_mbps,
            max_upload_mbps: self.max_upload_mbps,
            test_duration: self.test_duration,
            packet_size: self.packet_size,
            packet_rate: self.packet_rate,
        }
    }
}

/// Client-facing view of the active test configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    pub listen_port: u16,
    pub public_url: String,
    pub max_download_mbps: Option<f64>,
    pub max_upload_mbps: Option<f64>,
    pub test_duration: u64,
    pub packet_size: u64,
    pub packet_rate: u64,
}
