use crate::pacing::error::{PacingError, PacingResult};
use std::time::Duration;
use tokio::time::Instant;

/// Largest chunk emitted per pacing step on the download path.
pub const MAX_EMIT_CHUNK: usize = 256 * 1024;

/// Largest chunk drained per pacing step on the upload path.
pub const MAX_CONSUME_CHUNK: usize = 64 * 1024;

/// Mbps are binary megabits here: 1 Mbps = 1024 * 1024 / 8 bytes per second.
const BYTES_PER_SECOND_PER_MBPS: f64 = 1024.0 * 1024.0 / 8.0;

/// Target rate plus pacing granularity for one transfer direction.
///
/// A config without a target rate disables pacing entirely. The derived
/// chunk delay is computed on demand from immutable fields, so a transfer
/// that captured a `RateConfig` sees the same delay for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateConfig {
    target_mbps: Option<f64>,
    chunk_bytes: usize,
}

impl RateConfig {
    /// Create a config, validating the rate (if any) and chunk size
    pub fn new(target_mbps: Option<f64>, chunk_bytes: usize) -> PacingResult<Self> {
        if chunk_bytes == 0 {
            return Err(PacingError::ZeroChunkSize);
        }

        if let Some(mbps) = target_mbps {
            if !mbps.is_finite() || mbps <= 0.0 {
                return Err(PacingError::InvalidRate(mbps));
            }
        }

        Ok(Self {
            target_mbps,
            chunk_bytes,
        })
    }

    /// Transport-limited transfer, no artificial delay
    pub fn unlimited(chunk_bytes: usize) -> PacingResult<Self> {
        Self::new(None, chunk_bytes)
    }

    /// Transfer capped at `target_mbps`
    pub fn limited(target_mbps: f64, chunk_bytes: usize) -> PacingResult<Self> {
        Self::new(Some(target_mbps), chunk_bytes)
    }

    /// Same rate with a different chunk size.
    ///
    /// Used by the download path, which never emits chunks larger than the
    /// requested payload.
    pub fn with_chunk_bytes(&self, chunk_bytes: usize) -> PacingResult<Self> {
        Self::new(self.target_mbps, chunk_bytes)
    }

    pub fn target_mbps(&self) -> Option<f64> {
        self.target_mbps
    }

    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    pub fn is_limited(&self) -> bool {
        self.target_mbps.is_some()
    }

    pub fn bytes_per_second(&self) -> Option<f64> {
        self.target_mbps.map(|mbps| mbps * BYTES_PER_SECOND_PER_MBPS)
    }

    /// Delay between two consecutive chunks, `None` when unlimited
    pub fn chunk_delay(&self) -> Option<Duration> {
        self.bytes_per_second()
            .map(|bps| Duration::from_secs_f64(self.chunk_bytes as f64 / bps))
    }
}

/// Byte accounting for a single download or upload exchange.
#[derive(Debug, Clone)]
pub struct TransferState {
    total_bytes: Option<u64>,
    bytes_moved: u64,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl TransferState {
    /// `total_bytes` is `None` for uploads, whose length is only known at stream end
    pub fn new(total_bytes: Option<u64>) -> Self {
        Self {
            total_bytes,
            bytes_moved: 0,
            started_at: Instant::now(),
            finished_at: None,
        }
    }

    pub fn advance(&mut self, bytes: u64) {
        self.bytes_moved = self.bytes_moved.saturating_add(bytes);
    }

    pub fn finish(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Instant::now());
        }
    }

    pub fn bytes_moved(&self) -> u64 {
        self.bytes_moved
    }

    pub fn remaining(&self) -> Option<u64> {
        self.total_bytes
            .map(|total| total.saturating_sub(self.bytes_moved))
    }

    /// Elapsed time up to `finish()`, or up to now while still running
    pub fn elapsed(&self) -> Duration {
        self.finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }

    /// Effective throughput in decimal megabits per second
    pub fn effective_mbps(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            (self.bytes_moved as f64 * 8.0) / (secs * 1_000_000.0)
        } else {
            0.0
        }
    }
}
