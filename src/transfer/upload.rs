use crate::metrics;
use crate::pacing::{RateConfig, RatePacer, TransferState};
use crate::transfer::buffer::PendingBuffer;
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::types::UploadReport;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::time::Duration;

/// Default wall-clock budget for one upload exchange.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on bytes queued ahead of the paced drain.
pub const DEFAULT_BUFFER_LIMIT: usize = 16 * 1024 * 1024;

/// Consumes an inbound body and reports the observed upload speed.
///
/// Unlimited mode counts bytes as they arrive. Limited mode queues arrivals
/// in a [`PendingBuffer`] and counts them as the paced drain removes them,
/// so the reported rate never exceeds the configured cap. The report is
/// produced only after the queue is empty.
#[derive(Debug, Clone)]
pub struct UploadSink {
    rate: RateConfig,
    timeout: Duration,
    buffer_limit: usize,
}

impl UploadSink {
    pub fn new(rate: RateConfig) -> Self {
        Self {
            rate,
            timeout: DEFAULT_UPLOAD_TIMEOUT,
            buffer_limit: DEFAULT_BUFFER_LIMIT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Zero removes the bound
    pub fn with_buffer_limit(mut self, buffer_limit: usize) -> Self {
        self.buffer_limit = buffer_limit;
        self
    }

    /// Run one upload exchange to completion, timeout or stream failure.
    ///
    /// Exactly one outcome is produced. On timeout the in-flight read and
    /// drain are dropped with the inner future, so no completion report can
    /// follow.
    pub async fn receive<S, E>(&self, body: S) -> TransferResult<UploadReport>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let mut state = TransferState::new(None);
        let limited = self.rate.is_limited();

        tracing::info!(limited, "Upload test started");

        let consumed = tokio::time::timeout(self.timeout, async {
            if limited {
                self.consume_paced(body, &mut state).await
            } else {
                Self::consume_unlimited(body, &mut state).await
            }
        })
        .await;

        match consumed {
            Err(_) => {
                tracing::error!(
                    bytes = state.bytes_moved(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Upload test timeout"
                );
                metrics::record_upload_failed("timeout");
                Err(TransferError::Timeout(self.timeout))
            }
            Ok(Err(e)) => {
                tracing::error!(bytes = state.bytes_moved(), "Upload test error: {}", e);
                metrics::record_upload_failed("stream");
                Err(e)
            }
            Ok(Ok(())) => {
                state.finish();
                let report = UploadReport::from_state(&state, self.rate.target_mbps());
                tracing::info!(
                    bytes = report.bytes_received,
                    duration_ms = report.duration_ms,
                    mbps = report.speed_mbps,
                    limited,
                    "Upload test completed"
                );
                metrics::record_upload_complete(&report);
                Ok(report)
            }
        }
    }

    async fn consume_unlimited<S, E>(mut body: S, state: &mut TransferState) -> TransferResult<()>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| TransferError::Stream(e.to_string()))?;
            state.advance(chunk.len() as u64);
        }
        Ok(())
    }

    async fn consume_paced<S, E>(&self, mut body: S, state: &mut TransferState) -> TransferResult<()>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let pacer = RatePacer::new(self.rate);
        let buffer = PendingBuffer::new(self.buffer_limit);

        tracing::debug!(
            max_mbps = self.rate.target_mbps(),
            chunk_bytes = self.rate.chunk_bytes(),
            buffer_limit = self.buffer_limit,
            "Upload bandwidth limited"
        );

        let read = async {
            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| TransferError::Stream(e.to_string()))?;
                buffer.push(chunk).await;
            }
            buffer.close();
            Ok::<_, TransferError>(())
        };

        let drain = async {
            let mut clock = pacer.clock();
            while let Some(n) = buffer.take(self.rate.chunk_bytes()).await {
                state.advance(n as u64);
                clock.wait().await;
            }
            Ok::<_, TransferError>(())
        };

        // A read error drops the drain with it; the drain only ends once the
        // reader has closed the buffer and every queued byte is accounted
        tokio::try_join!(read, drain)?;
        Ok(())
    }
}
