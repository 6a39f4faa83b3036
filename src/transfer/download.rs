use crate::metrics;
use crate::pacing::{PayloadSource, RateConfig, RatePacer, TransferState, MAX_EMIT_CHUNK};
use crate::transfer::error::{TransferError, TransferResult};
use crate::transfer::types::{DownloadReport, DEFAULT_DOWNLOAD_BYTES, MAX_DOWNLOAD_BYTES};
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Emits random payloads of an exact length, paced or transport-limited.
#[derive(Debug, Clone)]
pub struct DownloadStreamer {
    rate: RateConfig,
    source: PayloadSource,
}

impl DownloadStreamer {
    pub fn new(rate: RateConfig) -> Self {
        Self {
            rate,
            source: PayloadSource::new(),
        }
    }

    /// Clamp a requested size into `1..=MAX_DOWNLOAD_BYTES`; zero means default
    pub fn clamp_size(requested: u64) -> u64 {
        if requested == 0 {
            DEFAULT_DOWNLOAD_BYTES
        } else {
            requested.min(MAX_DOWNLOAD_BYTES)
        }
    }

    /// Parse a size path segment the lenient way browsers' clients expect:
    /// leading decimal digits are used, anything else falls back to the default.
    pub fn parse_size(raw: &str) -> u64 {
        let digits: String = raw
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();

        match digits.parse::<u64>() {
            Ok(size) => Self::clamp_size(size),
            // Overflowing digit strings are far above the cap anyway
            Err(_) if !digits.is_empty() => MAX_DOWNLOAD_BYTES,
            Err(_) => DEFAULT_DOWNLOAD_BYTES,
        }
    }

    /// Start producing `size` bytes on a dedicated task.
    ///
    /// The task hands chunks over a single-slot channel, so it never runs
    /// more than one chunk ahead of the transport. Dropping the returned
    /// stream (client disconnect) stops the task at once, even while it is
    /// waiting for its next slot.
    pub fn start(&self, size: u64) -> TransferResult<DownloadStream> {
        let size = Self::clamp_size(size);
        let chunk_bytes = (size as usize).min(MAX_EMIT_CHUNK);
        let pacer = RatePacer::new(self.rate.with_chunk_bytes(chunk_bytes)?);
        let source = self.source;
        let (tx, rx) = mpsc::channel::<Bytes>(1);

        if let Some(delay) = pacer.config().chunk_delay() {
            tracing::info!(
                max_mbps = pacer.config().target_mbps(),
                chunk_bytes,
                delay_ms = delay.as_secs_f64() * 1000.0,
                "Bandwidth-limited download"
            );
        }

        let producer = tokio::spawn(async move {
            let limited = pacer.is_limited();
            let mut state = TransferState::new(Some(size));
            let sent = AtomicU64::new(0);
            let tx = &tx;
            let counter = &sent;

            let paced = pacer.pace(size, move |n| async move {
                let permit = tx
                    .reserve()
                    .await
                    .map_err(|_| TransferError::ClientDisconnected)?;
                permit.send(source.generate(n));
                counter.fetch_add(n as u64, Ordering::Relaxed);
                Ok::<_, TransferError>(n)
            });

            // The body going away must end the task even mid-slot
            let result = tokio::select! {
                biased;
                result = paced => result,
                _ = tx.closed() => Err(TransferError::ClientDisconnected),
            };

            state.advance(sent.load(Ordering::Relaxed));
            state.finish();
            let report = DownloadReport::from_state(&state, limited);

            match result {
                Ok(_) => {
                    tracing::info!(
                        bytes = report.bytes_sent,
                        elapsed_ms = report.elapsed_ms,
                        mbps = report.mbps,
                        limited,
                        "Download completed"
                    );
                    metrics::record_download_complete(&report);
                    Ok(report)
                }
                Err(e) => {
                    tracing::info!(
                        bytes = report.bytes_sent,
                        remaining = state.remaining(),
                        elapsed_ms = report.elapsed_ms,
                        "Download aborted: {}",
                        e
                    );
                    metrics::record_download_aborted(report.bytes_sent);
                    Err(e)
                }
            }
        });

        Ok(DownloadStream { size, rx, producer })
    }
}

/// Body of one download; yields chunks until exactly `content_length()` bytes
pub struct DownloadStream {
    size: u64,
    rx: mpsc::Receiver<Bytes>,
    producer: JoinHandle<TransferResult<DownloadReport>>,
}

impl DownloadStream {
    pub fn content_length(&self) -> u64 {
        self.size
    }

    /// Chunk stream for the response body; the producer task is detached
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
        self.into_parts().0
    }

    pub fn into_parts(
        self,
    ) -> (
        impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static,
        JoinHandle<TransferResult<DownloadReport>>,
    ) {
        let body = futures::stream::unfold(self.rx, |mut rx| async move {
            rx.recv().await.map(|chunk| (Ok(chunk), rx))
        });
        (body, self.producer)
    }
}
