//! Chunk-by-chunk rate pacing.
//!
//! The pacer keeps an absolute schedule instead of sleeping a fixed delay
//! after each step: slot `k` never opens before `start + k * chunk_delay`.
//! Time spent inside a step (writing to a slow socket, generating payload)
//! is absorbed by the schedule rather than added on top of it, and a stall
//! never earns credit for a later burst.

use crate::pacing::types::RateConfig;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Absolute-deadline timer for one paced transfer.
///
/// Owned by the task running the transfer; sleeping on it suspends only that
/// task.
#[derive(Debug)]
pub struct PaceClock {
    interval: Option<Duration>,
    next: Instant,
}

impl PaceClock {
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Wait for the next slot. Returns immediately when unpaced.
    pub async fn wait(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };

        self.next += interval;
        let now = Instant::now();
        if self.next < now {
            self.next = now;
        }

        sleep_until(self.next).await;
    }
}

/// Drives a producer or consumer step function at the configured rate.
#[derive(Debug, Clone, Copy)]
pub struct RatePacer {
    config: RateConfig,
}

impl RatePacer {
    pub fn new(config: RateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RateConfig {
        &self.config
    }

    pub fn is_limited(&self) -> bool {
        self.config.is_limited()
    }

    /// Start a fresh schedule for one transfer
    pub fn clock(&self) -> PaceClock {
        PaceClock::new(self.config.chunk_delay())
    }

    /// Move `total_bytes` through `step`, returning the bytes actually moved.
    ///
    /// Unlimited configs call `step` once with the full amount. Limited
    /// configs call it with at most `chunk_bytes` per slot, strictly in
    /// sequence, and each step waits for its slot first: step `k` starts no
    /// earlier than `k * chunk_delay`, so the last byte of an `n`-chunk
    /// transfer cannot leave before `n * chunk_delay`.
    ///
    /// The loop stops early when `step` fails or reports zero progress;
    /// dropping the returned future cancels the remaining schedule.
    pub async fn pace<F, Fut, E>(&self, total_bytes: u64, mut step: F) -> Result<u64, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<usize, E>>,
    {
        if total_bytes == 0 {
            return Ok(0);
        }

        if !self.config.is_limited() {
            let all = usize::try_from(total_bytes).unwrap_or(usize::MAX);
            let moved = step(all).await?;
            return Ok(moved as u64);
        }

        let chunk = self.config.chunk_bytes() as u64;
        let mut clock = self.clock();
        let mut moved = 0u64;

        while moved < total_bytes {
            clock.wait().await;
            let want = (total_bytes - moved).min(chunk) as usize;
            let n = step(want).await?;
            if n == 0 {
                break;
            }
            moved += n as u64;
        }

        Ok(moved)
    }
}
