//! Inbound byte queue for rate-limited uploads.

use bytes::{Buf, Bytes};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    chunks: VecDeque<Bytes>,
    len: usize,
    closed: bool,
}

/// Ordered queue between the upload reader and the paced drain.
///
/// One producer pushes whole inbound chunks, one consumer takes byte counts
/// from the front. When `limit` is non-zero the producer waits once the
/// queue holds `limit` bytes or more, so the reader stops pulling from the
/// socket and the peer sees real backpressure. A `limit` of zero never
/// blocks the producer.
#[derive(Debug)]
pub struct PendingBuffer {
    inner: Mutex<Inner>,
    limit: usize,
    readable: Notify,
    writable: Notify,
}

impl PendingBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            limit,
            readable: Notify::new(),
            writable: Notify::new(),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    /// Append a chunk, waiting for room if the queue is at its limit
    pub async fn push(&self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }

        loop {
            {
                let mut inner = self.inner.lock();
                if self.limit == 0 || inner.len < self.limit {
                    inner.len += chunk.len();
                    inner.chunks.push_back(chunk);
                    drop(inner);
                    self.readable.notify_one();
                    return;
                }
            }
            self.writable.notified().await;
        }
    }

    /// Mark the inbound stream as finished
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.readable.notify_one();
    }

    /// Remove up to `max` bytes from the front.
    ///
    /// Waits while the queue is empty and open. Returns `None` once the
    /// queue is closed and fully drained.
    pub async fn take(&self, max: usize) -> Option<usize> {
        loop {
            {
                let mut inner = self.inner.lock();
                if inner.len > 0 {
                    let taken = Self::take_locked(&mut inner, max);
                    drop(inner);
                    self.writable.notify_one();
                    return Some(taken);
                }
                if inner.closed {
                    return None;
                }
            }
            self.readable.notified().await;
        }
    }

    fn take_locked(inner: &mut Inner, max: usize) -> usize {
        let mut taken = 0;

        while taken < max {
            let Some(front) = inner.chunks.front_mut() else {
                break;
            };

            let want = max - taken;
            if front.len() <= want {
                taken += front.len();
                inner.chunks.pop_front();
            } else {
                front.advance(want);
                taken += want;
            }
        }

        inner.len -= taken;
        taken
    }
}
