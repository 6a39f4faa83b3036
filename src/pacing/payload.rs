use bytes::Bytes;
use rand::RngCore;

/// Source of random filler bytes for download payloads.
///
/// The content only has to defeat compression and caching on the path, so
/// the thread-local generator is used rather than an OS entropy read per
/// chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadSource;

impl PayloadSource {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, len: usize) -> Bytes {
        let mut buf = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut buf);
        Bytes::from(buf)
    }
}
