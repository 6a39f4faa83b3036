pub mod buffer;
pub mod download;
pub mod error;
pub mod types;
pub mod upload;

pub use buffer::PendingBuffer;
pub use download::{DownloadStream, DownloadStreamer};
pub use error::{TransferError, TransferResult};
pub use types::{DownloadReport, UploadReport, DEFAULT_DOWNLOAD_BYTES, MAX_DOWNLOAD_BYTES};
pub use upload::UploadSink;
