use crate::config::{ConfigResult, ServerConfig};
use crate::session::SessionRegistry;
use crate::transfer::{DownloadStreamer, UploadSink};

/// Everything the handlers share: configuration, the session registry and
/// the two transfer engines built from the configured rates.
#[derive(Debug, Clone)]
pub struct AppState {
    config: ServerConfig,
    registry: SessionRegistry,
    downloads: DownloadStreamer,
    uploads: UploadSink,
}

impl AppState {
    pub fn new(config: ServerConfig) -> ConfigResult<Self> {
        config.validate()?;

        let downloads = DownloadStreamer::new(config.download_rate()?);
        let uploads = UploadSink::new(config.upload_rate()?)
            .with_timeout(config.upload_timeout())
            .with_buffer_limit(config.upload_buffer_limit);

        Ok(Self {
            config,
            registry: SessionRegistry::new(),
            downloads,
            uploads,
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn downloads(&self) -> &DownloadStreamer {
        &self.downloads
    }

    pub fn uploads(&self) -> &UploadSink {
        &self.uploads
    }
}
