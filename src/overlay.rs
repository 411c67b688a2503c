use std::path::PathBuf;
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::config::OverlayConfig;
use crate::error::Result;

/// Pushes the latest chat line to a streaming overlay. Strictly
/// best-effort: callers swallow failures, a broken overlay never
/// affects the pipeline.
#[async_trait]
pub trait OverlayNotifier: Send + Sync {
    async fn set_display_text(&self, key: &str, text: &str) -> Result<()>;
}

/// Writes overlay text to `<directory>/<key>.txt`, the file-based
/// text-source pattern streaming software reads from disk.
pub struct FileOverlayNotifier {
    directory: PathBuf,
}

impl FileOverlayNotifier {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
        }
    }
}

#[async_trait]
impl OverlayNotifier for FileOverlayNotifier {
    async fn set_display_text(&self, key: &str, text: &str) -> Result<()> {
        let path = self.directory.join(format!("{}.txt", key));
        fs::write(&path, text).await?;
        debug!("Overlay '{}' updated", key);
        Ok(())
    }
}
