use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::filter::LanguageToggles;
use crate::overlay::{FileOverlayNotifier, OverlayNotifier};
use crate::poller::ChatPoller;
use crate::sink::{ConsoleSink, CsvSink, MultiSink, Sink};
use crate::source::{ActiveChat, StreamLocator, YouTubeChatSource};
use crate::translate::TranslatorFactory;

/// Wires the chat source, translation gateway, sinks, and poller
/// together for one live chat session.
pub struct Workflow {
    config: Config,
    toggles: LanguageToggles,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        config.validate_for_run()?;
        Ok(Self {
            config,
            toggles: LanguageToggles::new(),
        })
    }

    /// Runtime language toggle handle, shared with the poller.
    pub fn toggles(&self) -> LanguageToggles {
        self.toggles.clone()
    }

    /// Resolve the configured channel to its active live chat session.
    pub async fn locate(&self) -> Result<ActiveChat> {
        let source = YouTubeChatSource::new(&self.config.source);
        source.locate_active_chat(&self.config.source.channel_id).await
    }

    /// Run one full chat translation session until the token is
    /// cancelled or the session fails.
    ///
    /// Session-start failures (no live stream, unreachable backend)
    /// surface here before the first poll.
    pub async fn run_session(&self, cancel: CancellationToken) -> Result<()> {
        let source = Arc::new(YouTubeChatSource::new(&self.config.source));
        let gateway = TranslatorFactory::create_translator(&self.config.translate);

        info!("Checking translation backend availability");
        gateway.check_availability().await?;

        let active = source.locate_active_chat(&self.config.source.channel_id).await?;
        info!("Live stream detected — videoId={}", active.video_id);

        let csv = CsvSink::create(&self.config.log.directory).await?;
        let sink: Arc<dyn Sink> = Arc::new(MultiSink::new(vec![
            Box::new(ConsoleSink::new()),
            Box::new(csv),
        ]));

        let overlay: Option<Arc<dyn OverlayNotifier>> = if self.config.overlay.enabled {
            Some(Arc::new(FileOverlayNotifier::new(&self.config.overlay)))
        } else {
            None
        };

        let mut poller = ChatPoller::new(
            &self.config,
            source,
            gateway,
            sink,
            overlay,
            self.toggles.clone(),
            cancel,
        );

        poller.run(&active.chat_id).await
    }
}
