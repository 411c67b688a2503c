use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{Config, LanguageConfig};
use crate::dispatch::FanoutDispatcher;
use crate::error::Result;
use crate::filter::{EffectiveLanguages, FilterDecision, LanguageToggles};
use crate::overlay::OverlayNotifier;
use crate::sink::{ChatEvent, MessageRecord, Sink};
use crate::source::{ChatMessage, ChatSource, PollCursor};
use crate::translate::Translator;

/// Shared handles the per-message processing tasks run against.
struct ProcessingContext {
    gateway: Arc<dyn Translator>,
    dispatcher: FanoutDispatcher,
    sink: Arc<dyn Sink>,
    overlay: Option<Arc<dyn OverlayNotifier>>,
    overlay_key: String,
}

/// Session-scoped polling orchestrator.
///
/// Owns all mutable session state: the cursor, the seen-set, and the
/// set of in-flight processing tasks. The loop has exactly one
/// intended blocking point (the page fetch) plus the pacing sleep the
/// source demands; message processing runs on spawned tasks so slow
/// translation backends never stall chat capture.
pub struct ChatPoller {
    source: Arc<dyn ChatSource>,
    context: Arc<ProcessingContext>,
    languages: LanguageConfig,
    toggles: LanguageToggles,
    cancel: CancellationToken,
    fallback_interval_ms: u64,
    max_consecutive_failures: u32,
    seen: HashSet<String>,
    cursor: PollCursor,
    workers: JoinSet<()>,
}

impl ChatPoller {
    pub fn new(
        config: &Config,
        source: Arc<dyn ChatSource>,
        gateway: Arc<dyn Translator>,
        sink: Arc<dyn Sink>,
        overlay: Option<Arc<dyn OverlayNotifier>>,
        toggles: LanguageToggles,
        cancel: CancellationToken,
    ) -> Self {
        let dispatcher = FanoutDispatcher::new(
            Arc::clone(&gateway),
            config.translate.max_concurrency,
        );

        Self {
            source,
            context: Arc::new(ProcessingContext {
                gateway,
                dispatcher,
                sink,
                overlay,
                overlay_key: config.overlay.source_key.clone(),
            }),
            languages: config.languages.clone(),
            toggles,
            cancel,
            fallback_interval_ms: config.source.fallback_poll_interval_ms,
            max_consecutive_failures: config.source.max_consecutive_fetch_failures,
            seen: HashSet::new(),
            cursor: PollCursor::start(),
            workers: JoinSet::new(),
        }
    }

    /// Poll the chat session until cancelled or the failure ceiling is
    /// reached. In-flight translation work is drained before return.
    pub async fn run(&mut self, chat_id: &str) -> Result<()> {
        info!("Polling live chat session {}", chat_id);

        let mut interval_ms = self.fallback_interval_ms;
        let mut consecutive_failures: u32 = 0;

        while !self.cancel.is_cancelled() {
            match self.source.fetch_page(chat_id, &self.cursor).await {
                Ok(page) => {
                    consecutive_failures = 0;

                    // The source issues a fresh cursor on every call,
                    // also when the page is empty.
                    self.cursor = page.next_cursor;
                    interval_ms = page.poll_interval_ms;

                    // One resolved language snapshot per cycle
                    let effective = self.toggles.resolve(&self.languages);

                    for message in page.messages {
                        if !self.seen.insert(message.id.clone()) {
                            debug!("Duplicate message {} dropped", message.id);
                            continue;
                        }
                        self.spawn_processing(message, effective.clone());
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        "Fetch failed ({} consecutive): {}",
                        consecutive_failures, e
                    );
                    if self.max_consecutive_failures > 0
                        && consecutive_failures >= self.max_consecutive_failures
                    {
                        self.drain_workers().await;
                        return Err(e);
                    }
                }
            }

            // Reap finished processing tasks without blocking
            while self.workers.try_join_next().is_some() {}

            // The interval is authoritative rate governance from the
            // source; polling faster risks upstream rate limiting.
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(Duration::from_millis(interval_ms)) => {}
            }
        }

        info!("Poll loop stopped, draining in-flight translations");
        self.drain_workers().await;
        Ok(())
    }

    async fn drain_workers(&mut self) {
        while self.workers.join_next().await.is_some() {}
    }

    fn spawn_processing(&mut self, message: ChatMessage, effective: EffectiveLanguages) {
        let context = Arc::clone(&self.context);
        self.workers.spawn(async move {
            process_message(context, message, effective).await;
        });
    }
}

/// Filter → dispatch → sink pipeline for one new message.
async fn process_message(
    context: Arc<ProcessingContext>,
    message: ChatMessage,
    effective: EffectiveLanguages,
) {
    let record = MessageRecord {
        message_id: message.id.clone(),
        timestamp: message.observed_at,
        author: message.author.clone(),
        text: message.text.clone(),
    };

    if let Some(overlay) = &context.overlay {
        let line = format!("{}: {}", message.author, message.text);
        if let Err(e) = overlay.set_display_text(&context.overlay_key, &line).await {
            debug!("Overlay update failed: {}", e);
        }
    }

    // Detection is capability-gated; backends without it bypass skip
    // filtering and every message is translated.
    let detected = if context.gateway.supports_detection() {
        match context.gateway.detect_language(&message.text).await {
            Ok(language) => Some(language),
            Err(e) => {
                warn!("Language detection failed for {}: {}", message.id, e);
                None
            }
        }
    } else {
        None
    };

    match effective.should_translate(detected.as_deref()) {
        FilterDecision::Skip { reason } => {
            let event = ChatEvent::Skipped {
                record,
                detected_language: detected.unwrap_or_default(),
                reason,
            };
            if let Err(e) = context.sink.emit(&event).await {
                warn!("Failed to record skipped message: {}", e);
            }
        }
        FilterDecision::Translate => {
            if let Err(e) = context.sink.emit(&ChatEvent::Original(record.clone())).await {
                warn!("Failed to record message: {}", e);
            }

            let mut outcomes = context.dispatcher.dispatch(&message, &effective.targets);
            while let Some(outcome) = outcomes.recv().await {
                let event = match outcome.result {
                    Ok(translated) => ChatEvent::Translated {
                        record: record.clone(),
                        target_language: outcome.target_language,
                        translated,
                    },
                    Err(detail) => ChatEvent::Error {
                        message_id: outcome.message_id,
                        target_language: outcome.target_language,
                        timestamp: record.timestamp,
                        detail,
                    },
                };
                if let Err(e) = context.sink.emit(&event).await {
                    warn!("Failed to record translation outcome: {}", e);
                }
            }
        }
    }
}
