// Output sinks
//
// Every processed message ends up here as a `ChatEvent`. Sinks are
// called from the poller task and from translation worker tasks
// concurrently, so implementations serialize internally.

pub mod console;
pub mod csv;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use console::ConsoleSink;
pub use csv::CsvSink;

use crate::error::Result;

/// The untranslated message fields shared by several event kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub message_id: String,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    pub text: String,
}

/// One pipeline output. Translated and Error events are tagged with
/// their originating message so unordered delivery across messages
/// cannot misattribute them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A new message entering the pipeline, before any translation
    Original(MessageRecord),
    /// A message whose detected language is configured to skip;
    /// recorded with its original text only
    Skipped { record: MessageRecord, detected_language: String, reason: String },
    /// One completed translation of a message
    Translated { record: MessageRecord, target_language: String, translated: String },
    /// One failed translation request, isolated to its target language
    Error { message_id: String, target_language: String, timestamp: DateTime<Utc>, detail: String },
}

/// Main trait for event output
#[async_trait]
pub trait Sink: Send + Sync {
    /// Emit one event. Must be safe to call from multiple tasks.
    async fn emit(&self, event: &ChatEvent) -> Result<()>;
}

/// Fans one event out to every configured sink. A failing sink is
/// logged by the caller and never stops the others.
pub struct MultiSink {
    sinks: Vec<Box<dyn Sink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl Sink for MultiSink {
    async fn emit(&self, event: &ChatEvent) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(event).await {
                tracing::warn!("Sink failed to record event: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;
    use super::*;

    /// Collects events in memory for assertions.
    #[derive(Default)]
    pub struct CollectingSink {
        events: Mutex<Vec<ChatEvent>>,
    }

    impl CollectingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<ChatEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sink for CollectingSink {
        async fn emit(&self, event: &ChatEvent) -> Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }
    }
}
