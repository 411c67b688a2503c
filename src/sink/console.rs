use async_trait::async_trait;

use crate::error::Result;
use super::{ChatEvent, Sink};

/// Prints chat events to stdout, one line per event.
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }

    fn format_event(event: &ChatEvent) -> String {
        match event {
            ChatEvent::Original(record) => {
                format!("▶ {}: {}", record.author, record.text)
            }
            ChatEvent::Skipped { record, detected_language, .. } => {
                format!("▶ {} [{}] (skipped): {}", record.author, detected_language, record.text)
            }
            ChatEvent::Translated { target_language, translated, .. } => {
                format!("   → [{}]: {}", target_language, translated)
            }
            ChatEvent::Error { target_language, detail, .. } => {
                format!("   ✗ [{}] translation failed: {}", target_language, detail)
            }
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn emit(&self, event: &ChatEvent) -> Result<()> {
        println!("{}", Self::format_event(event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::sink::MessageRecord;

    fn record() -> MessageRecord {
        MessageRecord {
            message_id: "m1".to_string(),
            timestamp: Utc::now(),
            author: "alice".to_string(),
            text: "hello".to_string(),
        }
    }

    #[test]
    fn test_event_formatting() {
        assert_eq!(
            ConsoleSink::format_event(&ChatEvent::Original(record())),
            "▶ alice: hello"
        );
        assert_eq!(
            ConsoleSink::format_event(&ChatEvent::Translated {
                record: record(),
                target_language: "es".to_string(),
                translated: "hola".to_string(),
            }),
            "   → [es]: hola"
        );
        assert_eq!(
            ConsoleSink::format_event(&ChatEvent::Skipped {
                record: record(),
                detected_language: "ja".to_string(),
                reason: "configured".to_string(),
            }),
            "▶ alice [ja] (skipped): hello"
        );
    }
}
