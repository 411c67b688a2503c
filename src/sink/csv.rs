use std::path::{Path, PathBuf};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::{Result, ChatlateError};
use super::{ChatEvent, MessageRecord, Sink};

const HEADER: &str = "timestamp,author,lang,original,translated\n";

/// Append-only session log.
///
/// One file per session, `chatlog_YYYYMMDD_HHMMSS.csv`, with one row
/// per original message (`lang` = `original`) and one per completed
/// translation (`lang` = target code). Writes are serialized behind a
/// mutex since events arrive from the poller and worker tasks.
pub struct CsvSink {
    file: Mutex<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Create the session log file in the given directory and write
    /// the header row.
    pub async fn create<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        fs::create_dir_all(directory).await
            .map_err(|e| ChatlateError::Sink(format!("Failed to create log directory: {}", e)))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = directory.join(format!("chatlog_{}.csv", stamp));

        let mut file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| ChatlateError::Sink(format!("Failed to create log file: {}", e)))?;

        file.write_all(HEADER.as_bytes()).await
            .map_err(|e| ChatlateError::Sink(format!("Failed to write log header: {}", e)))?;

        info!("Session log: {}", path.display());

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn append_row(
        &self,
        timestamp: &DateTime<Utc>,
        author: &str,
        lang: &str,
        original: &str,
        translated: &str,
    ) -> Result<()> {
        let row = format!(
            "{},{},{},{},{}\n",
            escape_field(&timestamp.to_rfc3339()),
            escape_field(author),
            escape_field(lang),
            escape_field(original),
            escape_field(translated),
        );

        let mut file = self.file.lock().await;
        file.write_all(row.as_bytes()).await
            .map_err(|e| ChatlateError::Sink(format!("Failed to append log row: {}", e)))?;
        file.flush().await
            .map_err(|e| ChatlateError::Sink(format!("Failed to flush log: {}", e)))?;
        Ok(())
    }

    async fn append_original_row(&self, record: &MessageRecord) -> Result<()> {
        // The translated column repeats the original text for the
        // untranslated row, keeping every row the same shape.
        self.append_row(
            &record.timestamp,
            &record.author,
            "original",
            &record.text,
            &record.text,
        ).await
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[async_trait]
impl Sink for CsvSink {
    async fn emit(&self, event: &ChatEvent) -> Result<()> {
        match event {
            ChatEvent::Original(record) => self.append_original_row(record).await,
            ChatEvent::Skipped { record, .. } => self.append_original_row(record).await,
            ChatEvent::Translated { record, target_language, translated } => {
                self.append_row(
                    &record.timestamp,
                    &record.author,
                    target_language,
                    &record.text,
                    translated,
                ).await
            }
            // Error notices are display-only; the log keeps chat rows
            ChatEvent::Error { .. } => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(author: &str, text: &str) -> MessageRecord {
        MessageRecord {
            message_id: "m1".to_string(),
            timestamp: Utc::now(),
            author: author.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[tokio::test]
    async fn test_rows_for_original_and_translation() {
        let dir = tempdir().unwrap();
        let sink = CsvSink::create(dir.path()).await.unwrap();

        let rec = record("alice", "hello, world");
        sink.emit(&ChatEvent::Original(rec.clone())).await.unwrap();
        sink.emit(&ChatEvent::Translated {
            record: rec,
            target_language: "es".to_string(),
            translated: "hola, mundo".to_string(),
        }).await.unwrap();
        sink.emit(&ChatEvent::Error {
            message_id: "m1".to_string(),
            target_language: "fr".to_string(),
            timestamp: Utc::now(),
            detail: "boom".to_string(),
        }).await.unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,author,lang,original,translated");
        assert!(lines[1].contains("alice,original,\"hello, world\",\"hello, world\""));
        assert!(lines[2].contains("alice,es,\"hello, world\",\"hola, mundo\""));
        // Error notices produce no row
        assert_eq!(lines.len(), 3);
    }

    #[tokio::test]
    async fn test_skipped_message_records_original_text_only() {
        let dir = tempdir().unwrap();
        let sink = CsvSink::create(dir.path()).await.unwrap();

        sink.emit(&ChatEvent::Skipped {
            record: record("bob", "こんにちは"),
            detected_language: "ja".to_string(),
            reason: "configured".to_string(),
        }).await.unwrap();

        let content = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("bob,original,こんにちは,こんにちは"));
    }
}
