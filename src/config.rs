use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use crate::error::{Result, ChatlateError};

// Default values for polling and fan-out configuration
fn default_fallback_poll_interval_ms() -> u64 {
    2000
}

fn default_max_concurrency() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub translate: TranslateConfig,
    pub languages: LanguageConfig,
    pub log: LogConfig,
    pub overlay: OverlayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// YouTube Data API key
    pub api_key: String,
    /// Channel to watch for live streams
    pub channel_id: String,
    /// Sleep interval when a fetch fails and no interval is known (milliseconds)
    #[serde(default = "default_fallback_poll_interval_ms")]
    pub fallback_poll_interval_ms: u64,
    /// Consecutive fetch failures before the session is abandoned (0 = never give up)
    #[serde(default)]
    pub max_consecutive_fetch_failures: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation backend: Google or Libre
    pub backend: TranslationBackend,
    /// LibreTranslate endpoint URL (used by the Libre backend)
    pub libre_endpoint: String,
    /// Maximum concurrent translation requests across all messages
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-request timeout for translation calls (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationBackend {
    /// Google web translation endpoint; supports translation and language detection
    Google,
    /// Self-hosted LibreTranslate service; translation only, no detection
    Libre,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Languages selectable as translation targets
    pub enabled_languages: Vec<String>,
    /// Targets every message is translated into by default
    pub default_target_languages: Vec<String>,
    /// Detected source languages that skip translation entirely
    pub skip_languages: Vec<String>,
    /// Display name to language code map for operator-facing listings
    #[serde(default)]
    pub lang_options: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory where session CSV logs are written
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Enable the streaming overlay text output
    pub enabled: bool,
    /// Directory where overlay text files are written, one per source key
    pub directory: String,
    /// Overlay source key receiving the latest chat line
    pub source_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                api_key: String::new(),
                channel_id: String::new(),
                fallback_poll_interval_ms: default_fallback_poll_interval_ms(),
                max_consecutive_fetch_failures: 0,
            },
            translate: TranslateConfig {
                backend: TranslationBackend::Google,
                libre_endpoint: "http://localhost:5000/translate".to_string(),
                max_concurrency: default_max_concurrency(),
                request_timeout_secs: default_request_timeout_secs(),
            },
            languages: LanguageConfig {
                enabled_languages: vec![
                    "ja".to_string(),
                    "en".to_string(),
                    "id".to_string(),
                    "es".to_string(),
                    "fr".to_string(),
                    "ko".to_string(),
                    "zh".to_string(),
                ],
                default_target_languages: vec![
                    "ja".to_string(),
                    "en".to_string(),
                    "id".to_string(),
                ],
                skip_languages: vec!["ja".to_string()],
                lang_options: BTreeMap::from([
                    ("Japanese".to_string(), "ja".to_string()),
                    ("English".to_string(), "en".to_string()),
                    ("Indonesian".to_string(), "id".to_string()),
                    ("Spanish".to_string(), "es".to_string()),
                    ("French".to_string(), "fr".to_string()),
                    ("Korean".to_string(), "ko".to_string()),
                    ("Chinese".to_string(), "zh".to_string()),
                ]),
            },
            log: LogConfig {
                directory: ".".to_string(),
            },
            overlay: OverlayConfig {
                enabled: false,
                directory: ".".to_string(),
                source_key: "LiveChatOverlay".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChatlateError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| ChatlateError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ChatlateError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ChatlateError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Presence checks for fields polling cannot start without.
    pub fn validate_for_run(&self) -> Result<()> {
        if self.source.api_key.is_empty() {
            return Err(ChatlateError::Config("source.api_key is not set".to_string()));
        }
        if self.source.channel_id.is_empty() {
            return Err(ChatlateError::Config("source.channel_id is not set".to_string()));
        }
        Ok(())
    }
}
