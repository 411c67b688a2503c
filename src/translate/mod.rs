// Translation gateway
//
// Two interchangeable backends behind one trait:
// - Google: free web translation endpoint, supports translate and detect
// - Libre: self-hosted LibreTranslate HTTP service, translate only
//
// Detection capability differs between backends, so it is an explicit
// query on the trait rather than a call that may or may not fail.

pub mod google;
pub mod libre;

use std::sync::Arc;
use async_trait::async_trait;

pub use google::GoogleTranslator;
pub use libre::LibreTranslator;

use crate::config::{TranslateConfig, TranslationBackend};
use crate::error::Result;

/// Main trait for translation operations
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate text into the target language.
    async fn translate(&self, text: &str, target_language: &str) -> Result<String>;

    /// Detect the source language of the text.
    ///
    /// Only valid when `supports_detection()` returns true; backends
    /// without detection return a `Translation` error rather than a
    /// guessed language.
    async fn detect_language(&self, text: &str) -> Result<String>;

    /// Whether this backend can detect source languages. Callers gate
    /// skip filtering on this instead of probing `detect_language`.
    fn supports_detection(&self) -> bool;

    /// Verify the backend is reachable before a session starts.
    async fn check_availability(&self) -> Result<()>;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create a translator based on the configured backend
    pub fn create_translator(config: &TranslateConfig) -> Arc<dyn Translator> {
        match config.backend {
            TranslationBackend::Google => Arc::new(GoogleTranslator::new(config)),
            TranslationBackend::Libre => Arc::new(LibreTranslator::new(config)),
        }
    }
}
