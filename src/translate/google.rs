use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, ChatlateError};
use super::Translator;

const ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google web translation backend.
///
/// Uses the unauthenticated `translate_a/single` endpoint. The response
/// is a nested JSON array: index 0 holds the translated segments and
/// index 2 the detected source language, which gives this backend its
/// detection capability.
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            endpoint: ENDPOINT.to_string(),
        }
    }

    async fn request(&self, text: &str, target_language: &str) -> Result<Value> {
        let target = target_language.to_lowercase();
        let response = self.client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| ChatlateError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatlateError::Translation(format!(
                "Google endpoint error {}: {}", status, body
            )));
        }

        response.json::<Value>().await
            .map_err(|e| ChatlateError::Translation(format!("Failed to parse response: {}", e)))
    }

    /// Concatenate the translated chunks at index 0 of the response.
    fn extract_translation(payload: &Value) -> Result<String> {
        let segments = payload
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ChatlateError::Translation(
                "Response missing translation segments".to_string()
            ))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();

        if text.is_empty() {
            return Err(ChatlateError::Translation("Empty translation received".to_string()));
        }
        Ok(text)
    }

    /// The detected source language rides at index 2 of the response.
    fn extract_detected_language(payload: &Value) -> Result<String> {
        payload
            .get(2)
            .and_then(Value::as_str)
            .map(|lang| lang.to_lowercase())
            .ok_or_else(|| ChatlateError::Translation(
                "Response missing detected language".to_string()
            ))
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        debug!("Translating to {} via Google endpoint", target_language);
        let payload = self.request(text, target_language).await?;
        Self::extract_translation(&payload)
    }

    async fn detect_language(&self, text: &str) -> Result<String> {
        // Any target works for detection; the detected language field
        // is present regardless.
        let payload = self.request(text, "en").await?;
        Self::extract_detected_language(&payload)
    }

    fn supports_detection(&self) -> bool {
        true
    }

    async fn check_availability(&self) -> Result<()> {
        // Public endpoint with no health resource; a session start
        // probes it with a minimal request instead.
        let payload = self.request("ping", "en").await?;
        Self::extract_translation(&payload).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_translation_concatenates_segments() {
        let payload = json!([
            [["Hello ", "こんにちは ", null], ["world", "世界", null]],
            null,
            "ja"
        ]);
        assert_eq!(
            GoogleTranslator::extract_translation(&payload).unwrap(),
            "Hello world"
        );
    }

    #[test]
    fn test_extract_detected_language() {
        let payload = json!([[["Hola", "Hello", null]], null, "EN"]);
        assert_eq!(
            GoogleTranslator::extract_detected_language(&payload).unwrap(),
            "en"
        );
    }

    #[test]
    fn test_extract_translation_rejects_malformed_payload() {
        let payload = json!({"unexpected": "shape"});
        assert!(GoogleTranslator::extract_translation(&payload).is_err());
        assert!(GoogleTranslator::extract_detected_language(&payload).is_err());
    }
}
