use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{Result, ChatlateError};
use super::Translator;

/// Self-hosted LibreTranslate backend. Translation only; language
/// detection is not part of this backend's capability set, so skip
/// filtering is bypassed when it is selected.
pub struct LibreTranslator {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
struct LibreRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LibreResponse {
    translated_text: Option<String>,
}

impl LibreTranslator {
    pub fn new(config: &TranslateConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            endpoint: config.libre_endpoint.clone(),
        }
    }
}

#[async_trait]
impl Translator for LibreTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
        debug!("Translating to {} via LibreTranslate at {}", target_language, self.endpoint);

        let request = LibreRequest {
            q: text,
            source: "auto",
            target: target_language,
            format: "text",
        };

        let response = self.client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatlateError::Translation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatlateError::Translation(format!(
                "LibreTranslate error {}: {}", status, body
            )));
        }

        let parsed: LibreResponse = response.json().await
            .map_err(|e| ChatlateError::Translation(format!("Failed to parse response: {}", e)))?;

        parsed.translated_text
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ChatlateError::Translation(
                "Response missing translatedText field".to_string()
            ))
    }

    async fn detect_language(&self, _text: &str) -> Result<String> {
        Err(ChatlateError::Translation(
            "LibreTranslate backend does not support language detection".to_string()
        ))
    }

    fn supports_detection(&self) -> bool {
        false
    }

    async fn check_availability(&self) -> Result<()> {
        let response = self.client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| ChatlateError::Translation(format!(
                "LibreTranslate endpoint unreachable: {}", e
            )))?;

        // A GET on the translate resource returns 405 on a healthy
        // service; only connection-level failures matter here.
        debug!("LibreTranslate endpoint responded with {}", response.status());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_libre_request_serializes_expected_fields() {
        let request = LibreRequest {
            q: "hello",
            source: "auto",
            target: "es",
            format: "text",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["q"], "hello");
        assert_eq!(json["source"], "auto");
        assert_eq!(json["target"], "es");
        assert_eq!(json["format"], "text");
    }

    #[test]
    fn test_libre_response_parsing() {
        let parsed: LibreResponse =
            serde_json::from_str(r#"{"translatedText": "hola"}"#).unwrap();
        assert_eq!(parsed.translated_text.as_deref(), Some("hola"));

        let missing: LibreResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(missing.translated_text.is_none());
    }

    #[tokio::test]
    async fn test_detection_is_not_supported() {
        let config = TranslateConfig {
            backend: crate::config::TranslationBackend::Libre,
            libre_endpoint: "http://localhost:5000/translate".to_string(),
            max_concurrency: 4,
            request_timeout_secs: 30,
        };
        let translator = LibreTranslator::new(&config);
        assert!(!translator.supports_detection());
        assert!(translator.detect_language("hello").await.is_err());
    }
}
