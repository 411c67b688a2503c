use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

use crate::source::ChatMessage;
use crate::translate::Translator;

/// Result of one `(message, target language)` translation task.
///
/// Tagged with both the message id and the target language so the
/// unordered completion stream cannot misattribute a translation.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    pub message_id: String,
    pub target_language: String,
    pub result: std::result::Result<String, String>,
}

/// Issues one concurrent translation task per target language and
/// yields outcomes as they complete.
///
/// Concurrency is bounded by a semaphore shared across all dispatches
/// of the session, so a burst of messages cannot overwhelm the backend.
pub struct FanoutDispatcher {
    gateway: Arc<dyn Translator>,
    permits: Arc<Semaphore>,
}

impl FanoutDispatcher {
    pub fn new(gateway: Arc<dyn Translator>, max_concurrency: usize) -> Self {
        Self {
            gateway,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Dispatch one message to all target languages.
    ///
    /// Returns a finite receiver producing exactly one outcome per
    /// target, in completion order. Each task's failure is isolated;
    /// the channel closes once every target has reported.
    pub fn dispatch(&self, message: &ChatMessage, targets: &[String]) -> mpsc::Receiver<TranslationOutcome> {
        let (tx, rx) = mpsc::channel(targets.len().max(1));

        for target in targets {
            let gateway = Arc::clone(&self.gateway);
            let permits = Arc::clone(&self.permits);
            let tx = tx.clone();
            let message_id = message.id.clone();
            let text = message.text.clone();
            let target = target.clone();

            tokio::spawn(async move {
                // Closed semaphore never happens here; permits live as
                // long as the dispatcher.
                let _permit = permits.acquire_owned().await;

                debug!("Translating message {} to {}", message_id, target);
                let result = gateway
                    .translate(&text, &target)
                    .await
                    .map_err(|e| e.to_string());

                // Receiver may be gone if the session stopped mid-dispatch
                let _ = tx.send(TranslationOutcome {
                    message_id,
                    target_language: target,
                    result,
                }).await;
            });
        }

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;
    use async_trait::async_trait;
    use chrono::Utc;

    use crate::error::{Result, ChatlateError};

    /// Test backend with a per-language delay and failure script.
    struct ScriptedTranslator {
        delays_ms: HashMap<String, u64>,
        failing: HashSet<String>,
    }

    #[async_trait]
    impl Translator for ScriptedTranslator {
        async fn translate(&self, text: &str, target_language: &str) -> Result<String> {
            if let Some(delay) = self.delays_ms.get(target_language) {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
            }
            if self.failing.contains(target_language) {
                return Err(ChatlateError::Translation(format!(
                    "scripted failure for {}", target_language
                )));
            }
            Ok(format!("{}:{}", target_language, text))
        }

        async fn detect_language(&self, _text: &str) -> Result<String> {
            Ok("en".to_string())
        }

        fn supports_detection(&self) -> bool {
            true
        }

        async fn check_availability(&self) -> Result<()> {
            Ok(())
        }
    }

    fn message(id: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            author: "alice".to_string(),
            text: text.to_string(),
            observed_at: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fanout_yields_one_outcome_per_target() {
        let gateway = Arc::new(ScriptedTranslator {
            delays_ms: HashMap::from([
                ("es".to_string(), 30),
                ("fr".to_string(), 10),
                ("ko".to_string(), 20),
            ]),
            failing: HashSet::new(),
        });
        let dispatcher = FanoutDispatcher::new(gateway, 4);

        let targets = vec!["es".to_string(), "fr".to_string(), "ko".to_string()];
        let mut rx = dispatcher.dispatch(&message("m1", "hello"), &targets);

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        assert_eq!(outcomes.len(), 3);
        let languages: HashSet<_> = outcomes.iter()
            .map(|o| o.target_language.clone())
            .collect();
        assert_eq!(languages, HashSet::from(["es".into(), "fr".into(), "ko".into()]));
        assert!(outcomes.iter().all(|o| o.message_id == "m1"));
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_arrive_in_completion_order() {
        let gateway = Arc::new(ScriptedTranslator {
            delays_ms: HashMap::from([
                ("es".to_string(), 100),
                ("fr".to_string(), 10),
            ]),
            failing: HashSet::new(),
        });
        let dispatcher = FanoutDispatcher::new(gateway, 4);

        let targets = vec!["es".to_string(), "fr".to_string()];
        let mut rx = dispatcher.dispatch(&message("m1", "hello"), &targets);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.target_language, "fr");
        assert_eq!(second.target_language, "es");
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_failure_does_not_affect_siblings() {
        let gateway = Arc::new(ScriptedTranslator {
            delays_ms: HashMap::new(),
            failing: HashSet::from(["fr".to_string()]),
        });
        let dispatcher = FanoutDispatcher::new(gateway, 4);

        let targets = vec!["es".to_string(), "fr".to_string(), "ko".to_string()];
        let mut rx = dispatcher.dispatch(&message("m1", "hello"), &targets);

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        assert_eq!(outcomes.len(), 3);
        let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].target_language, "fr");
        for outcome in outcomes.iter().filter(|o| o.result.is_ok()) {
            assert_eq!(
                outcome.result.as_ref().unwrap(),
                &format!("{}:hello", outcome.target_language)
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_target_set_closes_immediately() {
        let gateway = Arc::new(ScriptedTranslator {
            delays_ms: HashMap::new(),
            failing: HashSet::new(),
        });
        let dispatcher = FanoutDispatcher::new(gateway, 4);

        let mut rx = dispatcher.dispatch(&message("m1", "hello"), &[]);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_concurrency_still_completes_all_targets() {
        let gateway = Arc::new(ScriptedTranslator {
            delays_ms: HashMap::from([
                ("es".to_string(), 10),
                ("fr".to_string(), 10),
                ("ko".to_string(), 10),
                ("zh".to_string(), 10),
            ]),
            failing: HashSet::new(),
        });
        let dispatcher = FanoutDispatcher::new(gateway, 1);

        let targets: Vec<String> = ["es", "fr", "ko", "zh"].iter().map(|s| s.to_string()).collect();
        let mut rx = dispatcher.dispatch(&message("m1", "hello"), &targets);

        let mut count = 0;
        while rx.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 4);
    }
}
