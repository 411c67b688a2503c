use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::config::LanguageConfig;

/// Per-message filtering decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Translate,
    Skip { reason: String },
}

/// Runtime overlay on top of the static language configuration.
///
/// The static config is immutable for the run; an operator (or an
/// embedding UI) flips toggles through this handle, and the poller
/// resolves both into one `EffectiveLanguages` snapshot per cycle.
#[derive(Clone, Default)]
pub struct LanguageToggles {
    inner: Arc<RwLock<ToggleState>>,
}

#[derive(Default)]
struct ToggleState {
    extra_targets: HashSet<String>,
    disabled_targets: HashSet<String>,
    extra_skips: HashSet<String>,
}

impl LanguageToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable_target(&self, language: &str) {
        let mut state = self.inner.write().expect("toggle lock poisoned");
        let language = language.to_lowercase();
        state.disabled_targets.remove(&language);
        state.extra_targets.insert(language);
    }

    pub fn disable_target(&self, language: &str) {
        let mut state = self.inner.write().expect("toggle lock poisoned");
        let language = language.to_lowercase();
        state.extra_targets.remove(&language);
        state.disabled_targets.insert(language);
    }

    pub fn add_skip(&self, language: &str) {
        let mut state = self.inner.write().expect("toggle lock poisoned");
        state.extra_skips.insert(language.to_lowercase());
    }

    pub fn remove_skip(&self, language: &str) {
        let mut state = self.inner.write().expect("toggle lock poisoned");
        state.extra_skips.remove(&language.to_lowercase());
    }

    /// Resolve the static config and the runtime toggles into one
    /// immutable snapshot.
    pub fn resolve(&self, config: &LanguageConfig) -> EffectiveLanguages {
        let state = self.inner.read().expect("toggle lock poisoned");

        let enabled: HashSet<String> = config.enabled_languages
            .iter()
            .map(|lang| lang.to_lowercase())
            .collect();

        let mut targets: Vec<String> = config.default_target_languages
            .iter()
            .map(|lang| lang.to_lowercase())
            .chain(state.extra_targets.iter().cloned())
            .filter(|lang| enabled.contains(lang) && !state.disabled_targets.contains(lang))
            .collect();
        targets.sort();
        targets.dedup();

        let skip: HashSet<String> = config.skip_languages
            .iter()
            .map(|lang| lang.to_lowercase())
            .chain(state.extra_skips.iter().cloned())
            .collect();

        EffectiveLanguages { targets, skip }
    }
}

/// One poll cycle's resolved language view.
#[derive(Debug, Clone)]
pub struct EffectiveLanguages {
    /// Languages each message is translated into, deduplicated
    pub targets: Vec<String>,
    /// Detected source languages that bypass translation
    pub skip: HashSet<String>,
}

impl EffectiveLanguages {
    /// Decide whether a message should be translated.
    ///
    /// `detected` is `None` when the active backend has no detection
    /// capability; filtering is bypassed in that case and every message
    /// is translated.
    pub fn should_translate(&self, detected: Option<&str>) -> FilterDecision {
        match detected {
            Some(language) => {
                let language = language.to_lowercase();
                if self.skip.contains(&language) {
                    FilterDecision::Skip {
                        reason: format!("detected language '{}' is configured to skip", language),
                    }
                } else {
                    FilterDecision::Translate
                }
            }
            None => FilterDecision::Translate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LanguageConfig {
        LanguageConfig {
            enabled_languages: vec!["ja".into(), "en".into(), "es".into(), "fr".into()],
            default_target_languages: vec!["es".into(), "fr".into()],
            skip_languages: vec!["ja".into()],
            lang_options: Default::default(),
        }
    }

    #[test]
    fn test_skip_language_is_case_insensitive() {
        let effective = LanguageToggles::new().resolve(&test_config());
        assert!(matches!(
            effective.should_translate(Some("JA")),
            FilterDecision::Skip { .. }
        ));
        assert_eq!(effective.should_translate(Some("en")), FilterDecision::Translate);
    }

    #[test]
    fn test_missing_detection_bypasses_skip_filtering() {
        let effective = LanguageToggles::new().resolve(&test_config());
        assert_eq!(effective.should_translate(None), FilterDecision::Translate);
    }

    #[test]
    fn test_targets_intersect_enabled_languages() {
        let toggles = LanguageToggles::new();
        toggles.enable_target("en");
        toggles.enable_target("ko"); // not in enabled_languages
        let effective = toggles.resolve(&test_config());
        assert_eq!(effective.targets, vec!["en", "es", "fr"]);
    }

    #[test]
    fn test_disabled_target_removes_default() {
        let toggles = LanguageToggles::new();
        toggles.disable_target("fr");
        let effective = toggles.resolve(&test_config());
        assert_eq!(effective.targets, vec!["es"]);

        toggles.enable_target("fr");
        let effective = toggles.resolve(&test_config());
        assert_eq!(effective.targets, vec!["es", "fr"]);
    }

    #[test]
    fn test_runtime_skip_unions_with_static_set() {
        let toggles = LanguageToggles::new();
        toggles.add_skip("EN");
        let effective = toggles.resolve(&test_config());
        assert!(matches!(
            effective.should_translate(Some("en")),
            FilterDecision::Skip { .. }
        ));

        toggles.remove_skip("en");
        let effective = toggles.resolve(&test_config());
        assert_eq!(effective.should_translate(Some("en")), FilterDecision::Translate);
    }
}
