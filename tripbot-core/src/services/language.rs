// File: src/services/language.rs

use std::sync::Arc;
use tracing::debug;

use tripbot_common::models::{base_lang, Localized, DEFAULT_LANG};
use tripbot_common::traits::{Diagnostics, TranslationService};

/// Returned when there is no text to work with.
pub const UNREADABLE_INPUT: &str = "ขออภัย ไม่สามารถอ่านข้อความได้";

/// Detects the language users write in and translates replies back into it.
pub struct LanguageNormalizer {
    translator: Arc<dyn TranslationService>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl LanguageNormalizer {
    pub fn new(translator: Arc<dyn TranslationService>, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self { translator, diagnostics }
    }

    /// Bare language code of `text`; [`DEFAULT_LANG`] when detection fails.
    pub async fn detect(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return DEFAULT_LANG.to_string();
        }
        match self.translator.detect(text).await {
            Ok(code) if !code.trim().is_empty() && code != "und" => base_lang(&code),
            Ok(code) => {
                self.diagnostics.degraded("detect_language", &format!("unusable code '{}'", code));
                DEFAULT_LANG.to_string()
            }
            Err(e) => {
                self.diagnostics.remote_failure("detect_language", &e);
                DEFAULT_LANG.to_string()
            }
        }
    }

    /// Detects the language of `text` and, when `target` names a different
    /// one, translates into it. A failed translation keeps the original text
    /// tagged with its source language.
    pub async fn normalize(&self, text: Option<&str>, target: Option<&str>) -> Localized {
        let Some(text) = text else {
            return Localized::new(UNREADABLE_INPUT, DEFAULT_LANG);
        };

        let source = self.detect(text).await;
        let target = match target.map(base_lang) {
            Some(t) if t != source => t,
            _ => return Localized::new(text, source),
        };

        match self.translator.translate(text, &target).await {
            Ok(translated) => {
                debug!("translated {} => {}", source, target);
                Localized::new(translated, target)
            }
            Err(e) => {
                self.diagnostics.remote_failure("translate", &e);
                Localized::new(text, source)
            }
        }
    }

    /// Puts one of the bot's own (Thai) strings into `lang`. Thai users cost
    /// no remote calls.
    pub async fn localize(&self, text: &str, lang: &str) -> String {
        if base_lang(lang) == DEFAULT_LANG {
            return text.to_string();
        }
        self.normalize(Some(text), Some(lang)).await.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::diagnostics::RecordingDiagnostics;
    use crate::test_utils::FakeTranslation;

    fn normalizer(translator: Arc<FakeTranslation>) -> (LanguageNormalizer, Arc<RecordingDiagnostics>) {
        let diagnostics = Arc::new(RecordingDiagnostics::new());
        (LanguageNormalizer::new(translator, diagnostics.clone()), diagnostics)
    }

    #[tokio::test]
    async fn same_language_is_returned_untouched() {
        let translator = Arc::new(FakeTranslation::default());
        let (n, _) = normalizer(translator.clone());

        let out = n.normalize(Some("ไปดอยสุเทพ"), Some("th-TH")).await;

        assert_eq!(out, Localized::new("ไปดอยสุเทพ", "th"));
        assert_eq!(translator.translate_count(), 0);
    }

    #[tokio::test]
    async fn missing_text_is_unreadable() {
        let (n, _) = normalizer(Arc::new(FakeTranslation::default()));
        let out = n.normalize(None, Some("en")).await;
        assert_eq!(out, Localized::new(UNREADABLE_INPUT, "th"));
    }

    #[tokio::test]
    async fn failed_translation_keeps_original() {
        let translator = Arc::new(FakeTranslation::detecting("en").with_failing_translate());
        let (n, diagnostics) = normalizer(translator);

        let out = n.normalize(Some("where to stay"), Some("ja")).await;

        assert_eq!(out, Localized::new("where to stay", "en"));
        assert_eq!(diagnostics.failures_for("translate"), 1);
    }

    #[tokio::test]
    async fn thai_strings_cost_nothing_for_thai_users() {
        let translator = Arc::new(FakeTranslation::default());
        let (n, _) = normalizer(translator.clone());

        assert_eq!(n.localize("สวัสดี", "th").await, "สวัสดี");
        assert_eq!(n.localize("สวัสดี", "en").await, "[en] สวัสดี");
        assert_eq!(translator.detect_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
