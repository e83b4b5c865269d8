// File: tripbot-core/src/platforms/google/translate.rs

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Deserialize;
use serde_json::json;

use tripbot_common::traits::TranslationService;
use crate::Error;
use crate::platforms::read_json;

pub const TRANSLATE_API_BASE: &str = "https://translation.googleapis.com/language/translate/v2";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct DetectData {
    /// One list of candidate detections per input string.
    detections: Vec<Vec<Detection>>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

/// Google Cloud Translation (basic, v2) client.
pub struct GoogleTranslateClient {
    http: ReqwestClient,
    api_key: String,
    api_base: String,
}

impl GoogleTranslateClient {
    pub fn new(http: ReqwestClient, api_key: &str) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            api_base: TRANSLATE_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl TranslationService for GoogleTranslateClient {
    async fn detect(&self, text: &str) -> Result<String, Error> {
        let response = self
            .http
            .post(format!("{}/detect", self.api_base))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "q": text }))
            .send()
            .await
            .map_err(|e| Error::Platform(format!("translate detect network error: {}", e)))?;

        let body: Envelope<DetectData> = read_json(response, "translate detect").await?;
        body.data
            .detections
            .into_iter()
            .next()
            .and_then(|d| d.into_iter().next())
            .map(|d| d.language)
            .ok_or_else(|| Error::Platform("translate detect returned no detections".into()))
    }

    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, Error> {
        let response = self
            .http
            .post(&self.api_base)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "q": text, "target": target_lang, "format": "text" }))
            .send()
            .await
            .map_err(|e| Error::Platform(format!("translate network error: {}", e)))?;

        let body: Envelope<TranslateData> = read_json(response, "translate").await?;
        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| Error::Platform("translate returned no translations".into()))
    }
}
