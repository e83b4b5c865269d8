use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use tripbot_common::error::Error;
use tripbot_common::models::ChatTurn;
use tripbot_common::traits::CompletionService;

use crate::models::ProviderConfig;

/// Gemini `generateContent` provider
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }

    pub fn with_client(config: ProviderConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Builds the request payload: persona as `systemInstruction`, prior turns
/// and the new prompt as `contents`.
pub(crate) fn build_request(
    config: &ProviderConfig,
    persona: &str,
    prior_turns: &[ChatTurn],
    prompt: &str,
) -> Value {
    let mut contents: Vec<Value> = prior_turns
        .iter()
        .map(|turn| {
            json!({
                "role": turn.role.as_str(),
                "parts": [{ "text": turn.text }]
            })
        })
        .collect();

    contents.push(json!({
        "role": "user",
        "parts": [{ "text": prompt }]
    }));

    let mut payload = json!({
        "contents": contents,
        "generationConfig": {
            "temperature": config.temperature,
            "maxOutputTokens": config.max_output_tokens,
        }
    });

    if !persona.trim().is_empty() {
        payload["systemInstruction"] = json!({ "parts": [{ "text": persona }] });
    }

    payload
}

/// Pulls the text out of a `generateContent` response body.
pub(crate) fn extract_text(data: &Value) -> Result<String, Error> {
    if let Some(err) = data.get("error") {
        let message = err.get("message").and_then(|m| m.as_str()).unwrap_or("Unknown error");
        return Err(Error::Platform(format!("Gemini API error: {}", message)));
    }

    let candidates = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .ok_or_else(|| Error::Platform("Gemini response missing 'candidates' array".into()))?;

    let first = candidates
        .first()
        .ok_or_else(|| Error::Platform("Gemini returned no candidates".into()))?;

    let parts = first
        .pointer("/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| Error::Platform("Gemini candidate missing content parts".into()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(Error::Platform("Gemini candidate contained no text".into()));
    }
    Ok(text)
}

#[async_trait]
impl CompletionService for GeminiProvider {
    async fn complete(
        &self,
        persona: &str,
        prior_turns: &[ChatTurn],
        prompt: &str,
    ) -> Result<String, Error> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base(),
            self.config.model
        );
        let payload = build_request(&self.config, persona, prior_turns, prompt);

        info!("Calling Gemini model={} with {} prior turns", self.config.model, prior_turns.len());

        let response = self.client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        // Get the raw response text first for better error handling
        let response_text = response.text().await?;
        debug!("Raw Gemini response: {}", response_text);

        let data = match serde_json::from_str::<Value>(&response_text) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to parse Gemini response as JSON: {:?}", e);
                return Err(Error::Platform(format!("Gemini returned non-JSON response (HTTP {}): {}", status, e)));
            }
        };

        if !status.is_success() && data.get("error").is_none() {
            return Err(Error::Platform(format!("Gemini HTTP {}", status)));
        }

        extract_text(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_persona_history_and_prompt() {
        let config = ProviderConfig::new("k", "gemini-test");
        let history = vec![ChatTurn::user("hi"), ChatTurn::model("hello")];
        let body = build_request(&config, "be nice", &history, "where to go?");

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "where to go?");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be nice");
    }

    #[test]
    fn empty_persona_is_omitted() {
        let config = ProviderConfig::new("k", "m");
        let body = build_request(&config, "  ", &[], "x");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn text_parts_are_joined() {
        let data = json!({
            "candidates": [{ "content": { "parts": [{ "text": "1. Doi" }, { "text": " Suthep" }] } }]
        });
        assert_eq!(extract_text(&data).unwrap(), "1. Doi Suthep");
    }

    #[test]
    fn api_error_is_reported() {
        let data = json!({ "error": { "code": 400, "message": "API key not valid" } });
        let err = extract_text(&data).unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }
}
