//! Google Gemini `generateContent` client.

use reqwest::blocking::Client;
use serde_json::Value;

use super::{send_json, ChatProvider, Completion, ProviderError, MAX_OUTPUT_TOKENS, TEMPERATURE};

/// Google Gemini API provider.
pub struct GeminiProvider {
    /// HTTP client instance.
    client: Client,
    /// Gemini API key.
    api_key: String,
    /// Model identifier (e.g., "gemini-2.0-flash-exp").
    model: String,
    /// API base, without a trailing slash.
    base_url: String,
}

impl GeminiProvider {
    /// Creates a new Gemini provider.
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Builds the JSON request body for the generateContent API.
    fn build_request_body(&self, prompt: &str) -> Value {
        serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            }
        })
    }
}

impl ChatProvider for GeminiProvider {
    fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let body = self.build_request_body(prompt);

        let json = send_json(
            self.client
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .header("content-type", "application/json")
                .json(&body),
        )?;

        parse_gemini_response(&json)
    }
}

/// Concatenates the text parts of the first candidate.
fn parse_gemini_response(json: &Value) -> Result<Completion, ProviderError> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            ProviderError::ParseError(
                "Missing candidates[0].content.parts in Gemini response".to_string(),
            )
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(ProviderError::ParseError(
            "Gemini response contained no text parts".to_string(),
        ));
    }

    Ok(Completion { text })
}
