//! OpenAI-compatible chat completions client, used for Groq and DeepSeek.
//!
//! Both services accept the OpenAI Chat Completions request format and only
//! differ in base URL and model names.

use reqwest::blocking::Client;
use serde_json::Value;

use super::{send_json, ChatProvider, Completion, ProviderError, MAX_OUTPUT_TOKENS, TEMPERATURE};

/// Chat Completions provider for OpenAI-compatible hosts.
pub struct OpenAiCompatProvider {
    /// HTTP client instance.
    client: Client,
    /// Bearer token.
    api_key: String,
    /// Model identifier (e.g., "llama-3.3-70b-versatile").
    model: String,
    /// API base, without a trailing slash.
    base_url: String,
}

impl OpenAiCompatProvider {
    /// Creates a new provider for the host at `base_url`.
    pub fn new(client: Client, api_key: String, model: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Builds the JSON request body for the Chat Completions API.
    fn build_request_body(&self, prompt: &str) -> Value {
        serde_json::json!({
            "model": self.model,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                }
            ]
        })
    }
}

impl ChatProvider for OpenAiCompatProvider {
    fn complete(&self, prompt: &str) -> Result<Completion, ProviderError> {
        let body = self.build_request_body(prompt);

        let json = send_json(
            self.client
                .post(self.endpoint())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("content-type", "application/json")
                .json(&body),
        )?;

        parse_chat_completion(&json)
    }
}

/// Extracts `choices[0].message.content` from a Chat Completions response.
fn parse_chat_completion(json: &Value) -> Result<Completion, ProviderError> {
    let content = json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| {
            ProviderError::ParseError("Missing choices[0].message.content in response".to_string())
        })?;

    Ok(Completion {
        text: content.to_string(),
    })
}
