//! LLM provider clients.
//!
//! Three hosted chat endpoints are supported: Gemini, Groq and DeepSeek.
//! Each client implements [`ChatProvider`], a single blocking
//! "complete this prompt" call that returns either the reply text or a
//! typed [`ProviderError`]. [`build_registry`] turns configured keys into the
//! ordered provider list the chat orchestrator falls back through.

pub mod gemini;
pub mod openai_compat;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;

pub use gemini::GeminiProvider;
pub use openai_compat::OpenAiCompatProvider;

/// Timeout for establishing a connection (10 seconds).
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a whole completion request (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Reply length cap sent to every provider.
pub const MAX_OUTPUT_TOKENS: u32 = 200;

/// Sampling temperature sent to every provider.
pub const TEMPERATURE: f64 = 1.0;

// ==================== Types ====================

/// Supported LLM provider kinds, in fallback priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Google Gemini API.
    Gemini,
    /// Groq OpenAI-compatible API.
    Groq,
    /// DeepSeek OpenAI-compatible API.
    DeepSeek,
}

impl ProviderKind {
    /// All kinds in registration order.
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Gemini, ProviderKind::Groq, ProviderKind::DeepSeek];
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "Gemini"),
            ProviderKind::Groq => write!(f, "Groq"),
            ProviderKind::DeepSeek => write!(f, "DeepSeek"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "groq" => Ok(ProviderKind::Groq),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            other => Err(format!(
                "Unknown provider: '{other}'. Expected one of: gemini, groq, deepseek"
            )),
        }
    }
}

/// A successful completion.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// The generated reply text.
    pub text: String,
}

/// Broad failure classes, used to pick fallback wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credentials rejected.
    Auth,
    /// Quota exhausted, rate limited, or out of balance.
    Quota,
    /// Network failure or timeout.
    Transport,
    /// Anything else, including malformed responses.
    Other,
}

impl FailureKind {
    /// Whether the failure is about the account rather than the request.
    pub fn is_account_limit(self) -> bool {
        matches!(self, FailureKind::Auth | FailureKind::Quota)
    }
}

/// Errors from a provider completion call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Network or connection error when calling the provider API.
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The request did not finish within the configured timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider API returned a non-success HTTP status code.
    #[error("HTTP error ({status}): {body}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Error message or raw response body.
        body: String,
    },

    /// Failed to parse the provider API response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ProviderError {
    /// Classifies the error for the fallback policy.
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::RequestFailed(_) | ProviderError::Timeout(_) => FailureKind::Transport,
            ProviderError::HttpError { status, body } => match status {
                401 | 403 => FailureKind::Auth,
                402 | 429 => FailureKind::Quota,
                _ if mentions_quota(body) => FailureKind::Quota,
                _ => FailureKind::Other,
            },
            ProviderError::ParseError(_) => FailureKind::Other,
        }
    }
}

fn mentions_quota(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("quota") || lower.contains("insufficient balance") || lower.contains("rate limit")
}

// ==================== Trait ====================

/// One hosted LLM completion endpoint.
pub trait ChatProvider: Send + Sync {
    /// Sends the prompt and returns the model's reply.
    fn complete(&self, prompt: &str) -> Result<Completion, ProviderError>;
}

/// A provider client registered under a name.
///
/// The name is what callers pin with `--model` and what gets recorded on
/// each turn.
pub struct RegisteredProvider {
    pub name: String,
    pub client: Box<dyn ChatProvider>,
}

impl RegisteredProvider {
    pub fn new(name: impl Into<String>, client: Box<dyn ChatProvider>) -> Self {
        Self {
            name: name.into(),
            client,
        }
    }
}

impl fmt::Debug for RegisteredProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredProvider")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ==================== Factory ====================

/// Connection settings for one provider.
#[derive(Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    /// Model override; the provider default is used when `None`.
    pub model: Option<String>,
    /// Base URL override, e.g. for a proxy.
    pub base_url: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Returns the default model for the given provider kind.
pub fn default_model(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "gemini-2.0-flash-exp",
        ProviderKind::Groq => "llama-3.3-70b-versatile",
        ProviderKind::DeepSeek => "deepseek-chat",
    }
}

/// Returns the default API base URL for the given provider kind.
pub fn default_base_url(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        ProviderKind::Groq => "https://api.groq.com/openai/v1",
        ProviderKind::DeepSeek => "https://api.deepseek.com",
    }
}

/// Builds the blocking HTTP client shared by a provider.
fn build_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::RequestFailed(format!("Failed to build HTTP client: {e}")))
}

/// Creates a provider client from its settings.
pub fn create_provider(
    settings: &ProviderSettings,
    timeout: Duration,
) -> Result<Box<dyn ChatProvider>, ProviderError> {
    let client = build_client(timeout)?;
    let model = settings
        .model
        .clone()
        .unwrap_or_else(|| default_model(settings.kind).to_string());
    let base_url = settings
        .base_url
        .clone()
        .unwrap_or_else(|| default_base_url(settings.kind).to_string());
    let api_key = settings.api_key.clone();

    Ok(match settings.kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(client, api_key, model, base_url)),
        ProviderKind::Groq | ProviderKind::DeepSeek => {
            Box::new(OpenAiCompatProvider::new(client, api_key, model, base_url))
        }
    })
}

/// Builds the ordered provider registry.
///
/// Settings keep their given order; entries with an empty key are skipped.
pub fn build_registry(
    settings: &[ProviderSettings],
    timeout: Duration,
) -> Result<Vec<RegisteredProvider>, ProviderError> {
    let mut registry = Vec::with_capacity(settings.len());
    for entry in settings {
        if entry.api_key.trim().is_empty() {
            continue;
        }
        let client = create_provider(entry, timeout)?;
        registry.push(RegisteredProvider::new(entry.kind.to_string(), client));
    }
    Ok(registry)
}

// ==================== Shared Helpers ====================

/// Sends a request and returns the JSON body of a successful response.
pub(crate) fn send_json(request: RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().map_err(map_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body_text = response
            .text()
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ProviderError::HttpError {
            status: status.as_u16(),
            body: extract_error_message(&body_text),
        });
    }

    response.json().map_err(|e| {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else {
            ProviderError::ParseError(e.to_string())
        }
    })
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::RequestFailed(e.to_string())
    }
}

/// Pulls `error.message` out of a provider error envelope.
///
/// Gemini, Groq and DeepSeek all nest the human-readable message there.
/// Falls back to the raw body when the envelope is not recognised.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
