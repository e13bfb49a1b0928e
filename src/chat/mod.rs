//! Multi-provider chat orchestration.
//!
//! [`ChatOrchestrator`] owns the ordered provider registry and the session
//! cache. Each call assembles a prompt from the session's recent turns and
//! the retrieved catalog outfits, then either walks every provider in
//! registration order until one answers (auto mode) or calls exactly one
//! named provider with no fallback (pinned mode).

pub mod prompt;

use std::fmt;

use anyhow::Result;

use crate::catalog::Outfit;
use crate::provider::{FailureKind, RegisteredProvider};
use crate::session::{HistoryEntry, SessionCache, SessionSummary, Turn};

/// Reply used when every provider in auto mode failed.
pub const EXHAUSTED_MESSAGE: &str =
    "Sorry, no AI service is currently available. Please try again later.";

// ==================== Types ====================

/// Which providers a chat call may use.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderPreference {
    /// Try every registered provider in order.
    #[default]
    Auto,
    /// Use only the provider with this name (matched case-insensitively).
    Pinned(String),
}

impl From<&str> for ProviderPreference {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("auto") {
            ProviderPreference::Auto
        } else {
            ProviderPreference::Pinned(value.to_string())
        }
    }
}

impl fmt::Display for ProviderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderPreference::Auto => write!(f, "auto"),
            ProviderPreference::Pinned(name) => write!(f, "{name}"),
        }
    }
}

/// How a chat call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// A provider answered.
    Answered,
    /// Auto mode ran out of providers; the reply is [`EXHAUSTED_MESSAGE`].
    Exhausted,
    /// The pinned provider failed; the reply explains why.
    PinnedFailed(FailureKind),
}

/// The outcome of one chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// Text to show the user: the model's answer or a fallback message.
    pub text: String,
    /// Name of the provider that answered, `None` if none did.
    pub provider: Option<String>,
    pub status: ReplyStatus,
}

/// Errors surfaced to the caller instead of a reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No provider is registered, so chat cannot run at all.
    #[error("No AI provider is configured")]
    NoProviders,

    /// The pinned provider is not in the registry.
    #[error("Model {name} is not configured or unavailable")]
    ProviderNotConfigured { name: String },
}

// ==================== Orchestrator ====================

/// Drives provider selection and session persistence for chat turns.
pub struct ChatOrchestrator {
    providers: Vec<RegisteredProvider>,
    sessions: SessionCache,
}

impl ChatOrchestrator {
    /// Creates an orchestrator over a non-empty provider list.
    pub fn new(providers: Vec<RegisteredProvider>, sessions: SessionCache) -> Result<Self, ChatError> {
        if providers.is_empty() {
            return Err(ChatError::NoProviders);
        }
        tracing::info!(
            "Chat providers: {}",
            providers
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );
        Ok(Self {
            providers,
            sessions,
        })
    }

    /// Registered provider names in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name.clone()).collect()
    }

    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Runs one chat turn.
    ///
    /// Provider failures never surface as errors: auto mode falls through to
    /// [`EXHAUSTED_MESSAGE`] and still records the turn, pinned mode returns
    /// an explanatory reply without recording anything. Only an unknown
    /// pinned provider is an error.
    pub fn chat(
        &self,
        session_id: &str,
        user_text: &str,
        outfits: &[Outfit],
        preference: &ProviderPreference,
    ) -> Result<ChatReply, ChatError> {
        let pinned = match preference {
            ProviderPreference::Auto => None,
            ProviderPreference::Pinned(name) => Some(
                self.providers
                    .iter()
                    .find(|p| p.name.eq_ignore_ascii_case(name))
                    .ok_or_else(|| ChatError::ProviderNotConfigured { name: name.clone() })?,
            ),
        };

        let session = self.sessions.snapshot(session_id);
        let prompt = prompt::build_prompt(
            session.recent_turns(prompt::HISTORY_TURNS),
            outfits,
            user_text,
        );
        tracing::debug!(
            "Session {}: prompt of {} chars, {} prior turns",
            session_id,
            prompt.chars().count(),
            session.turn_count()
        );

        let reply = match pinned {
            None => self.run_auto(&prompt),
            Some(provider) => {
                let reply = Self::run_pinned(provider, &prompt);
                if reply.status != ReplyStatus::Answered {
                    return Ok(reply);
                }
                reply
            }
        };

        let turn = Turn::new(user_text, reply.text.clone(), reply.provider.as_deref());
        let count = self.sessions.append_turn(session_id, turn);
        tracing::debug!("Session {} now has {} turns", session_id, count);

        Ok(reply)
    }

    fn run_auto(&self, prompt: &str) -> ChatReply {
        for provider in &self.providers {
            tracing::debug!("Trying {}", provider.name);
            match provider.client.complete(prompt) {
                Ok(completion) => {
                    tracing::info!("{} answered", provider.name);
                    return ChatReply {
                        text: completion.text,
                        provider: Some(provider.name.clone()),
                        status: ReplyStatus::Answered,
                    };
                }
                Err(e) => tracing::warn!("{} failed: {}", provider.name, e),
            }
        }

        tracing::warn!("All providers failed");
        ChatReply {
            text: EXHAUSTED_MESSAGE.to_string(),
            provider: None,
            status: ReplyStatus::Exhausted,
        }
    }

    fn run_pinned(provider: &RegisteredProvider, prompt: &str) -> ChatReply {
        match provider.client.complete(prompt) {
            Ok(completion) => ChatReply {
                text: completion.text,
                provider: Some(provider.name.clone()),
                status: ReplyStatus::Answered,
            },
            Err(e) => {
                tracing::warn!("{} failed: {}", provider.name, e);
                let kind = e.kind();
                let text = if kind.is_account_limit() {
                    format!(
                        "{} has run out of quota or hit its usage limit. \
                         Switch to auto mode or pick another model.",
                        provider.name
                    )
                } else {
                    format!(
                        "{} failed to respond: {}\n\nTry switching to auto mode or pick another model.",
                        provider.name, e
                    )
                };
                ChatReply {
                    text,
                    provider: None,
                    status: ReplyStatus::PinnedFailed(kind),
                }
            }
        }
    }

    /// Removes a session. Returns `false` when it did not exist.
    pub fn clear_session(&self, session_id: &str) -> Result<bool> {
        self.sessions.clear(session_id)
    }

    /// The stored user/ai pairs of a session, if it exists.
    pub fn history(&self, session_id: &str) -> Result<Option<Vec<HistoryEntry>>> {
        self.sessions.history(session_id)
    }

    pub fn list_sessions(&self) -> Result<Vec<SessionSummary>> {
        self.sessions.list()
    }
}
