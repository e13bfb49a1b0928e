//! Recommendation endpoint logic.
//!
//! [`Recommender`] is what an outer surface (the CLI here, an HTTP handler
//! elsewhere) talks to. It runs retrieval, hands the message and retrieved
//! outfits to the chat orchestrator, and falls back to a plain catalog
//! listing whenever no model can answer.

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogDatabase, Outfit};
use crate::chat::{ChatError, ChatOrchestrator, ProviderPreference, ReplyStatus};
use crate::config::Config;
use crate::provider::build_registry;
use crate::retrieval::{KeywordRetriever, Retrieval, Retriever};
use crate::session::{HistoryEntry, JsonFileStore, SessionCache, SessionSummary};

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Outfits listed in a catalog-only reply.
const LISTING_OUTFITS: usize = 3;

// ==================== Types ====================

/// A recommendation request as an outer surface receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub message: String,

    #[serde(default = "default_session_id")]
    pub session_id: String,

    /// `auto` or a provider name
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_session_id() -> String {
    DEFAULT_SESSION_ID.to_string()
}

fn default_model() -> String {
    "auto".to_string()
}

impl RecommendRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: default_session_id(),
            model: default_model(),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// The answer to a [`RecommendRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Text to show the user
    pub response: String,
    pub session_id: String,
    /// Outfits retrieved for the message
    pub outfits: Vec<Outfit>,
    /// Occasion tags found in the message
    pub keywords: Vec<String>,
    /// Provider that answered, if any
    pub provider: Option<String>,
    /// Keywords matched no outfit and the unfiltered listing was used
    pub filter_dropped: bool,
}

/// Result of clearing a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearOutcome {
    pub success: bool,
    pub message: String,
}

/// Health summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub ai_enabled: bool,
    /// Registered providers in fallback order
    pub providers: Vec<String>,
}

/// Errors returned for malformed requests or an unusable setup.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Please enter a message")]
    EmptyMessage,

    #[error("Please provide a session id")]
    MissingSessionId,

    #[error("AI is not enabled")]
    AiDisabled,

    #[error("Catalog query failed: {0:#}")]
    Catalog(anyhow::Error),

    #[error("Session store error: {0:#}")]
    Session(anyhow::Error),
}

// ==================== Recommender ====================

/// Composes retrieval and chat into recommendations.
pub struct Recommender<R> {
    retriever: R,
    agent: Option<ChatOrchestrator>,
}

impl Recommender<KeywordRetriever<CatalogDatabase>> {
    /// Opens the catalog and conversation store named by `config` and
    /// registers every provider that has a key.
    ///
    /// With no keys at all the recommender still works in catalog-only mode.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let database_path = config.database_path()?;
        let catalog = CatalogDatabase::open(&database_path)?;

        let providers = build_registry(&config.provider_settings(), config.request_timeout())
            .context("Failed to set up AI providers")?;
        let sessions = SessionCache::new(Box::new(JsonFileStore::new(
            config.conversations_path()?,
        )));

        let agent = match ChatOrchestrator::new(providers, sessions) {
            Ok(agent) => Some(agent),
            Err(ChatError::NoProviders) => {
                tracing::info!("No provider keys configured, using catalog-only replies");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self::new(KeywordRetriever::new(catalog), agent))
    }
}

impl<R: Retriever> Recommender<R> {
    pub fn new(retriever: R, agent: Option<ChatOrchestrator>) -> Self {
        Self { retriever, agent }
    }

    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    pub fn ai_enabled(&self) -> bool {
        self.agent.is_some()
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            ai_enabled: self.ai_enabled(),
            providers: self
                .agent
                .as_ref()
                .map(ChatOrchestrator::provider_names)
                .unwrap_or_default(),
        }
    }

    /// Answers one message.
    pub fn recommend(&self, request: &RecommendRequest) -> Result<Recommendation, RecommendError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(RecommendError::EmptyMessage);
        }

        let retrieval = self
            .retriever
            .retrieve(message)
            .map_err(RecommendError::Catalog)?;

        let Some(agent) = &self.agent else {
            let response = format!(
                "AI is not enabled yet, here are picks from the catalog:\n{}",
                outfit_listing(&retrieval.outfits)
            );
            return Ok(build(request, retrieval, response, None));
        };

        let user_text = if retrieval.keywords.is_empty() {
            message.to_string()
        } else {
            format!(
                "{message}\n\nDetected keywords: {}; retrieved {} outfits.",
                retrieval.keywords.join(", "),
                retrieval.outfits.len()
            )
        };

        let preference = ProviderPreference::from(request.model.as_str());
        match agent.chat(&request.session_id, &user_text, &retrieval.outfits, &preference) {
            Ok(reply) => {
                let response = if reply.status == ReplyStatus::Exhausted {
                    format!("{}\n{}", reply.text, outfit_listing(&retrieval.outfits))
                } else {
                    reply.text
                };
                Ok(build(request, retrieval, response, reply.provider))
            }
            Err(e @ ChatError::ProviderNotConfigured { .. }) => {
                Ok(build(request, retrieval, e.to_string(), None))
            }
            Err(ChatError::NoProviders) => Err(RecommendError::AiDisabled),
        }
    }

    /// Forgets a session's conversation.
    pub fn clear_session(&self, session_id: Option<&str>) -> Result<ClearOutcome, RecommendError> {
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(RecommendError::MissingSessionId)?;
        let agent = self.agent.as_ref().ok_or(RecommendError::AiDisabled)?;

        let success = agent
            .clear_session(session_id)
            .map_err(RecommendError::Session)?;
        let message = if success {
            "Conversation memory cleared"
        } else {
            "Session not found"
        };

        Ok(ClearOutcome {
            success,
            message: message.to_string(),
        })
    }

    /// The user/ai history of a session, `None` if it does not exist.
    pub fn history(&self, session_id: &str) -> Result<Option<Vec<HistoryEntry>>, RecommendError> {
        let agent = self.agent.as_ref().ok_or(RecommendError::AiDisabled)?;
        agent.history(session_id).map_err(RecommendError::Session)
    }

    pub fn sessions(&self) -> Result<Vec<SessionSummary>, RecommendError> {
        let agent = self.agent.as_ref().ok_or(RecommendError::AiDisabled)?;
        agent.list_sessions().map_err(RecommendError::Session)
    }
}

fn build(
    request: &RecommendRequest,
    retrieval: Retrieval,
    response: String,
    provider: Option<String>,
) -> Recommendation {
    Recommendation {
        response,
        session_id: request.session_id.clone(),
        outfits: retrieval.outfits,
        keywords: retrieval.keywords,
        provider,
        filter_dropped: retrieval.filter_dropped,
    }
}

/// Plain-text listing of the first few outfits.
fn outfit_listing(outfits: &[Outfit]) -> String {
    let mut text = String::new();
    for (idx, outfit) in outfits.iter().take(LISTING_OUTFITS).enumerate() {
        text.push_str(&format!(
            "\nPick {}: {} (occasion: {})\nNotes: {}\n",
            idx + 1,
            outfit.name,
            outfit.occasion,
            outfit.description
        ));
    }
    text
}
