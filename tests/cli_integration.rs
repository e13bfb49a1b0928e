//! Integration tests for the Dada library
//!
//! These tests drive retrieval, chat orchestration and the recommendation
//! logic through the public API, using temporary catalogs and conversation
//! files to keep tests isolated.

use dada_cli::catalog::{CatalogDatabase, CatalogSeed, CatalogStore, SeedItem, SeedOutfit};
use dada_cli::chat::{ChatOrchestrator, ProviderPreference, EXHAUSTED_MESSAGE};
use dada_cli::config::Config;
use dada_cli::provider::{ChatProvider, Completion, ProviderError, RegisteredProvider};
use dada_cli::recommend::{RecommendRequest, Recommender};
use dada_cli::retrieval::{query_by_tags, KeywordRetriever};
use dada_cli::session::{JsonFileStore, SessionCache, SessionStore, NO_PROVIDER};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile, TempDir};

// =============================================================================
// Test Helpers
// =============================================================================

/// Creates a seeded catalog in a temporary directory.
/// Returns the database and the temp directory (which must be kept alive).
fn create_test_catalog() -> (CatalogDatabase, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory");
    let db = CatalogDatabase::open(&dir.path().join("catalog.db")).expect("Failed to open catalog");
    db.import_seed(&sample_seed()).expect("Failed to seed catalog");
    (db, dir)
}

fn seed_item(id: i64, name: &str, category: &str, color: &str) -> SeedItem {
    SeedItem {
        id,
        name: name.to_string(),
        category: category.to_string(),
        color: color.to_string(),
        price: 490.0,
        owned: false,
    }
}

fn seed_outfit(id: i64, name: &str, occasion: &str, item_ids: Vec<i64>) -> SeedOutfit {
    SeedOutfit {
        id,
        name: name.to_string(),
        occasion: occasion.to_string(),
        description: format!("{name} for {occasion}"),
        item_ids,
    }
}

fn sample_seed() -> CatalogSeed {
    CatalogSeed {
        items: vec![
            seed_item(1, "White tee", "top", "white"),
            seed_item(2, "Slim jeans", "bottom", "blue"),
            seed_item(3, "Floral dress", "dress", "pink"),
            seed_item(4, "Running shorts", "bottom", "black"),
            seed_item(5, "Blazer", "outer", "navy"),
        ],
        outfits: vec![
            seed_outfit(1, "Easy weekend", "休閒", vec![1, 2]),
            seed_outfit(2, "Sweet date", "約會", vec![3]),
            seed_outfit(3, "Morning run", "運動", vec![1, 4]),
            seed_outfit(4, "Boardroom", "上班", vec![5, 2, 1]),
            seed_outfit(5, "Dinner date", "約會", vec![3, 5]),
            seed_outfit(6, "City walk", "旅遊", vec![1, 2]),
        ],
    }
}

/// Writes a seed document to a temp file.
fn create_seed_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let json = serde_json::to_string(&sample_seed()).expect("serialize seed");
    file.write_all(json.as_bytes()).expect("write seed");
    file
}

/// Provider that answers (or fails) and counts its calls.
struct CountingProvider {
    reply: Option<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl ChatProvider for CountingProvider {
    fn complete(&self, _prompt: &str) -> Result<Completion, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(Completion {
                text: text.to_string(),
            }),
            None => Err(ProviderError::HttpError {
                status: 429,
                body: "Resource has been exhausted".to_string(),
            }),
        }
    }
}

fn counting(name: &str, reply: Option<&'static str>) -> (RegisteredProvider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = RegisteredProvider::new(
        name,
        Box::new(CountingProvider {
            reply,
            calls: Arc::clone(&calls),
        }),
    );
    (provider, calls)
}

fn orchestrator(providers: Vec<RegisteredProvider>, conversations: &Path) -> ChatOrchestrator {
    ChatOrchestrator::new(
        providers,
        SessionCache::new(Box::new(JsonFileStore::new(conversations.to_path_buf()))),
    )
    .expect("Failed to build orchestrator")
}

// =============================================================================
// Catalog Tests
// =============================================================================

mod catalog_tests {
    use super::*;

    #[test]
    fn test_import_seed_file() {
        let dir = tempdir().expect("Failed to create temp directory");
        let db = CatalogDatabase::open(&dir.path().join("nested").join("catalog.db"))
            .expect("Failed to open catalog");
        let file = create_seed_file();

        let stats = db.import_seed_file(file.path()).expect("import");

        assert_eq!(stats.items, 5);
        assert_eq!(stats.outfits, 6);
        assert_eq!(db.item_count().unwrap(), 5);
        assert_eq!(db.outfit_count().unwrap(), 6);
    }

    #[test]
    fn test_reimport_replaces_rows() {
        let (db, _dir) = create_test_catalog();
        let file = create_seed_file();

        db.import_seed_file(file.path()).expect("second import");

        assert_eq!(db.outfit_count().unwrap(), 6);
        assert_eq!(db.items_for_outfit(4).unwrap().len(), 3);
    }

    #[test]
    fn test_filtered_query_falls_back_to_unfiltered() {
        let (db, _dir) = create_test_catalog();

        let unfiltered = query_by_tags(&db, &[]).unwrap();
        let unmatched = query_by_tags(&db, &["派對".to_string()]).unwrap();

        assert_eq!(unfiltered.outfits.len(), 5);
        assert_eq!(unmatched.outfits, unfiltered.outfits);
        assert!(unmatched.filter_dropped);
        assert!(!unfiltered.filter_dropped);
    }

    #[test]
    fn test_filtered_query_resolves_items() {
        let (db, _dir) = create_test_catalog();

        let query = query_by_tags(&db, &["約會".to_string()]).unwrap();

        let names: Vec<&str> = query.outfits.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Sweet date", "Dinner date"]);
        assert_eq!(query.outfits[1].items.len(), 2);
    }
}

// =============================================================================
// Chat Orchestration Tests
// =============================================================================

mod chat_tests {
    use super::*;

    #[test]
    fn test_fallback_order_and_single_attempts() {
        let dir = tempdir().unwrap();
        let (a, a_calls) = counting("Gemini", None);
        let (b, b_calls) = counting("Groq", None);
        let (c, c_calls) = counting("DeepSeek", Some("Try the blazer."));
        let agent = orchestrator(vec![a, b, c], &dir.path().join("conversations.json"));

        let reply = agent
            .chat("s1", "office?", &[], &ProviderPreference::Auto)
            .unwrap();

        assert_eq!(reply.provider.as_deref(), Some("DeepSeek"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exhausted_turn_is_persisted_with_sentinel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        let (a, _) = counting("Gemini", None);
        let agent = orchestrator(vec![a], &path);

        let reply = agent
            .chat("s1", "hello", &[], &ProviderPreference::Auto)
            .unwrap();
        assert_eq!(reply.text, EXHAUSTED_MESSAGE);

        let document = JsonFileStore::new(path).load().unwrap();
        assert_eq!(document["s1"].messages[0].model, NO_PROVIDER);
        assert_eq!(document["s1"].history[0].ai, EXHAUSTED_MESSAGE);
    }

    #[test]
    fn test_pinned_provider_case_insensitive() {
        let dir = tempdir().unwrap();
        let (a, a_calls) = counting("Gemini", Some("from gemini"));
        let (b, b_calls) = counting("Groq", Some("from groq"));
        let agent = orchestrator(vec![a, b], &dir.path().join("conversations.json"));

        let reply = agent
            .chat("s1", "hi", &[], &ProviderPreference::from("GROQ"))
            .unwrap();

        assert_eq!(reply.text, "from groq");
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_document_layout_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conversations.json");
        let (a, _) = counting("Gemini", Some("嗨嗨！"));
        let agent = orchestrator(vec![a], &path);

        agent
            .chat("web-page-session", "你好", &[], &ProviderPreference::Auto)
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let session = &json["web-page-session"];
        assert_eq!(session["history"][0]["user"], "你好");
        assert_eq!(session["messages"][0]["ai"], "嗨嗨！");
        assert_eq!(session["messages"][0]["model"], "Gemini");
        assert!(session["created_at"].is_string());
        assert!(raw.contains("你好"), "Document should keep UTF-8 unescaped");
    }
}

// =============================================================================
// Recommendation Tests
// =============================================================================

mod recommend_tests {
    use super::*;

    #[test]
    fn test_from_config_without_keys_is_catalog_only() {
        let (_db, dir) = create_test_catalog();
        let config = Config {
            database_path: Some(dir.path().join("catalog.db")),
            conversations_path: Some(dir.path().join("conversations.json")),
            ..Default::default()
        };

        let recommender = Recommender::from_config(&config).expect("recommender");
        let result = recommender
            .recommend(&RecommendRequest::new("想找運動穿搭"))
            .unwrap();

        assert!(!recommender.ai_enabled());
        assert!(recommender.status().providers.is_empty());
        assert_eq!(result.keywords, vec!["運動".to_string()]);
        assert!(result.response.contains("Pick 1: Morning run (occasion: 運動)"));
        assert!(!dir.path().join("conversations.json").exists());
    }

    #[test]
    fn test_from_config_registers_providers_in_order() {
        let (_db, dir) = create_test_catalog();
        let config = Config {
            deepseek_api_key: Some("d-key".to_string()),
            gemini_api_key: Some("g-key".to_string()),
            database_path: Some(dir.path().join("catalog.db")),
            conversations_path: Some(dir.path().join("conversations.json")),
            ..Default::default()
        };

        let recommender = Recommender::from_config(&config).expect("recommender");

        assert!(recommender.ai_enabled());
        assert_eq!(recommender.status().providers, vec!["Gemini", "DeepSeek"]);
    }

    #[test]
    fn test_recommend_with_agent_keeps_history() {
        let (db, dir) = create_test_catalog();
        let (a, calls) = counting("Gemini", Some("Floral dress all the way!"));
        let agent = orchestrator(vec![a], &dir.path().join("conversations.json"));
        let recommender = Recommender::new(KeywordRetriever::new(db), Some(agent));

        let request = RecommendRequest::new("週末約會穿什麼？").with_session("s1");
        let first = recommender.recommend(&request).unwrap();
        recommender.recommend(&request).unwrap();

        assert_eq!(first.keywords, vec!["休閒".to_string(), "約會".to_string()]);
        assert_eq!(first.outfits.len(), 3);
        assert_eq!(first.provider.as_deref(), Some("Gemini"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let history = recommender.history("s1").unwrap().expect("history");
        assert_eq!(history.len(), 2);
        assert!(history[0].user.starts_with("週末約會穿什麼？"));
        assert!(history[0].user.contains("Detected keywords: 休閒, 約會"));
    }

    #[test]
    fn test_sessions_listing() {
        let (db, dir) = create_test_catalog();
        let (a, _) = counting("Gemini", Some("ok"));
        let agent = orchestrator(vec![a], &dir.path().join("conversations.json"));
        let recommender = Recommender::new(KeywordRetriever::new(db), Some(agent));

        for session in ["b", "a", "b"] {
            recommender
                .recommend(&RecommendRequest::new("hi").with_session(session))
                .unwrap();
        }

        let sessions = recommender.sessions().unwrap();
        let summary: Vec<(&str, usize)> =
            sessions.iter().map(|s| (s.id.as_str(), s.turns)).collect();
        assert_eq!(summary, vec![("a", 1), ("b", 2)]);
    }
}
