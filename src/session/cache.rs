//! In-process session cache in front of a [`SessionStore`].
//!
//! One mutex guards both the cached sessions and every read/write of the
//! persisted document, so two chats on the same session cannot both append
//! to stale copies and overwrite each other. Sessions on different ids also
//! serialize here; the document is a single blob.
//!
//! A session first touched while the store is unreadable is cached as
//! detached: it holds only the turns added since. The next successful read
//! puts those turns after the persisted ones, so saved history is never
//! replaced by a partial copy.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::models::{HistoryEntry, SessionMap, SessionRecord, SessionSummary, Turn};
use super::store::SessionStore;

type Cache = HashMap<String, CachedSession>;

struct CachedSession {
    record: SessionRecord,
    /// Created without seeing the persisted document.
    detached: bool,
}

impl CachedSession {
    fn loaded(record: SessionRecord) -> Self {
        Self {
            record,
            detached: false,
        }
    }

    fn detached() -> Self {
        Self {
            record: SessionRecord::new(),
            detached: true,
        }
    }

    /// Rebases a detached session onto what the store holds for it.
    fn attach(&mut self, persisted: Option<SessionRecord>) {
        if !self.detached {
            return;
        }
        if let Some(mut persisted) = persisted {
            for turn in std::mem::take(&mut self.record.messages) {
                persisted.push_turn(turn);
            }
            self.record = persisted;
        }
        self.detached = false;
    }
}

pub struct SessionCache {
    store: Box<dyn SessionStore>,
    sessions: Mutex<Cache>,
}

impl SessionCache {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self {
            store,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the session, loading or creating it first.
    pub fn snapshot(&self, session_id: &str) -> SessionRecord {
        let mut cache = self.lock();
        self.resolve(&mut cache, session_id).record.clone()
    }

    /// Appends a turn and persists the session. Returns the new turn count.
    ///
    /// Persistence failures are logged, not returned: the turn still lands
    /// in the in-memory session.
    pub fn append_turn(&self, session_id: &str, turn: Turn) -> usize {
        let mut cache = self.lock();
        let entry = self.resolve(&mut cache, session_id);
        entry.record.push_turn(turn);

        match self.store.load() {
            Ok(mut document) => {
                entry.attach(document.remove(session_id));
                document.insert(session_id.to_string(), entry.record.clone());
                if let Err(e) = self.store.save(&document) {
                    tracing::warn!("Failed to save conversations: {:#}", e);
                }
            }
            // Writing now would clobber whatever else the unreadable document holds
            Err(e) => tracing::warn!(
                "Conversation store unreadable, keeping session {} in memory only: {:#}",
                session_id,
                e
            ),
        }

        entry.record.turn_count()
    }

    /// Removes a session from memory and from the persisted document.
    ///
    /// Returns `false` when the session existed in neither.
    pub fn clear(&self, session_id: &str) -> Result<bool> {
        let mut cache = self.lock();
        let in_memory = cache.remove(session_id).is_some();

        let mut document = self.store.load()?;
        let on_disk = document.remove(session_id).is_some();
        if on_disk {
            self.store.save(&document)?;
        }

        tracing::info!(
            "Cleared session {} (memory: {}, store: {})",
            session_id,
            in_memory,
            on_disk
        );
        Ok(in_memory || on_disk)
    }

    /// The user/ai history of a session, without creating it.
    pub fn history(&self, session_id: &str) -> Result<Option<Vec<HistoryEntry>>> {
        let mut cache = self.lock();
        if let Some(entry) = cache.get(session_id) {
            if !entry.detached {
                return Ok(Some(entry.record.history.clone()));
            }
        }

        let mut document = self.store.load()?;
        Self::attach_all(&mut cache, &document);
        Ok(match cache.get(session_id) {
            Some(entry) => Some(entry.record.history.clone()),
            None => document.remove(session_id).map(|r| r.history),
        })
    }

    /// Every known session, persisted or cached, sorted by id.
    pub fn list(&self) -> Result<Vec<SessionSummary>> {
        let mut cache = self.lock();
        let mut document = self.store.load()?;
        Self::attach_all(&mut cache, &document);
        for (id, entry) in cache.iter() {
            document.insert(id.clone(), entry.record.clone());
        }
        Ok(document
            .iter()
            .map(|(id, record)| SessionSummary::from_record(id, record))
            .collect())
    }

    /// Drops every cached session; the next access reloads from the store.
    #[cfg(test)]
    pub fn evict_all(&self) {
        self.lock().clear();
    }

    fn attach_all(cache: &mut Cache, document: &SessionMap) {
        for (id, entry) in cache.iter_mut().filter(|(_, e)| e.detached) {
            entry.attach(document.get(id).cloned());
        }
    }

    fn resolve<'a>(&self, cache: &'a mut Cache, session_id: &str) -> &'a mut CachedSession {
        let needs_load = cache.get(session_id).map_or(true, |e| e.detached);
        if needs_load {
            match self.store.load() {
                Ok(mut document) => {
                    let persisted = document.remove(session_id);
                    if let Some(entry) = cache.get_mut(session_id) {
                        entry.attach(persisted);
                    } else {
                        let record = match persisted {
                            Some(record) => {
                                tracing::debug!(
                                    "Loaded session {} ({} turns)",
                                    session_id,
                                    record.turn_count()
                                );
                                record
                            }
                            None => {
                                tracing::debug!("Created session {}", session_id);
                                SessionRecord::new()
                            }
                        };
                        cache.insert(session_id.to_string(), CachedSession::loaded(record));
                    }
                }
                Err(e) => tracing::warn!("Failed to load conversations: {:#}", e),
            }
        }

        cache
            .entry(session_id.to_string())
            .or_insert_with(CachedSession::detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::JsonFileStore;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn create_test_cache() -> (SessionCache, JsonFileStore, tempfile::TempDir) {
        let dir = tempdir().expect("Failed to create temp directory");
        let store = JsonFileStore::new(dir.path().join("conversations.json"));
        let cache = SessionCache::new(Box::new(store.clone()));
        (cache, store, dir)
    }

    /// Store whose reads and writes can be switched to fail.
    struct FlakyStore {
        inner: JsonFileStore,
        failing: Arc<AtomicBool>,
    }

    impl SessionStore for FlakyStore {
        fn load(&self) -> Result<SessionMap> {
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("disk on fire");
            }
            self.inner.load()
        }

        fn save(&self, sessions: &SessionMap) -> Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                anyhow::bail!("disk on fire");
            }
            self.inner.save(sessions)
        }
    }

    #[test]
    fn test_snapshot_creates_new_session() {
        let (cache, store, _dir) = create_test_cache();

        let record = cache.snapshot("s1");

        assert_eq!(record.turn_count(), 0);
        assert!(
            store.load().expect("load").is_empty(),
            "Creating a session should not persist it"
        );
    }

    #[test]
    fn test_append_persists_turn() {
        let (cache, store, _dir) = create_test_cache();

        let count = cache.append_turn("s1", Turn::new("hi", "hello", Some("Gemini")));

        assert_eq!(count, 1);
        let document = store.load().expect("load");
        assert_eq!(document["s1"].messages.len(), 1);
        assert_eq!(document["s1"].history.len(), 1);
    }

    #[test]
    fn test_append_keeps_other_sessions() {
        let (cache, store, _dir) = create_test_cache();

        cache.append_turn("a", Turn::new("1", "1", None));
        cache.append_turn("b", Turn::new("2", "2", None));

        let document = store.load().expect("load");
        assert_eq!(document.len(), 2);
    }

    #[test]
    fn test_reload_after_eviction() {
        let (cache, _store, _dir) = create_test_cache();
        cache.append_turn("s1", Turn::new("first", "reply", Some("Groq")));

        cache.evict_all();
        let record = cache.snapshot("s1");

        assert_eq!(record.turn_count(), 1);
        assert_eq!(record.messages[0].user, "first");
    }

    #[test]
    fn test_clear_removes_everywhere() {
        let (cache, store, _dir) = create_test_cache();
        cache.append_turn("s1", Turn::new("hi", "hello", None));

        assert!(cache.clear("s1").expect("clear"));
        assert!(!store.load().expect("load").contains_key("s1"));
        assert_eq!(cache.snapshot("s1").turn_count(), 0);
    }

    #[test]
    fn test_clear_unknown_reports_not_found() {
        let (cache, _store, _dir) = create_test_cache();

        assert!(!cache.clear("ghost").expect("clear"));
        assert!(!cache.clear("ghost").expect("second clear"));
    }

    #[test]
    fn test_clear_memory_only_session() {
        let (cache, _store, _dir) = create_test_cache();
        cache.snapshot("fresh");

        assert!(cache.clear("fresh").expect("clear"));
    }

    #[test]
    fn test_history_does_not_create() {
        let (cache, store, _dir) = create_test_cache();

        assert!(cache.history("nobody").expect("history").is_none());
        cache.append_turn("s1", Turn::new("q", "a", None));
        cache.evict_all();

        let history = cache.history("s1").expect("history").expect("some");
        assert_eq!(history, vec![HistoryEntry { user: "q".into(), ai: "a".into() }]);
        assert_eq!(store.load().expect("load").len(), 1);
    }

    #[test]
    fn test_list_merges_cache_and_store() {
        let (cache, _store, _dir) = create_test_cache();
        cache.append_turn("b", Turn::new("q", "a", None));
        cache.snapshot("a");

        let ids: Vec<String> = cache.list().expect("list").into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_store_failure_keeps_turn_in_memory() {
        let dir = tempdir().expect("Failed to create temp directory");
        let failing = Arc::new(AtomicBool::new(true));
        let cache = SessionCache::new(Box::new(FlakyStore {
            inner: JsonFileStore::new(dir.path().join("conversations.json")),
            failing: failing.clone(),
        }));

        assert_eq!(cache.append_turn("s1", Turn::new("q1", "a1", None)), 1);
        assert_eq!(cache.append_turn("s1", Turn::new("q2", "a2", None)), 2);
        assert_eq!(cache.snapshot("s1").turn_count(), 2);

        // Once the store recovers, the next append writes the whole session
        failing.store(false, Ordering::SeqCst);
        cache.append_turn("s1", Turn::new("q3", "a3", None));
        let persisted = JsonFileStore::new(dir.path().join("conversations.json"))
            .load()
            .expect("load");
        assert_eq!(persisted["s1"].turn_count(), 3);
    }

    fn flaky_cache(path: &std::path::Path, failing: &Arc<AtomicBool>) -> SessionCache {
        SessionCache::new(Box::new(FlakyStore {
            inner: JsonFileStore::new(path),
            failing: Arc::clone(failing),
        }))
    }

    #[test]
    fn test_unreadable_store_does_not_drop_saved_turns() {
        let (earlier, store, _dir) = create_test_cache();
        for i in 0..3 {
            earlier.append_turn("s1", Turn::new(format!("q{i}"), format!("a{i}"), None));
        }

        let failing = Arc::new(AtomicBool::new(true));
        let cache = flaky_cache(store.path(), &failing);
        assert_eq!(cache.snapshot("s1").turn_count(), 0);

        failing.store(false, Ordering::SeqCst);
        let count = cache.append_turn("s1", Turn::new("q3", "a3", None));

        assert_eq!(count, 4);
        let persisted = store.load().expect("load");
        let users: Vec<&str> = persisted["s1"].messages.iter().map(|t| t.user.as_str()).collect();
        assert_eq!(users, vec!["q0", "q1", "q2", "q3"]);
        assert_eq!(persisted["s1"].history.len(), 4);
        assert_eq!(cache.snapshot("s1").turn_count(), 4);
    }

    #[test]
    fn test_turns_added_while_unreadable_follow_saved_ones() {
        let (earlier, store, _dir) = create_test_cache();
        earlier.append_turn("s1", Turn::new("saved", "a", None));

        let failing = Arc::new(AtomicBool::new(true));
        let cache = flaky_cache(store.path(), &failing);
        cache.append_turn("s1", Turn::new("offline", "b", None));

        failing.store(false, Ordering::SeqCst);
        let history = cache.history("s1").expect("history").expect("some");

        let users: Vec<&str> = history.iter().map(|h| h.user.as_str()).collect();
        assert_eq!(users, vec!["saved", "offline"]);
    }

    #[test]
    fn test_concurrent_appends_same_session() {
        let (cache, store, _dir) = create_test_cache();
        let cache = Arc::new(cache);
        cache.append_turn("shared", Turn::new("seed", "seed", None));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.append_turn("shared", Turn::new(format!("q{i}"), "a", None));
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(cache.snapshot("shared").turn_count(), 9);
        assert_eq!(store.load().expect("load")["shared"].turn_count(), 9);
    }
}
