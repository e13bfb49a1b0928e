//! Conversation sessions: the persisted document and the locked cache
//! the chat orchestrator works against.

pub mod cache;
pub mod models;
pub mod store;

pub use cache::SessionCache;
pub use models::*;
pub use store::{JsonFileStore, SessionStore};
