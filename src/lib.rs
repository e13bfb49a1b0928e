//! Dada - outfit recommendations over a local catalog
//!
//! A chat backend that pairs keyword retrieval over a clothing catalog with
//! hosted LLMs. Providers are tried in a fixed fallback order (or one is
//! pinned), turns are persisted per session, and when no model can answer
//! the catalog itself is listed.

pub mod catalog;
pub mod chat;
pub mod config;
pub mod provider;
pub mod recommend;
pub mod retrieval;
pub mod session;
