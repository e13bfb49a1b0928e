//! CLI commands for Dada.
//!
//! Each submodule implements a single CLI command with its argument
//! parsing and execution logic.

/// Catalog import and statistics.
pub mod catalog;

/// Chat with the outfit advisor.
pub mod chat;

/// Clear a conversation session.
pub mod clear;

/// Shell completion generation.
pub mod completions;

/// Configuration viewing and management.
pub mod config;

/// Show the stored history of a session.
pub mod history;

/// List catalog items.
pub mod items;

/// Show the occasion tags found in a piece of text.
pub mod keywords;

/// List conversation sessions.
pub mod sessions;

/// Show configuration and provider status.
pub mod status;
