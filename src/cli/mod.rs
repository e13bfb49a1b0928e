//! Command-line interface for Dada.
//!
//! The CLI is the outer surface over the recommendation logic: chatting,
//! inspecting and clearing sessions, browsing the catalog, and managing
//! configuration.

/// Individual CLI command implementations.
pub mod commands;

/// Shared output format flag.
pub mod format;

pub use format::{print_json, OutputFormat};
