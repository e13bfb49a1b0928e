//! Output selection for `dada` commands.
//!
//! Every listing command takes `--format`; JSON output goes through
//! [`print_json`] so scripts see the same pretty-printed shape everywhere.

use clap::ValueEnum;
use serde::Serialize;

/// How a command writes its result to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output (default).
    #[default]
    Text,
    /// Pretty-printed JSON, e.g. a full recommendation with its outfits.
    Json,
}

/// Serializes a command result as pretty-printed JSON.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Prints a command result as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}
