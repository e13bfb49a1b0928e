//! Sessions command - list conversation sessions.

use anyhow::Result;
use colored::Colorize;

use dada_cli::config::Config;
use dada_cli::session::{JsonFileStore, SessionCache};

use crate::cli::{print_json, OutputFormat};

/// Arguments for the sessions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada sessions                  List sessions\n    \
    dada sessions --format json    Output as JSON")]
pub struct Args {
    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the sessions command.
///
/// Reads the conversation document directly, so it works without any
/// provider key configured.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let cache = SessionCache::new(Box::new(JsonFileStore::new(config.conversations_path()?)));
    let sessions = cache.list()?;

    if sessions.is_empty() {
        println!("{}", "No sessions found.".dimmed());
        println!();
        println!("Run 'dada chat' to start one.");
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => print_json(&sessions)?,
        OutputFormat::Text => {
            const ID_WIDTH: usize = 20;
            const TURNS_WIDTH: usize = 6;
            const DATE_WIDTH: usize = 16;

            println!(
                "{}",
                format!(
                    "{:<ID_WIDTH$}  {:>TURNS_WIDTH$}  {:<DATE_WIDTH$}  {}",
                    "ID", "TURNS", "CREATED", "LAST ACTIVE"
                )
                .bold()
            );

            for session in &sessions {
                let created = session.created_at.format("%Y-%m-%d %H:%M").to_string();
                let last = session
                    .last_active
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<ID_WIDTH$}  {:>TURNS_WIDTH$}  {:<DATE_WIDTH$}  {}",
                    session.id.cyan(),
                    session.turns,
                    created.dimmed(),
                    last.dimmed()
                );
            }
        }
    }

    Ok(())
}
