//! History command - print a session's conversation.

use anyhow::Result;
use colored::Colorize;

use dada_cli::config::Config;
use dada_cli::recommend::DEFAULT_SESSION_ID;
use dada_cli::session::{JsonFileStore, SessionCache};

use crate::cli::{print_json, OutputFormat};

/// Arguments for the history command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada history                  Show the default session\n    \
    dada history work             Show the 'work' session\n    \
    dada history --format json    Output as JSON")]
pub struct Args {
    /// Session id
    #[arg(value_name = "ID", default_value = DEFAULT_SESSION_ID)]
    pub session: String,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the history command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let cache = SessionCache::new(Box::new(JsonFileStore::new(config.conversations_path()?)));

    let Some(history) = cache.history(&args.session)? else {
        println!(
            "{}",
            format!("Session '{}' not found.", args.session).yellow()
        );
        return Ok(());
    };

    match args.format {
        OutputFormat::Json => print_json(&history)?,
        OutputFormat::Text => {
            println!("{} {}", "Session".bold(), args.session.cyan());
            for entry in &history {
                println!();
                println!("{} {}", "You:".bold(), entry.user);
                println!("{} {}", "Dada:".bold().magenta(), entry.ai);
            }
        }
    }
    Ok(())
}
