//! Status command - show what the advisor is running with.
//!
//! Displays the catalog location and size, the conversation store, and
//! which AI providers are registered.

use anyhow::Result;
use colored::Colorize;

use dada_cli::config::Config;
use dada_cli::recommend::Recommender;

use crate::cli::{print_json, OutputFormat};

/// Arguments for the status command.
#[derive(clap::Args)]
pub struct Args {
    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the status command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let recommender = Recommender::from_config(&config)?;
    let status = recommender.status();

    let db_path = config.database_path()?;
    let conversations_path = config.conversations_path()?;
    let db = recommender.retriever().store();
    let item_count = db.item_count()?;
    let outfit_count = db.outfit_count()?;

    if args.format == OutputFormat::Json {
        let json = serde_json::json!({
            "status": "ok",
            "database": db_path,
            "conversations": conversations_path,
            "items": item_count,
            "outfits": outfit_count,
            "ai_enabled": status.ai_enabled,
            "providers": status.providers,
        });
        print_json(&json)?;
        return Ok(());
    }

    println!("{}", "Dada".bold().cyan());
    println!("{}", "Outfit advice from your own catalog".dimmed());
    println!();

    println!("{}", "Catalog:".bold());
    println!("  {}  {}", "Database:".dimmed(), db_path.display());
    println!("  Items:    {item_count}");
    println!("  Outfits:  {outfit_count}");

    println!();
    println!("{}", "Conversations:".bold());
    println!("  {}  {}", "Store:".dimmed(), conversations_path.display());

    println!();
    println!("{}", "AI providers:".bold());
    if status.ai_enabled {
        for (idx, name) in status.providers.iter().enumerate() {
            println!("  {} {}. {}", "✓".green(), idx + 1, name);
        }
        println!(
            "  {}",
            format!("Timeout: {}s per request", config.request_timeout().as_secs()).dimmed()
        );
    } else {
        println!("  {} none configured (catalog-only replies)", "○".dimmed());
        println!();
        println!(
            "{}",
            "Hint: set LLM_API_KEY, GROQ_API_KEY or DEEPSEEK_API_KEY, or run 'dada config set'"
                .yellow()
        );
    }

    if item_count == 0 {
        println!();
        println!(
            "{}",
            "Hint: Run 'dada catalog import <file>' to load outfits".yellow()
        );
    }

    Ok(())
}
