//! Items command - browse catalog items.

use anyhow::Result;
use colored::Colorize;

use dada_cli::catalog::CatalogDatabase;
use dada_cli::config::Config;

use crate::cli::{print_json, OutputFormat};

/// Arguments for the items command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada items                        List every item\n    \
    dada items --color white          Items whose colour mentions 'white'\n    \
    dada items --category top         Only tops\n    \
    dada items --format json          Output as JSON")]
pub struct Args {
    /// Filter by colour (substring match)
    #[arg(long, value_name = "COLOR")]
    pub color: Option<String>,

    /// Filter by category (exact match)
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<String>,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the items command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let db = CatalogDatabase::open(&config.database_path()?)?;
    let items = db.list_items(args.color.as_deref(), args.category.as_deref())?;

    match args.format {
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{}", "No items found.".dimmed());
                println!();
                println!("Run 'dada catalog import <file>' to load a catalog.");
                return Ok(());
            }

            const ID_WIDTH: usize = 6;
            const NAME_WIDTH: usize = 28;
            const CATEGORY_WIDTH: usize = 12;
            const COLOR_WIDTH: usize = 12;

            println!(
                "{}",
                format!(
                    "{:>ID_WIDTH$}  {:<NAME_WIDTH$}  {:<CATEGORY_WIDTH$}  {:<COLOR_WIDTH$}  {}",
                    "ID", "NAME", "CATEGORY", "COLOR", "PRICE"
                )
                .bold()
            );
            for item in &items {
                let owned = if item.owned { " (owned)" } else { "" };
                println!(
                    "{:>ID_WIDTH$}  {:<NAME_WIDTH$}  {:<CATEGORY_WIDTH$}  {:<COLOR_WIDTH$}  {:.2}{}",
                    item.id,
                    item.name,
                    item.category.yellow(),
                    item.color,
                    item.price,
                    owned.dimmed()
                );
            }
        }
    }
    Ok(())
}
