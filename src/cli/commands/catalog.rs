//! Catalog command - load and inspect the outfit catalog.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use dada_cli::catalog::CatalogDatabase;
use dada_cli::config::Config;

/// Arguments for the catalog command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada catalog import seed.json    Load items and outfits from a seed file\n    \
    dada catalog stats               Show row counts")]
pub struct Args {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    /// Import a JSON seed file
    #[command(long_about = "Loads a JSON document of the form\n\
        {\"items\": [...], \"outfits\": [{..., \"item_ids\": [...]}]}\n\
        in one transaction. Rows with an existing id are replaced.")]
    Import {
        /// Path to the seed file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Show item and outfit counts
    Stats,
}

/// Executes the catalog command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let db_path = config.database_path()?;
    let db = CatalogDatabase::open(&db_path)?;

    match args.command {
        CatalogCommand::Import { file } => {
            let stats = db.import_seed_file(&file)?;
            println!(
                "{}",
                format!(
                    "Imported {} items and {} outfits into {}",
                    stats.items,
                    stats.outfits,
                    db_path.display()
                )
                .green()
            );
        }
        CatalogCommand::Stats => {
            println!("{}", "Catalog".bold());
            println!("  {}  {}", "Database:".dimmed(), db_path.display());
            println!("  {}     {}", "Items:".dimmed(), db.item_count()?);
            println!("  {}   {}", "Outfits:".dimmed(), db.outfit_count()?);
        }
    }
    Ok(())
}
