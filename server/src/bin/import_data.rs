//! Load ingredients or tags into the database.
//!
//! ```text
//! import-data ingredients data/ingredients.csv
//! import-data tags data/tags.json
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use foodgram_server::config::Config;
use foodgram_server::db;
use foodgram_server::import::{self, Format};

#[derive(Parser)]
#[command(name = "import-data", about = "Load reference data into the database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import ingredients (`name,measurement_unit`)
    Ingredients {
        /// CSV or JSON file
        file: PathBuf,
    },
    /// Import tags (`name,slug`)
    Tags {
        /// CSV or JSON file
        file: PathBuf,
    },
}

fn open(path: &Path) -> anyhow::Result<(File, Format)> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok((file, Format::from_path(path)))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    let pool = db::create_pool(&config.database_url)?;
    let mut conn = pool.get()?;

    match cli.command {
        Command::Ingredients { file } => {
            let (reader, format) = open(&file)?;
            let rows = import::parse_ingredients(reader, format)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let inserted = import::insert_ingredients(&mut conn, &rows)?;
            println!(
                "Imported {} of {} ingredients ({} already present)",
                inserted,
                rows.len(),
                rows.len() - inserted
            );
        }
        Command::Tags { file } => {
            let (reader, format) = open(&file)?;
            let rows = import::parse_tags(reader, format)
                .with_context(|| format!("Failed to parse {}", file.display()))?;
            let inserted = import::insert_tags(&mut conn, &rows)?;
            println!(
                "Imported {} of {} tags ({} already present)",
                inserted,
                rows.len(),
                rows.len() - inserted
            );
        }
    }

    Ok(())
}
