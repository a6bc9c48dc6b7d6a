//! msgload CLI - clean categorized message datasets into SQLite.
//!
//! ```bash
//! msgload messages.csv categories.csv messages.db
//! msgload messages.csv categories.csv messages.db --table clean --if-exists replace
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use msgload::{clean_data, load_data, save_data, IfExists, PipelineError};

#[derive(Parser, Debug)]
#[command(name = "msgload")]
#[command(about = "Clean and load categorized message datasets into SQLite", long_about = None)]
struct Cli {
    /// CSV file with the message texts (must have an `id` column)
    messages: PathBuf,

    /// CSV file with the encoded category labels (`id` + `categories`)
    categories: PathBuf,

    /// Destination SQLite database file
    database: PathBuf,

    /// Destination table name
    #[arg(short, long, default_value = "messages")]
    table: String,

    /// What to do when the destination table already exists
    #[arg(long, value_enum, default_value_t = IfExists::Fail)]
    if_exists: IfExists,

    /// Field delimiter (auto-detected per file if not given)
    #[arg(short, long)]
    delimiter: Option<char>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), PipelineError> {
    eprintln!("📖 Loading data...");
    eprintln!("   MESSAGES: {}", cli.messages.display());
    eprintln!("   CATEGORIES: {}", cli.categories.display());
    let mut table = load_data(&cli.messages, &cli.categories, cli.delimiter)?;
    eprintln!("   ✓ {} rows joined on 'id'", table.len());

    eprintln!("⚙️  Cleaning data...");
    let (schema, duplicates) = clean_data(&mut table)?;
    eprintln!("   ✓ {} category columns decoded", schema.len());
    if duplicates > 0 {
        eprintln!("   ✓ {} duplicate rows removed", duplicates);
    }

    eprintln!("💾 Saving data...");
    eprintln!("   DATABASE: {}", cli.database.display());
    eprintln!("   TABLE: {}", cli.table);
    let written = save_data(&table, &cli.database, &cli.table, cli.if_exists)?;
    eprintln!("   ✓ {} rows written", written);

    eprintln!("✨ Cleaned data saved to database!");
    Ok(())
}
