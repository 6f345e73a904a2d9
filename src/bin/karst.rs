//! Administration CLI: CSV import and default-admin provisioning.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use karst_api::database::cave_repository::CaveRepository;
use karst_api::database::manager::DatabaseManager;
use karst_api::services::bootstrap;
use karst_api::services::cave_import::csv_to_caves;

#[derive(Parser)]
#[command(name = "karst")]
#[command(about = "Karst CLI - cave catalogue administration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Convert a CSV survey export and bulk insert the caves")]
    Import {
        #[arg(help = "Path to the CSV file")]
        file: PathBuf,

        #[arg(long, help = "Convert and report without inserting")]
        dry_run: bool,
    },

    #[command(about = "Ensure the configured default admin user exists")]
    BootstrapAdmin,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import { file, dry_run } => {
            let csv_text = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let caves = csv_to_caves(&csv_text);
            println!("Converted {} caves from {}", caves.len(), file.display());

            if dry_run {
                return Ok(());
            }

            let pool = DatabaseManager::pool().await?;
            DatabaseManager::run_migrations().await?;
            let outcome = CaveRepository::new(pool).insert_many(&caves).await;
            println!(
                "Inserted {} caves, skipped {}",
                outcome.inserted, outcome.failed
            );
        }
        Commands::BootstrapAdmin => {
            let pool = DatabaseManager::pool().await?;
            DatabaseManager::run_migrations().await?;
            bootstrap::ensure_default_admin(pool).await?;
            println!("Default admin ensured");
        }
    }

    Ok(())
}
