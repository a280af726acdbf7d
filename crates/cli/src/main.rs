//! Dar Décor CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! dd-cli migrate run
//!
//! # Show migration status
//! dd-cli migrate status
//!
//! # Seed the catalog with sample products
//! dd-cli seed catalog
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dd-cli")]
#[command(author, version, about = "Dar Décor CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Run,
    /// Show applied and pending migrations
    Status,
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the sample catalog (skips products that already exist)
    Catalog,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { action } => match action {
            MigrateAction::Run => commands::migrate::run().await?,
            MigrateAction::Status => commands::migrate::status().await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Catalog => commands::seed::catalog().await?,
        },
    }
    Ok(())
}
