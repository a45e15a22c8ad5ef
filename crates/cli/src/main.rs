//! Village Portal CLI - database and account tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! vp-cli migrate
//!
//! # Create a back-office account (password from --password or PORTAL_ADMIN_PASSWORD)
//! vp-cli admin create -u ketua -n "Ketua RT 05"
//!
//! # Load demo data
//! vp-cli seed demo/seed.yaml
//! ```
//!
//! All commands read `PORTAL_DATABASE_URL` (or `DATABASE_URL`), with `.env`
//! support.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vp-cli")]
#[command(author, version, about = "Village portal CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage back-office accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Insert residents, finance, activities and roster from a YAML file
    Seed {
        /// Path to the YAML file
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new account
    Create {
        /// Login name (no whitespace)
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Password; prefer the environment variable over the command line
        #[arg(long, env = "PORTAL_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                name,
                password,
            } => {
                commands::admin::create_user(&username, &name, &password).await?;
            }
        },
        Commands::Seed { file } => {
            commands::seed::from_file(&file).await?;
        }
    }
    Ok(())
}
