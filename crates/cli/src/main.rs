//! Sevenfold CLI - Database migrations and development tools.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! sf-cli migrate
//!
//! # Exercise the checkout completion flow against a local server:
//! # inserts a pending order, posts the development webhook payload,
//! # and prints the finished row
//! sf-cli simulate-webhook
//! sf-cli simulate-webhook --session-id cs_test_456 --url http://localhost:3000
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `simulate-webhook` - Drive the webhook flow locally

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Sevenfold CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Insert a pending order and replay the development webhook against it
    SimulateWebhook {
        /// Checkout-session id to simulate
        #[arg(long, default_value = "cs_test_123")]
        session_id: String,

        /// Base URL of a running storefront server
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
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
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::SimulateWebhook { session_id, url } => {
            commands::simulate_webhook::run(&session_id, &url).await?;
        }
    }
    Ok(())
}
