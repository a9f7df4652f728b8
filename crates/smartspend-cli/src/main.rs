//! SmartSpend CLI - Receipt-based spending assistant
//!
//! Usage:
//!   smartspend analyze IMG...   Extract receipts and save them
//!   smartspend dashboard        Show totals and charts
//!   smartspend insights         AI tips about your spending
//!   smartspend export           Write a CSV of all records
//!   smartspend serve            Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&host, port, static_dir.as_deref()).await,
        Commands::Analyze { images, dry_run } => {
            let ai = smartspend_core::AIClient::from_env();
            commands::cmd_analyze(&ai, &cli.records, &images, dry_run).await
        }
        Commands::Dashboard { charts, json } => {
            commands::cmd_dashboard(&cli.records, &charts, json)
        }
        Commands::Insights => {
            let ai = smartspend_core::AIClient::from_env();
            commands::cmd_insights(&ai, &cli.records).await
        }
        Commands::Export { output } => {
            commands::cmd_export(&cli.records, output.as_deref()).map(|_| ())
        }
        Commands::Clear { yes } => commands::cmd_clear(&cli.records, yes),
    }
}
