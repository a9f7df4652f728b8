//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// SmartSpend - Turn receipt photos into a spending dashboard
#[derive(Parser)]
#[command(name = "smartspend")]
#[command(about = "Receipt-based spending assistant", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Records file (JSON array of receipts)
    #[arg(long, default_value = "smartspend-records.json", global = true)]
    pub records: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory with the built front end
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Extract receipts from images and append them to the records file
    Analyze {
        /// Receipt images (jpg, png, webp, heic, gif)
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Print the extracted records without saving them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show spending summary and charts
    Dashboard {
        /// Charts to show (category_pie, merchant_bar, daily_trend, category_count)
        #[arg(short, long, value_delimiter = ',')]
        charts: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask the AI for short insights about your spending
    Insights,

    /// Export records to CSV
    Export {
        /// Output file (default: smartspend_export_<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every saved record
    Clear {
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
