//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Footprint - Track spending and its carbon cost
#[derive(Parser)]
#[command(name = "footprint")]
#[command(about = "Personal carbon footprint tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "footprint.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database and LLM backend status
    Status,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Manage transactions (add, list, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Predict spending for a month (no LLM required)
    Predict {
        /// Month to predict (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Run the comprehensive analysis for a month
    Analyze {
        /// Month to analyze (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Print the raw JSON result instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Compare emissions across months
    Compare {
        /// Months to compare (YYYY-MM), two or more, at most twelve
        #[arg(required = true)]
        months: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// Add a transaction
    Add {
        /// Transaction title
        #[arg(short, long)]
        title: Option<String>,

        /// Category: Utility, Shopping, Transport, Travel, Others
        #[arg(short, long)]
        category: Option<String>,

        /// Amount spent
        #[arg(short, long)]
        amount: f64,
    },

    /// List recent transactions
    List {
        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete a transaction by id
    Delete {
        /// Transaction id
        id: i64,
    },
}
