//! Footprint CLI - Personal carbon footprint tracker
//!
//! Usage:
//!   footprint init                    Initialize database
//!   footprint transactions add ...    Record spending
//!   footprint analyze --month 2024-07 Run the LLM analysis
//!   footprint serve --port 3000       Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

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
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Status => commands::cmd_status(&cli.db).await,
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&cli.db, &host, port, static_dir.as_deref()).await,
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20),
                Some(TransactionsAction::List { limit }) => {
                    commands::cmd_transactions_list(&db, limit)
                }
                Some(TransactionsAction::Add {
                    title,
                    category,
                    amount,
                }) => commands::cmd_transactions_add(&db, title, category.as_deref(), amount),
                Some(TransactionsAction::Delete { id }) => {
                    commands::cmd_transactions_delete(&db, id)
                }
            }
        }
        Commands::Predict { month } => commands::cmd_predict(month.as_deref()),
        Commands::Analyze { month, json } => {
            commands::cmd_analyze(&cli.db, month.as_deref(), json).await
        }
        Commands::Compare { months } => commands::cmd_compare(&cli.db, &months).await,
    }
}
