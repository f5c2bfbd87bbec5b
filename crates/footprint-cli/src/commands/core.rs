//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Show database and LLM backend status

use std::path::Path;

use anyhow::{Context, Result};
use footprint_core::{Database, LlmBackend, LlmClient};

/// Open the database, running migrations if needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path)?;

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record spending: footprint transactions add --amount 18.50 --category Transport");
    println!("  2. Analyze a month: footprint analyze --month 2024-07");
    println!("  3. Start web UI:    footprint serve");

    Ok(())
}

pub async fn cmd_status(db_path: &Path) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Footprint Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }

        match open_db(db_path) {
            Ok(db) => {
                if let Ok(transactions) = db.list_transactions() {
                    println!("   Transactions: {}", transactions.len());
                }
            }
            Err(e) => {
                println!("   ❌ Error opening database: {}", e);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // LLM backend status
    println!();
    match LlmClient::from_env() {
        Some(llm) => {
            if llm.health_check().await {
                println!("   ✅ LLM backend: {} (model: {})", llm.host(), llm.model());
            } else {
                println!(
                    "   ⚠️  LLM backend configured but not responding: {} (model: {})",
                    llm.host(),
                    llm.model()
                );
            }
        }
        None => {
            println!("   ❌ LLM backend not configured");
            println!("      Set GEMINI_API_KEY, or LLM_BACKEND=ollama with OLLAMA_HOST");
        }
    }

    println!();
    Ok(())
}
