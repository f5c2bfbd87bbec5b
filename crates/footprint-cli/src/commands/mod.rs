//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status) and shared utilities (open_db)
//! - `serve` - Web server command
//! - `transactions` - Transaction commands (add, list, delete)
//! - `analysis` - Analysis commands (predict, analyze, compare)

pub mod analysis;
pub mod core;
pub mod serve;
pub mod transactions;

// Re-export command functions for main.rs
pub use analysis::*;
pub use core::*;
pub use serve::*;
pub use transactions::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
