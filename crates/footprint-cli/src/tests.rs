//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use footprint_core::{Category, Database};

use crate::commands::{self, truncate};

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_transactions_add_and_list() {
    let db = setup_test_db();

    let result = commands::cmd_transactions_add(
        &db,
        Some("Grab ride".to_string()),
        Some("Transport"),
        18.5,
    );
    assert!(result.is_ok());

    let stored = db.list_transactions().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].category, Category::Transport);
    assert_eq!(stored[0].amount, 18.5);

    let result = commands::cmd_transactions_list(&db, 20);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_transactions_add_unknown_category() {
    let db = setup_test_db();

    commands::cmd_transactions_add(&db, None, Some("groceries"), 7.0).unwrap();

    let stored = db.list_transactions().unwrap();
    assert_eq!(stored[0].category, Category::Others);
    assert_eq!(stored[0].title, None);
}

#[test]
fn test_cmd_transactions_delete() {
    let db = setup_test_db();

    commands::cmd_transactions_add(&db, Some("gone".to_string()), None, 1.0).unwrap();
    let id = db.list_transactions().unwrap()[0].id;

    assert!(commands::cmd_transactions_delete(&db, id).is_ok());
    assert!(commands::cmd_transactions_delete(&db, id).is_err());
}

#[test]
fn test_cmd_transactions_list_empty_db() {
    let db = setup_test_db();
    let result = commands::cmd_transactions_list(&db, 20);
    assert!(result.is_ok());
}

// ========== Predict Command Tests ==========

#[test]
fn test_cmd_predict_with_month() {
    let result = commands::cmd_predict(Some("2024-07"));
    assert!(result.is_ok());
}

#[test]
fn test_cmd_predict_defaults_to_current_month() {
    let result = commands::cmd_predict(None);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_predict_rejects_malformed_month() {
    let result = commands::cmd_predict(Some("July 2024"));
    assert!(result.is_err());
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 40), "short");
    assert_eq!(truncate("abcdefghij", 8), "abcde...");
}
