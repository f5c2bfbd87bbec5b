//! Transaction CRUD and month-scoped queries

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Category, MonthKey, NewTransaction, Transaction, UpdateTransaction};

/// Maximum number of transactions returned by any listing query
pub const TRANSACTION_FETCH_CAP: i64 = 500;

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        category: Category::from_name(&row.get::<_, String>(2)?),
        amount: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const TRANSACTION_COLUMNS: &str = "id, title, category, amount, created_at, updated_at";

impl Database {
    /// Insert a transaction, returning the stored row
    pub fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.conn()?;

        let now = Utc::now();
        let created_at = tx.created_at.unwrap_or(now);
        let category = tx.category.unwrap_or_default();

        conn.execute(
            r#"
            INSERT INTO transactions (title, category, amount, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                tx.title,
                category.as_str(),
                tx.amount,
                format_datetime(created_at),
                format_datetime(now),
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get_transaction(id)
    }

    /// Get one transaction by id
    pub fn get_transaction(&self, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;

        conn.query_row(
            &format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS),
            params![id],
            row_to_transaction,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// List the most recent transactions, newest first, capped at 500
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.transactions_in_month(None)
    }

    /// Fetch transactions, optionally scoped to one calendar month
    ///
    /// The month filter is an inclusive-start/exclusive-end UTC range.
    /// Ordering is `created_at` descending with the same cap either way.
    pub fn transactions_in_month(&self, month: Option<MonthKey>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut rows = Vec::new();
        match month {
            Some(month) => {
                let (start, end) = month.range();
                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {} FROM transactions
                    WHERE created_at >= ? AND created_at < ?
                    ORDER BY created_at DESC
                    LIMIT ?
                    "#,
                    TRANSACTION_COLUMNS
                ))?;
                let mapped = stmt.query_map(
                    params![start.to_string(), end.to_string(), TRANSACTION_FETCH_CAP],
                    row_to_transaction,
                )?;
                for tx in mapped {
                    rows.push(tx?);
                }
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions ORDER BY created_at DESC LIMIT ?",
                    TRANSACTION_COLUMNS
                ))?;
                let mapped = stmt.query_map(params![TRANSACTION_FETCH_CAP], row_to_transaction)?;
                for tx in mapped {
                    rows.push(tx?);
                }
            }
        }

        Ok(rows)
    }

    /// Merge-style partial update; refreshes `updated_at`
    pub fn update_transaction(&self, id: i64, update: &UpdateTransaction) -> Result<Transaction> {
        // 404 before touching anything
        let existing = self.get_transaction(id)?;
        let conn = self.conn()?;

        conn.execute(
            r#"
            UPDATE transactions
            SET title = ?, category = ?, amount = ?, created_at = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                update.title.as_ref().or(existing.title.as_ref()),
                update.category.unwrap_or(existing.category).as_str(),
                update.amount.unwrap_or(existing.amount),
                format_datetime(update.created_at.unwrap_or(existing.created_at)),
                format_datetime(Utc::now()),
                id,
            ],
        )?;

        drop(conn);
        self.get_transaction(id)
    }

    /// Delete a transaction by id
    pub fn delete_transaction(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        if affected == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_tx(title: &str, category: Option<Category>, amount: f64, at: &str) -> NewTransaction {
        NewTransaction {
            title: Some(title.to_string()),
            category,
            amount,
            created_at: Some(
                Utc.from_utc_datetime(
                    &chrono::NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
                ),
            ),
        }
    }

    #[test]
    fn test_create_and_get() {
        let db = Database::in_memory().unwrap();

        let created = db
            .create_transaction(&new_tx(
                "MRT top-up",
                Some(Category::Transport),
                25.0,
                "2024-07-03 08:00:00",
            ))
            .unwrap();

        let fetched = db.get_transaction(created.id).unwrap();
        assert_eq!(fetched.title.as_deref(), Some("MRT top-up"));
        assert_eq!(fetched.category, Category::Transport);
        assert_eq!(fetched.amount, 25.0);
    }

    #[test]
    fn test_missing_category_defaults_to_others() {
        let db = Database::in_memory().unwrap();
        let created = db
            .create_transaction(&new_tx("Misc", None, 5.0, "2024-07-03 08:00:00"))
            .unwrap();
        assert_eq!(created.category, Category::Others);
    }

    #[test]
    fn test_month_scoped_fetch() {
        let db = Database::in_memory().unwrap();

        db.create_transaction(&new_tx("June", None, 1.0, "2024-06-30 23:59:59"))
            .unwrap();
        db.create_transaction(&new_tx("July early", None, 2.0, "2024-07-01 00:00:00"))
            .unwrap();
        db.create_transaction(&new_tx("July late", None, 3.0, "2024-07-31 23:59:59"))
            .unwrap();
        db.create_transaction(&new_tx("August", None, 4.0, "2024-08-01 00:00:00"))
            .unwrap();

        let july = db
            .transactions_in_month(Some("2024-07".parse().unwrap()))
            .unwrap();
        let titles: Vec<_> = july.iter().filter_map(|t| t.title.as_deref()).collect();

        // Inclusive start, exclusive end, newest first
        assert_eq!(titles, vec!["July late", "July early"]);
    }

    #[test]
    fn test_unscoped_fetch_orders_newest_first() {
        let db = Database::in_memory().unwrap();

        db.create_transaction(&new_tx("older", None, 1.0, "2024-05-01 10:00:00"))
            .unwrap();
        db.create_transaction(&new_tx("newer", None, 2.0, "2024-06-01 10:00:00"))
            .unwrap();

        let all = db.list_transactions().unwrap();
        assert_eq!(all[0].title.as_deref(), Some("newer"));
        assert_eq!(all[1].title.as_deref(), Some("older"));
    }

    #[test]
    fn test_update_merges_fields() {
        let db = Database::in_memory().unwrap();
        let created = db
            .create_transaction(&new_tx(
                "Flight",
                Some(Category::Travel),
                480.0,
                "2024-07-10 09:00:00",
            ))
            .unwrap();

        let updated = db
            .update_transaction(
                created.id,
                &UpdateTransaction {
                    amount: Some(512.5),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, 512.5);
        assert_eq!(updated.title.as_deref(), Some("Flight"));
        assert_eq!(updated.category, Category::Travel);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let db = Database::in_memory().unwrap();
        let err = db
            .update_transaction(999, &UpdateTransaction::default())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete() {
        let db = Database::in_memory().unwrap();
        let created = db
            .create_transaction(&new_tx("gone", None, 1.0, "2024-07-03 08:00:00"))
            .unwrap();

        db.delete_transaction(created.id).unwrap();
        assert!(matches!(
            db.get_transaction(created.id),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            db.delete_transaction(created.id),
            Err(Error::NotFound(_))
        ));
    }
}
