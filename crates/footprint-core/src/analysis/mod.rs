//! Emissions & prediction analysis pipeline
//!
//! Single-month pipeline: fetch transactions, predict spending from the
//! regression model, estimate per-transaction emissions via the LLM, then
//! generate recommendations via a second LLM call. Comparison mode fans the
//! whole pipeline out across months concurrently and reduces the results.

mod estimator;
mod orchestrator;
mod predictor;
mod recommender;

pub use estimator::EmissionsEstimator;
pub use orchestrator::{Analyzer, MAX_COMPARE_MONTHS};
pub use predictor::{PredictionModel, SpendingPredictor};
pub use recommender::RecommendationGenerator;

use async_trait::async_trait;

use crate::db::Database;
use crate::error::Result;
use crate::models::{MonthKey, Transaction};

/// Month-scoped read access to the transaction store
///
/// `None` means "most recent transactions regardless of month". Implementors
/// must keep the cap-500, newest-first contract. Read-only; store failures
/// propagate unchanged and are never retried.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn transactions_in_month(&self, month: Option<MonthKey>) -> Result<Vec<Transaction>>;
}

#[async_trait]
impl TransactionStore for Database {
    async fn transactions_in_month(&self, month: Option<MonthKey>) -> Result<Vec<Transaction>> {
        Database::transactions_in_month(self, month)
    }
}
