//! Footprint Core Library
//!
//! Shared functionality for the Footprint carbon tracking tool:
//! - Database access and migrations for the transaction store
//! - Pluggable LLM backends (Gemini, Ollama) with a scripted mock for tests
//! - Defensive JSON extraction for model output
//! - Deterministic seasonal spending predictor
//! - LLM-backed emissions estimation and recommendation generation
//! - Multi-month comparison with per-month failure isolation

pub mod ai;
pub mod analysis;
pub mod db;
pub mod error;
pub mod models;

pub use ai::{GenerationParams, LlmBackend, LlmClient, MockBackend};
pub use analysis::{
    Analyzer, EmissionsEstimator, PredictionModel, RecommendationGenerator, SpendingPredictor,
    TransactionStore, MAX_COMPARE_MONTHS,
};
pub use db::Database;
pub use error::{Error, Result};
pub use models::{
    AnalysisResult, Category, ComparisonResult, ComparisonSummary, EmissionFactors,
    EmissionRecord, EmissionTotals, EmissionsReport, MonthComparison, MonthKey, NewTransaction,
    RecommendationSet, Season, SpendingComparison, SpendingPrediction, Transaction,
    UpdateTransaction,
};
