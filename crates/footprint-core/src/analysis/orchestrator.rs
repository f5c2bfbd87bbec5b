//! Analysis orchestrator
//!
//! Composes the store accessor, predictor, estimator, and recommender into
//! the single-month comprehensive analysis, and fans that pipeline out
//! across months for comparisons. Per-month failures inside a comparison
//! are isolated into error stubs; they never abort sibling months.

use futures::future::join_all;
use tracing::warn;

use crate::ai::LlmClient;
use crate::error::{Error, Result};
use crate::models::{
    round2, AnalysisResult, ComparisonResult, ComparisonSummary, EmissionFactors, EmissionsReport,
    MonthComparison, MonthKey, RecommendationSet, SpendingComparison,
};

use super::{
    EmissionsEstimator, RecommendationGenerator, SpendingPredictor, TransactionStore,
};

/// Maximum number of months accepted by a comparison request
pub const MAX_COMPARE_MONTHS: usize = 12;

/// The analysis pipeline, wired once at startup
///
/// Holds the store, the LLM-backed stages, the regression predictor, and the
/// factor table. Everything it owns is read-only per call, so concurrent
/// analyses share it freely.
#[derive(Clone)]
pub struct Analyzer<S: TransactionStore> {
    store: S,
    predictor: SpendingPredictor,
    estimator: EmissionsEstimator,
    recommender: RecommendationGenerator,
    factors: EmissionFactors,
}

impl<S: TransactionStore> Analyzer<S> {
    pub fn new(
        store: S,
        llm: LlmClient,
        predictor: SpendingPredictor,
        factors: EmissionFactors,
    ) -> Self {
        Self {
            store,
            predictor,
            estimator: EmissionsEstimator::new(llm.clone()),
            recommender: RecommendationGenerator::new(llm),
            factors,
        }
    }

    /// Deterministic spending prediction for one month
    pub fn predict(&self, month: MonthKey) -> crate::models::SpendingPrediction {
        self.predictor.predict(month)
    }

    /// Emissions estimate, optionally month-scoped
    ///
    /// Callers may pass their own factor table; `None` uses the default.
    pub async fn estimate_emissions(
        &self,
        month: Option<MonthKey>,
        factors: Option<EmissionFactors>,
    ) -> Result<EmissionsReport> {
        let factors = factors.unwrap_or(self.factors);
        self.estimator
            .estimate_month(&self.store, month, &factors)
            .await
    }

    /// Comprehensive analysis: prediction + emissions + recommendations
    pub async fn comprehensive_analysis(&self, month: MonthKey) -> Result<AnalysisResult> {
        let prediction = self.predictor.predict(month);

        let transactions = self.store.transactions_in_month(Some(month)).await?;
        if transactions.is_empty() {
            // Nothing to analyze: skip both LLM stages. The -100 percentage
            // is a sentinel meaning "100% under predicted".
            return Ok(AnalysisResult {
                comparison: SpendingComparison {
                    predicted_vs_actual: -prediction.predicted_spending,
                    percentage_difference: -100.0,
                },
                emissions: EmissionsReport {
                    month: Some(month),
                    ..Default::default()
                },
                recommendations: RecommendationSet::no_transactions(),
                actual_spending: 0.0,
                prediction,
            });
        }

        let actual_spending: f64 = transactions
            .iter()
            .map(|t| if t.amount.is_finite() { t.amount } else { 0.0 })
            .sum();

        // Reuse the fetched transactions rather than re-querying
        let mut emissions = self.estimator.estimate(&transactions, &self.factors).await?;
        emissions.month = Some(month);

        let recommendations = self
            .recommender
            .generate(
                &emissions,
                prediction.predicted_spending,
                actual_spending,
                month,
            )
            .await?;

        let predicted = prediction.predicted_spending;
        let comparison = SpendingComparison {
            predicted_vs_actual: actual_spending - predicted,
            percentage_difference: if predicted > 0.0 {
                round2((actual_spending - predicted) / predicted * 100.0)
            } else {
                0.0
            },
        };

        Ok(AnalysisResult {
            prediction,
            emissions,
            recommendations,
            actual_spending,
            comparison,
        })
    }

    /// Compare up to 12 months, analyzing them concurrently
    ///
    /// Input is validated before any upstream call. Each month's failure is
    /// converted to an error stub; the reduction only sees successes.
    pub async fn compare_months(&self, months: &[MonthKey]) -> Result<ComparisonResult> {
        if months.is_empty() {
            return Err(Error::Validation("months array is required".to_string()));
        }
        if months.len() > MAX_COMPARE_MONTHS {
            return Err(Error::Validation(format!(
                "Maximum {} months allowed for comparison",
                MAX_COMPARE_MONTHS
            )));
        }

        // Fan out, full barrier at the join; no cross-month shared state
        let comparisons: Vec<MonthComparison> =
            join_all(months.iter().map(|&month| async move {
                match self.comprehensive_analysis(month).await {
                    Ok(analysis) => MonthComparison {
                        month,
                        error: None,
                        total_emissions: analysis.emissions.totals.total_emissions_kg,
                        total_spending: analysis.actual_spending,
                        predicted_spending: analysis.prediction.predicted_spending,
                        season: Some(analysis.prediction.season),
                        by_category: Some(analysis.emissions.totals.by_category),
                        transaction_count: Some(analysis.emissions.items.len()),
                    },
                    Err(e) => {
                        warn!(month = %month, error = %e, "Month analysis failed");
                        MonthComparison::failed(month)
                    }
                }
            }))
            .await;

        let valid: Vec<&MonthComparison> =
            comparisons.iter().filter(|c| c.error.is_none()).collect();

        if valid.is_empty() {
            return Ok(ComparisonResult {
                comparisons,
                summary: ComparisonSummary::NoData {
                    message: "No valid data found for comparison".to_string(),
                },
            });
        }

        let average_emissions =
            round2(valid.iter().map(|c| c.total_emissions).sum::<f64>() / valid.len() as f64);
        let average_spending =
            round2(valid.iter().map(|c| c.total_spending).sum::<f64>() / valid.len() as f64);

        // Ties keep the first encountered, i.e. earliest in input order
        let highest = valid
            .iter()
            .copied()
            .fold(valid[0], |max, c| {
                if c.total_emissions > max.total_emissions {
                    c
                } else {
                    max
                }
            })
            .clone();
        let lowest = valid
            .iter()
            .copied()
            .fold(valid[0], |min, c| {
                if c.total_emissions < min.total_emissions {
                    c
                } else {
                    min
                }
            })
            .clone();

        let mut sorted: Vec<&MonthComparison> = valid.clone();
        sorted.sort_by_key(|c| c.month);
        let mid = sorted.len() / 2;
        let avg_first = half_average(&sorted[..mid]);
        let avg_second = half_average(&sorted[mid..]);
        let trend = trend_label(avg_first, avg_second);

        Ok(ComparisonResult {
            summary: ComparisonSummary::Stats {
                average_emissions,
                average_spending,
                total_months_analyzed: valid.len(),
                highest_emission_month: highest,
                lowest_emission_month: lowest,
                trend,
            },
            comparisons,
        })
    }
}

fn half_average(half: &[&MonthComparison]) -> f64 {
    if half.is_empty() {
        return 0.0;
    }
    half.iter().map(|c| c.total_emissions).sum::<f64>() / half.len() as f64
}

/// Classify the emissions trend between the two halves of a comparison
///
/// A zero first-half average is guarded the same way as the top-level
/// percentage-difference formula: the change counts as 0, i.e. stable.
/// The 5% boundary applies to the unrounded change; rounding to one
/// decimal is display-only.
fn trend_label(avg_first: f64, avg_second: f64) -> String {
    let pct = if avg_first > 0.0 {
        (avg_second - avg_first) / avg_first * 100.0
    } else {
        0.0
    };

    if pct.abs() < 5.0 {
        "stable".to_string()
    } else if pct > 0.0 {
        format!("increasing (+{:.1}%)", pct)
    } else {
        format!("decreasing ({:.1}%)", pct)
    }
}
