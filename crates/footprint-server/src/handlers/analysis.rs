//! AI analysis handlers
//!
//! The AI endpoints wrap their payloads in a `{success, data}` envelope;
//! the handprint and greener-alternatives routes are projections of the
//! comprehensive analysis rather than separate LLM pipelines.

use std::sync::Arc;
use std::sync::OnceLock;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;

use crate::{AppError, AppState};
use footprint_core::models::Alternative;
use footprint_core::MonthKey;

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompareMonthsRequest {
    #[serde(default)]
    pub months: Vec<String>,
}

fn parse_month(raw: &str) -> Result<MonthKey, AppError> {
    raw.parse::<MonthKey>().map_err(AppError::from)
}

fn current_month() -> MonthKey {
    MonthKey::containing(Utc::now())
}

fn envelope(data: impl serde::Serialize) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "success": true, "data": data }))
}

/// GET /api/ai/emissions?month=YYYY-MM - Emissions estimate (month optional)
pub async fn estimate_emissions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<footprint_core::EmissionsReport>, AppError> {
    let month = params.month.as_deref().map(parse_month).transpose()?;
    let report = state.analyzer.estimate_emissions(month, None).await?;
    Ok(Json(report))
}

/// GET /api/ai/predict-spending?month=YYYY-MM - Deterministic prediction
pub async fn predict_spending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let month = match params.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => {
            return Err(AppError::bad_request(
                "Month parameter is required (format: YYYY-MM)",
            ))
        }
    };

    let prediction = state.analyzer.predict(month);
    Ok(envelope(prediction))
}

/// GET /api/ai/comprehensive-analysis?month=YYYY-MM - Full pipeline
///
/// Defaults to the current month when the parameter is absent.
pub async fn comprehensive_analysis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let month = match params.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => current_month(),
    };

    let analysis = state.analyzer.comprehensive_analysis(month).await?;
    Ok(envelope(analysis))
}

/// POST /api/ai/compare-months - Analyze and compare up to 12 months
pub async fn compare_months(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompareMonthsRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if payload.months.is_empty() {
        return Err(AppError::bad_request(
            "Months array is required (format: [\"2024-06\", \"2024-07\"])",
        ));
    }

    let months = payload
        .months
        .iter()
        .map(|m| parse_month(m))
        .collect::<Result<Vec<_>, _>>()?;

    let result = state.analyzer.compare_months(&months).await?;
    Ok(envelope(result))
}

/// GET /api/ai/handprint-suggestions?month=YYYY-MM - Handprint projection
pub async fn handprint_suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let month = match params.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => current_month(),
    };

    let analysis = state.analyzer.comprehensive_analysis(month).await?;
    Ok(envelope(serde_json::json!({
        "month": month,
        "season": analysis.prediction.season,
        "totalEmissions": analysis.emissions.totals.total_emissions_kg,
        "handprintActions": analysis.recommendations.handprint_actions,
        "seasonalTips": analysis.recommendations.seasonal_tips,
        "topEmitters": analysis.recommendations.top_emitters,
    })))
}

/// GET /api/ai/greener-alternatives?month=YYYY-MM - Alternatives projection
pub async fn greener_alternatives(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let month = match params.month.as_deref() {
        Some(raw) => parse_month(raw)?,
        None => current_month(),
    };

    let analysis = state.analyzer.comprehensive_analysis(month).await?;
    Ok(envelope(serde_json::json!({
        "month": month,
        "summary": analysis.recommendations.summary,
        "alternatives": analysis.recommendations.alternatives,
        "topEmitters": analysis.recommendations.top_emitters,
        "potentialSavings": potential_savings(&analysis.recommendations.alternatives),
    })))
}

/// Average the percentage ranges embedded in alternatives' free text
///
/// Each alternative's `potentialSavings` is scanned for "N%" or "N-M%";
/// a range contributes its midpoint, no match contributes zero.
fn potential_savings(alternatives: &[Alternative]) -> String {
    static RANGE: OnceLock<Regex> = OnceLock::new();

    if alternatives.is_empty() {
        return "No data available".to_string();
    }

    let range = RANGE.get_or_init(|| Regex::new(r"(\d+)-?(\d+)?%").expect("static pattern"));

    let total: f64 = alternatives
        .iter()
        .map(|a| match range.captures(&a.potential_savings) {
            Some(caps) => {
                let min: f64 = caps
                    .get(1)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(0.0);
                let max: f64 = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(min);
                (min + max) / 2.0
            }
            None => 0.0,
        })
        .sum();

    let avg = total / alternatives.len() as f64;
    format!("Average {:.0}% reduction possible", avg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternative(text: &str) -> Alternative {
        Alternative {
            potential_savings: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_potential_savings_empty() {
        assert_eq!(potential_savings(&[]), "No data available");
    }

    #[test]
    fn test_potential_savings_averages_ranges_and_singles() {
        let alts = vec![
            alternative("~30-40% reduction in transport emissions"),
            alternative("about 20% less"),
        ];
        // (35 + 20) / 2 = 27.5, displayed with no decimals
        assert_eq!(potential_savings(&alts), "Average 28% reduction possible");
    }

    #[test]
    fn test_potential_savings_unmatched_counts_as_zero() {
        let alts = vec![alternative("meaningful but unquantified")];
        assert_eq!(potential_savings(&alts), "Average 0% reduction possible");
    }
}
