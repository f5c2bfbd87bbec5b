//! Domain models for footprint

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Spending categories tracked by the store
///
/// Unknown or absent categories fall back to `Others`; the factor table
/// and the LLM prompts are both keyed on this closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Category {
    Utility,
    Shopping,
    Transport,
    Travel,
    #[default]
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utility => "Utility",
            Self::Shopping => "Shopping",
            Self::Transport => "Transport",
            Self::Travel => "Travel",
            Self::Others => "Others",
        }
    }

    /// Parse a category name, defaulting to `Others` for anything unrecognized
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "utility" => Self::Utility,
            "shopping" => Self::Shopping,
            "transport" => Self::Transport,
            "travel" => Self::Travel,
            _ => Self::Others,
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::from_name(&s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Emission factors in kgCO2e per currency unit spent, by category
///
/// Singapore-context approximations. Constructed once at startup and passed
/// explicitly into every estimation call so tests can swap in their own table.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EmissionFactors {
    pub utility: f64,
    pub shopping: f64,
    pub transport: f64,
    pub travel: f64,
    pub others: f64,
}

impl Default for EmissionFactors {
    fn default() -> Self {
        Self {
            utility: 0.40,
            shopping: 0.25,
            transport: 0.55,
            travel: 0.80,
            others: 0.20,
        }
    }
}

impl EmissionFactors {
    pub fn factor(&self, category: Category) -> f64 {
        match category {
            Category::Utility => self.utility,
            Category::Shopping => self.shopping,
            Category::Transport => self.transport,
            Category::Travel => self.travel,
            Category::Others => self.others,
        }
    }
}

/// Calendar month identifier (`YYYY-MM`), the sole time-partitioning unit
///
/// All analysis is month-granular; no finer resolution is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1900..=9999).contains(&year) {
            return Err(Error::Validation(format!(
                "Invalid month key: {:04}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    /// The month containing the given instant
    pub fn containing(at: DateTime<Utc>) -> Self {
        use chrono::Datelike;
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Fixed seasonal bucket for this month (simplified monsoon calendar):
    /// Dec-Mar Winter, Apr-May Spring, Jun-Sep Summer, Oct-Nov Fall.
    pub fn season(&self) -> Season {
        match self.month {
            12 | 1..=3 => Season::Winter,
            4..=5 => Season::Spring,
            6..=9 => Season::Summer,
            _ => Season::Fall,
        }
    }

    /// Inclusive-start / exclusive-end UTC range covering this calendar month
    pub fn range(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("validated on construction")
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid");
        let (end_year, end_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        let end = NaiveDate::from_ymd_opt(end_year, end_month, 1)
            .expect("validated on construction")
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid");
        (start, end)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("Invalid month key: {} (expected YYYY-MM)", s));
        let (y, m) = s.split_once('-').ok_or_else(invalid)?;
        if y.len() != 4 || m.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Seasonal buckets derived from the month key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored financial transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub title: Option<String>,
    pub category: Category,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a transaction
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    /// Caller-supplied timestamp; the store fills in "now" when absent
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update for an existing transaction
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransaction {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_opt_amount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Coerce any numeric-like JSON value into an amount; NaN and garbage become 0
fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_amount(&value))
}

fn lenient_opt_amount<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_amount))
}

pub(crate) fn coerce_amount(value: &serde_json::Value) -> f64 {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

/// One emissions estimate per input transaction
///
/// The `emissions_kg` value is authoritative from the LLM response (it is
/// instructed to compute amount x factor), not recomputed locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default)]
    pub emissions_kg: f64,
    #[serde(default)]
    pub note: Option<String>,
}

/// Accept both `"42"` and `42` for ids echoed back by the model
fn string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Aggregated emissions, recomputed per request and never persisted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionTotals {
    #[serde(default)]
    pub total_emissions_kg: f64,
    #[serde(default)]
    pub by_category: BTreeMap<String, f64>,
}

/// Result of the emissions estimation stage
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsReport {
    pub items: Vec<EmissionRecord>,
    pub totals: EmissionTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthKey>,
}

/// One-hot season encoding used as the regression feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonFeatures {
    #[serde(rename = "season_Spring")]
    pub spring: u8,
    #[serde(rename = "season_Summer")]
    pub summer: u8,
    #[serde(rename = "season_Fall")]
    pub fall: u8,
    #[serde(rename = "season_Winter")]
    pub winter: u8,
}

impl SeasonFeatures {
    pub fn encode(season: Season) -> Self {
        Self {
            spring: (season == Season::Spring) as u8,
            summer: (season == Season::Summer) as u8,
            fall: (season == Season::Fall) as u8,
            winter: (season == Season::Winter) as u8,
        }
    }

    /// Feature value by artifact feature name; unknown names contribute 0
    pub fn by_name(&self, name: &str) -> f64 {
        match name {
            "season_Spring" => self.spring as f64,
            "season_Summer" => self.summer as f64,
            "season_Fall" => self.fall as f64,
            "season_Winter" => self.winter as f64,
            _ => 0.0,
        }
    }
}

/// Deterministic spending prediction for one month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPrediction {
    pub month: MonthKey,
    pub season: Season,
    pub predicted_spending: f64,
    pub features: SeasonFeatures,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEmitter {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub emissions_kg: f64,
    #[serde(default)]
    pub percentage_of_total: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub greener_option: String,
    /// Free text, usually with an embedded percentage range
    #[serde(default)]
    pub potential_savings: String,
    #[serde(default)]
    pub implementation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandprintAction {
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub effort: String,
    #[serde(default)]
    pub category: String,
}

/// LLM-authored recommendations; the system validates shape loosely and relays
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub top_emitters: Vec<TopEmitter>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub handprint_actions: Vec<HandprintAction>,
    #[serde(default)]
    pub seasonal_tips: Vec<String>,
    #[serde(default)]
    pub spending_insight: String,
}

impl RecommendationSet {
    /// Canned stub returned when a month has no transactions at all
    pub fn no_transactions() -> Self {
        Self {
            summary: "No transactions found for this month. Start tracking your spending \
                      to get personalized carbon footprint insights!"
                .to_string(),
            ..Default::default()
        }
    }
}

/// Predicted-vs-actual spending comparison for one month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingComparison {
    pub predicted_vs_actual: f64,
    pub percentage_difference: f64,
}

/// Combined result of prediction + emissions + recommendations for one month
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub prediction: SpendingPrediction,
    pub emissions: EmissionsReport,
    pub recommendations: RecommendationSet,
    pub actual_spending: f64,
    pub comparison: SpendingComparison,
}

/// Per-month entry in a multi-month comparison
///
/// A failed month carries `error` and zeroed numeric fields instead of
/// aborting the batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthComparison {
    pub month: MonthKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_emissions: f64,
    pub total_spending: f64,
    pub predicted_spending: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<Season>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_category: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_count: Option<usize>,
}

impl MonthComparison {
    pub fn failed(month: MonthKey) -> Self {
        Self {
            month,
            error: Some("Failed to analyze this month".to_string()),
            total_emissions: 0.0,
            total_spending: 0.0,
            predicted_spending: 0.0,
            season: None,
            by_category: None,
            transaction_count: None,
        }
    }
}

/// Reduction over the successful entries of a comparison
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ComparisonSummary {
    NoData {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Stats {
        average_emissions: f64,
        average_spending: f64,
        total_months_analyzed: usize,
        highest_emission_month: MonthComparison,
        lowest_emission_month: MonthComparison,
        trend: String,
    },
}

/// Multi-month comparison result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub comparisons: Vec<MonthComparison>,
    pub summary: ComparisonSummary,
}

/// Round to 2 decimal places, matching the API's currency precision
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
