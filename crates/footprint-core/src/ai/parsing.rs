//! JSON parsing helpers for LLM responses
//!
//! The prompts demand strict JSON, but models routinely wrap the payload in
//! prose or code fences. Parsing is an explicit ordered fallback chain:
//! direct parse, then a brace-scan over the trailing JSON block, then give
//! up with `None`. A parse failure never escapes as a runtime fault; each
//! component maps `None` to its documented degraded result.

use serde_json::Value;
use tracing::warn;

use crate::models::{EmissionRecord, EmissionTotals, EmissionsReport, RecommendationSet};

/// Extract a JSON object from a raw model response
///
/// Strategy 1: the whole response is JSON.
/// Strategy 2: take the span from the first `{` to the last `}` and parse
/// that (models like to prefix "Here is the JSON:" and suffix pleasantries).
pub fn extract_json(response: &str) -> Option<Value> {
    let response = response.trim();

    if let Ok(value) = serde_json::from_str::<Value>(response) {
        if value.is_object() {
            return Some(value);
        }
    }

    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if start >= end {
        return None;
    }

    serde_json::from_str(&response[start..=end]).ok()
}

/// Parse the emissions response with loose shape validation
///
/// `items` must be list-like (else treated as empty); malformed entries are
/// dropped rather than failing the batch. `totals` must be object-like with
/// numeric-or-missing fields (else zeroed). A completely unparseable
/// response degrades to the empty report.
pub fn parse_emissions(response: &str) -> EmissionsReport {
    let Some(value) = extract_json(response) else {
        warn!("Emissions response was not parseable JSON; returning empty report");
        return EmissionsReport::default();
    };

    let items: Vec<EmissionRecord> = match value.get("items") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };

    let totals: EmissionTotals = value
        .get("totals")
        .filter(|t| t.is_object())
        .and_then(|t| serde_json::from_value(t.clone()).ok())
        .unwrap_or_default();

    EmissionsReport {
        items,
        totals,
        month: None,
    }
}

/// Parse the recommendations response
///
/// Missing fields default per-field. A completely unparseable response
/// degrades to the empty set, mirroring the emissions policy.
pub fn parse_recommendations(response: &str) -> RecommendationSet {
    let Some(value) = extract_json(response) else {
        warn!("Recommendations response was not parseable JSON; returning empty set");
        return RecommendationSet::default();
    };

    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Recommendations JSON had unexpected shape; returning empty set");
        RecommendationSet::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_direct() {
        let value = extract_json(r#"{"items": [], "totals": {}}"#).unwrap();
        assert!(value.get("items").is_some());
    }

    #[test]
    fn test_extract_json_wrapped_in_prose() {
        let response = r#"Here is the analysis you asked for:
{"items": [{"id": "a", "emissionsKg": 2.0}], "totals": {"totalEmissionsKg": 2.0}}
Let me know if you need anything else!"#;
        let value = extract_json(response).unwrap();
        assert_eq!(value["totals"]["totalEmissionsKg"], 2.0);
    }

    #[test]
    fn test_extract_json_code_fence() {
        let response = "```json\n{\"summary\": \"ok\"}\n```";
        let value = extract_json(response).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_extract_json_garbage() {
        assert!(extract_json("I could not produce JSON, sorry.").is_none());
        assert!(extract_json("").is_none());
        assert!(extract_json("}{").is_none());
    }

    #[test]
    fn test_parse_emissions_full() {
        let response = r#"{
            "items": [
                {"id": "1", "title": "Grab ride", "category": "Transport", "amount": 20.0, "emissionsKg": 11.0},
                {"id": "2", "title": "Power bill", "category": "Utility", "amount": 100.0, "emissionsKg": 40.0, "note": "grid factor applied"}
            ],
            "totals": {"totalEmissionsKg": 51.0, "byCategory": {"Transport": 11.0, "Utility": 40.0}}
        }"#;

        let report = parse_emissions(response);
        assert_eq!(report.items.len(), 2);
        assert_eq!(report.items[0].emissions_kg, 11.0);
        assert_eq!(report.totals.total_emissions_kg, 51.0);
        assert_eq!(report.totals.by_category["Utility"], 40.0);
    }

    #[test]
    fn test_parse_emissions_items_not_a_list() {
        let report = parse_emissions(r#"{"items": "none", "totals": {"totalEmissionsKg": 5}}"#);
        assert!(report.items.is_empty());
        assert_eq!(report.totals.total_emissions_kg, 5.0);
    }

    #[test]
    fn test_parse_emissions_totals_not_an_object() {
        let report = parse_emissions(r#"{"items": [], "totals": 12}"#);
        assert_eq!(report.totals.total_emissions_kg, 0.0);
        assert!(report.totals.by_category.is_empty());
    }

    #[test]
    fn test_parse_emissions_unparseable_degrades_to_empty() {
        let report = parse_emissions("the model had a bad day");
        assert!(report.items.is_empty());
        assert_eq!(report.totals.total_emissions_kg, 0.0);
    }

    #[test]
    fn test_parse_recommendations() {
        let response = r#"{
            "summary": "Transport dominates your footprint.",
            "topEmitters": [{"category": "Transport", "emissionsKg": 110.0, "percentageOfTotal": 61.0}],
            "alternatives": [{"category": "Transport", "current": "Daily Grab rides",
                              "greenerOption": "MRT for the commute",
                              "potentialSavings": "~30-40% reduction", "implementation": "Plan via MyTransport.SG"}],
            "handprintActions": [{"action": "Plant trees with NParks", "impact": "~20kg CO2e per tree annually",
                                  "effort": "Low", "category": "Nature-based solutions"}],
            "seasonalTips": ["Air-dry laundry during the dry season"],
            "spendingInsight": "You spent 12% over prediction."
        }"#;

        let recs = parse_recommendations(response);
        assert_eq!(recs.top_emitters.len(), 1);
        assert_eq!(recs.alternatives[0].greener_option, "MRT for the commute");
        assert_eq!(recs.handprint_actions.len(), 1);
        assert_eq!(recs.seasonal_tips.len(), 1);
    }

    #[test]
    fn test_parse_recommendations_missing_fields_default() {
        let recs = parse_recommendations(r#"{"summary": "only a summary"}"#);
        assert_eq!(recs.summary, "only a summary");
        assert!(recs.alternatives.is_empty());
        assert!(recs.handprint_actions.is_empty());
    }

    #[test]
    fn test_parse_recommendations_unparseable_degrades_to_empty() {
        let recs = parse_recommendations("nope");
        assert!(recs.summary.is_empty());
        assert!(recs.top_emitters.is_empty());
    }
}
