//! Analysis command implementations (predict, analyze, compare)

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use footprint_core::{
    Analyzer, ComparisonSummary, Database, EmissionFactors, LlmClient, MonthKey,
    SpendingPredictor,
};

use super::open_db;

fn resolve_month(raw: Option<&str>) -> Result<MonthKey> {
    match raw {
        Some(s) => s.parse().context("Invalid month (expected YYYY-MM)"),
        None => Ok(MonthKey::containing(Utc::now())),
    }
}

fn build_analyzer(db: Database) -> Result<Analyzer<Database>> {
    let Some(llm) = LlmClient::from_env() else {
        bail!("LLM backend not configured (set GEMINI_API_KEY, or LLM_BACKEND=ollama with OLLAMA_HOST)");
    };
    Ok(Analyzer::new(
        db,
        llm,
        SpendingPredictor::from_env(),
        EmissionFactors::default(),
    ))
}

/// Predict spending for a month. Deterministic, no database or LLM needed.
pub fn cmd_predict(month: Option<&str>) -> Result<()> {
    let month = resolve_month(month)?;
    let prediction = SpendingPredictor::from_env().predict(month);

    println!();
    println!("🔮 Spending Prediction for {}", prediction.month);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Season: {}", prediction.season);
    println!("   Predicted spending: ${:.2}", prediction.predicted_spending);
    println!("   Confidence: {:.0}%", prediction.confidence * 100.0);

    Ok(())
}

pub async fn cmd_analyze(db_path: &Path, month: Option<&str>, json: bool) -> Result<()> {
    let month = resolve_month(month)?;
    let analyzer = build_analyzer(open_db(db_path)?)?;

    println!("🌱 Analyzing {}...", month);
    let analysis = analyzer.comprehensive_analysis(month).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!();
    println!("🌍 Carbon Analysis for {}", month);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Spending: ${:.2} actual vs ${:.2} predicted ({:+.2}%)",
        analysis.actual_spending,
        analysis.prediction.predicted_spending,
        analysis.comparison.percentage_difference
    );
    println!(
        "   Emissions: {:.2} kgCO2e across {} transactions",
        analysis.emissions.totals.total_emissions_kg,
        analysis.emissions.items.len()
    );

    if !analysis.emissions.totals.by_category.is_empty() {
        println!();
        println!("   By category:");
        for (category, kg) in &analysis.emissions.totals.by_category {
            println!("     {:>10}: {:.2} kgCO2e", category, kg);
        }
    }

    if !analysis.recommendations.summary.is_empty() {
        println!();
        println!("   {}", analysis.recommendations.summary);
    }
    for action in analysis.recommendations.handprint_actions.iter().take(3) {
        println!("   • {} ({})", action.action, action.impact);
    }

    Ok(())
}

pub async fn cmd_compare(db_path: &Path, months: &[String]) -> Result<()> {
    let months: Vec<MonthKey> = months
        .iter()
        .map(|m| resolve_month(Some(m.as_str())))
        .collect::<Result<_>>()?;

    let analyzer = build_analyzer(open_db(db_path)?)?;

    println!("🌱 Comparing {} months...", months.len());
    let result = analyzer.compare_months(&months).await?;

    println!();
    println!("📈 Month Comparison");
    println!("   ─────────────────────────────────────────────────────────────");

    for c in &result.comparisons {
        match &c.error {
            Some(e) => println!("   {} │ ❌ {}", c.month, e),
            None => println!(
                "   {} │ {:>10} │ {:.2} kgCO2e │ {} transactions",
                c.month,
                format!("${:.2}", c.total_spending),
                c.total_emissions,
                c.transaction_count.unwrap_or(0)
            ),
        }
    }

    println!();
    match result.summary {
        ComparisonSummary::NoData { message } => println!("   {}", message),
        ComparisonSummary::Stats {
            average_emissions,
            average_spending,
            total_months_analyzed,
            highest_emission_month,
            lowest_emission_month,
            trend,
        } => {
            println!("   Months analyzed: {}", total_months_analyzed);
            println!(
                "   Average: ${:.2} spending, {:.2} kgCO2e",
                average_spending, average_emissions
            );
            println!(
                "   Highest: {} ({:.2} kgCO2e)",
                highest_emission_month.month, highest_emission_month.total_emissions
            );
            println!(
                "   Lowest:  {} ({:.2} kgCO2e)",
                lowest_emission_month.month, lowest_emission_month.total_emissions
            );
            println!("   Trend: {}", trend);
        }
    }

    Ok(())
}
