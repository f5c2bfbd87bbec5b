//! Transaction command implementations

use anyhow::Result;
use footprint_core::{Category, Database, NewTransaction};

use super::truncate;

pub fn cmd_transactions_add(
    db: &Database,
    title: Option<String>,
    category: Option<&str>,
    amount: f64,
) -> Result<()> {
    let category = category.map(Category::from_name);

    let tx = db.create_transaction(&NewTransaction {
        title,
        category,
        amount,
        created_at: None,
    })?;

    println!(
        "✅ Recorded #{}: {} ${:.2} ({})",
        tx.id,
        tx.title.as_deref().unwrap_or("(untitled)"),
        tx.amount,
        tx.category
    );

    Ok(())
}

pub fn cmd_transactions_list(db: &Database, limit: usize) -> Result<()> {
    let transactions = db.list_transactions()?;

    if transactions.is_empty() {
        println!("No transactions found. Record some with:");
        println!("  footprint transactions add --amount 18.50 --category Transport");
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions.iter().take(limit) {
        println!(
            "   #{:<5} │ {} │ {:>9} │ {:>10} │ {}",
            tx.id,
            tx.created_at.format("%Y-%m-%d"),
            tx.category,
            format!("${:.2}", tx.amount),
            truncate(tx.title.as_deref().unwrap_or("(untitled)"), 40)
        );
    }

    Ok(())
}

pub fn cmd_transactions_delete(db: &Database, id: i64) -> Result<()> {
    db.delete_transaction(id)?;
    println!("🗑️  Deleted transaction #{}", id);
    Ok(())
}
